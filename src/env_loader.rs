use std::env;
use std::path::PathBuf;

include!(concat!(env!("OUT_DIR"), "/astraea_env_allowlist.rs"));

fn fallback_dotenv_path(
    astraea_home: Option<PathBuf>,
    home_dir: Option<PathBuf>,
) -> Option<PathBuf> {
    if let Some(home) = astraea_home {
        return Some(home.join(".env"));
    }
    Some(home_dir?.join(".astraea/.env"))
}

pub fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    let fallback = fallback_dotenv_path(
        env::var_os("ASTRAEA_HOME").map(PathBuf::from),
        dirs::home_dir(),
    );

    let Some(path) = fallback else {
        return;
    };
    if path.is_file() {
        let _ = dotenvy::from_path(&path);
    }
}

/// `ASTRAEA_*` variables set in the environment that no code reads.
pub fn unknown_env_keys<I>(keys: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut out = keys
        .into_iter()
        .filter(|key| key.starts_with("ASTRAEA_"))
        .filter(|key| !GENERATED_ENV_ALLOWLIST.contains(&key.as_str()))
        .collect::<Vec<_>>();
    out.sort();
    out
}

#[cfg(test)]
mod tests {
    use super::{GENERATED_ENV_ALLOWLIST, fallback_dotenv_path, unknown_env_keys};
    use std::path::PathBuf;

    #[test]
    fn fallback_prefers_astraea_home() {
        let got = fallback_dotenv_path(
            Some(PathBuf::from("/workspace/journal")),
            Some(PathBuf::from("/home/alice")),
        );
        assert_eq!(got, Some(PathBuf::from("/workspace/journal/.env")));
    }

    #[test]
    fn fallback_uses_home_when_astraea_home_unset() {
        let got = fallback_dotenv_path(None, Some(PathBuf::from("/home/alice")));
        assert_eq!(got, Some(PathBuf::from("/home/alice/.astraea/.env")));
    }

    #[test]
    fn allowlist_contains_known_keys() {
        assert!(GENERATED_ENV_ALLOWLIST.contains(&"ASTRAEA_HOME"));
        assert!(GENERATED_ENV_ALLOWLIST.contains(&"ASTRAEA_WRITE_KEY"));
        assert!(GENERATED_ENV_ALLOWLIST.contains(&"ASTRAEA_LOG"));
        assert!(GENERATED_ENV_ALLOWLIST.contains(&"ASTRAEA_COMPOSE_KEY"));
    }

    #[test]
    fn allowlist_holds_only_full_names() {
        assert!(!GENERATED_ENV_ALLOWLIST.contains(&"ASTRAEA_"));
        assert!(
            GENERATED_ENV_ALLOWLIST
                .windows(2)
                .all(|pair| pair[0] < pair[1])
        );
    }

    #[test]
    fn unknown_keys_are_reported_sorted() {
        // Built at runtime so the build script does not allowlist the typo.
        let typo = format!("{}{}", "ASTRAEA_", "WRTIE_KEY");
        let got = unknown_env_keys(vec![
            "ASTRAEA_HOME".to_string(),
            "PATH".to_string(),
            typo.clone(),
        ]);
        assert_eq!(got, vec![typo]);
    }
}
