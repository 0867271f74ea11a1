use anyhow::Result;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct JournalPaths {
    pub home: PathBuf,
    pub config_file: PathBuf,
    pub store_file: PathBuf,
    pub drafts_file: PathBuf,
    pub cycles_file: PathBuf,
    pub logs_dir: PathBuf,
}

fn required_home_dir() -> Result<PathBuf> {
    if let Some(home) = dirs::home_dir() {
        return Ok(home);
    }
    Err(anyhow::anyhow!("HOME directory could not be resolved"))
}

fn env_or_default_path(var: &str, fallback: PathBuf) -> PathBuf {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => PathBuf::from(v.trim()),
        _ => fallback,
    }
}

pub fn resolve_paths() -> Result<JournalPaths> {
    let home = match env::var("ASTRAEA_HOME") {
        Ok(v) if !v.trim().is_empty() => PathBuf::from(v.trim()),
        _ => required_home_dir()?.join(".astraea"),
    };

    let config_file = env_or_default_path("ASTRAEA_CONFIG_PATH", home.join("astraea.toml"));
    let store_file = env_or_default_path("ASTRAEA_STORE_PATH", home.join("logs.json"));
    let drafts_file = env_or_default_path("ASTRAEA_DRAFTS_FILE", home.join("drafts.json"));
    let cycles_file = env_or_default_path("ASTRAEA_CYCLES_FILE", home.join("cycles.json5"));
    let logs_dir = env_or_default_path("ASTRAEA_LOGS_DIR", home.join("logs"));

    Ok(JournalPaths {
        home,
        config_file,
        store_file,
        drafts_file,
        cycles_file,
        logs_dir,
    })
}

#[cfg(test)]
pub fn test_paths(root: &std::path::Path) -> JournalPaths {
    JournalPaths {
        home: root.to_path_buf(),
        config_file: root.join("astraea.toml"),
        store_file: root.join("logs.json"),
        drafts_file: root.join("drafts.json"),
        cycles_file: root.join("cycles.json5"),
        logs_dir: root.join("logs"),
    }
}
