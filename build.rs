use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

const ENV_PREFIX: &str = "ASTRAEA_";
const SEED_DOCUMENT: &str = "assets/seed_logs.json";
const DEFAULT_CYCLES: &str = "assets/cycles.json5";

fn collect_rs_files(dir: &Path, out: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_rs_files(&path, out)?;
        } else if path.extension().and_then(|ext| ext.to_str()) == Some("rs") {
            out.push(path);
        }
    }
    Ok(())
}

fn is_env_name(name: &str) -> bool {
    name.len() > ENV_PREFIX.len()
        && name.starts_with(ENV_PREFIX)
        && name
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'_')
}

/// Only whole string literals count as reads (`env::var("ASTRAEA_HOME")`,
/// `const X: &str = "ASTRAEA_LOG"`). Mentions inside prose or messages do not.
fn collect_env_keys(source: &str, out: &mut BTreeSet<String>) {
    let mut rest = source;
    while let Some(start) = rest.find(&format!("\"{ENV_PREFIX}")) {
        let tail = &rest[start + 1..];
        match tail.find('"') {
            Some(end) => {
                let candidate = &tail[..end];
                if is_env_name(candidate) {
                    out.insert(candidate.to_string());
                }
                rest = &tail[end + 1..];
            }
            None => break,
        }
    }
}

fn write_generated_allowlist(out_dir: &Path) -> Result<(), String> {
    let mut rs_files = Vec::new();
    collect_rs_files(Path::new("src"), &mut rs_files).map_err(|err| err.to_string())?;
    rs_files.sort();

    let mut keys = BTreeSet::new();
    for file in rs_files {
        if let Ok(content) = fs::read_to_string(&file) {
            collect_env_keys(&content, &mut keys);
        }
    }

    let generated = out_dir.join("astraea_env_allowlist.rs");
    let mut f = fs::File::create(generated).map_err(|err| err.to_string())?;
    let mut body = String::from("pub const GENERATED_ENV_ALLOWLIST: &[&str] = &[\n");
    for key in keys {
        body.push_str(&format!("    \"{key}\",\n"));
    }
    body.push_str("];\n");
    f.write_all(body.as_bytes()).map_err(|err| err.to_string())
}

/// Bundled documents are compiled in with `include_str!`; a broken one would
/// only surface as a warning at runtime, so refuse to build instead.
fn check_bundled_assets() -> Result<(), String> {
    let seed =
        fs::read_to_string(SEED_DOCUMENT).map_err(|err| format!("{SEED_DOCUMENT}: {err}"))?;
    let parsed: serde_json::Value =
        serde_json::from_str(&seed).map_err(|err| format!("{SEED_DOCUMENT}: {err}"))?;
    if !parsed.is_array() {
        return Err(format!("{SEED_DOCUMENT}: expected a JSON array"));
    }

    let cycles =
        fs::read_to_string(DEFAULT_CYCLES).map_err(|err| format!("{DEFAULT_CYCLES}: {err}"))?;
    let plans: serde_json::Value =
        json5::from_str(&cycles).map_err(|err| format!("{DEFAULT_CYCLES}: {err}"))?;
    if !plans.is_array() {
        return Err(format!("{DEFAULT_CYCLES}: expected an array of plans"));
    }
    Ok(())
}

fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR is set by cargo"));
    if let Err(err) = check_bundled_assets() {
        panic!("invalid bundled asset: {err}");
    }
    if let Err(err) = write_generated_allowlist(&out_dir) {
        panic!("failed to generate ASTRAEA env allowlist: {err}");
    }

    let now = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .expect("clock after epoch");
    let build_id = format!("{:x}-{:x}", now.as_secs(), now.subsec_nanos());

    println!("cargo:rustc-env=BUILD_UUID={build_id}");
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=src");
    println!("cargo:rerun-if-changed=assets");
}
