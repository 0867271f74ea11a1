use crate::error::ConfigError;
use crate::journal::paths::JournalPaths;
use anyhow::{Result, anyhow};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;

pub const BACKEND_FILE: &str = "file";
pub const BACKEND_HTTP: &str = "http";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_backend")]
    pub backend: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_backend() -> String {
    BACKEND_FILE.to_string()
}

fn default_timeout_secs() -> u64 {
    20
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            url: None,
            token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComposeConfig {
    #[serde(default)]
    pub write_key: Option<String>,
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

impl Default for ComposeConfig {
    fn default() -> Self {
        Self {
            write_key: None,
            timezone: default_timezone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String {
    "127.0.0.1:8787".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct JournalConfig {
    pub store: StoreConfig,
    pub compose: ComposeConfig,
    pub server: ServerConfig,
}

impl JournalConfig {
    pub fn timezone(&self) -> Result<Tz> {
        self.compose
            .timezone
            .parse::<Tz>()
            .map_err(|err| anyhow!("invalid timezone {}: {err}", self.compose.timezone))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialJournalConfig {
    store: Option<StoreConfig>,
    compose: Option<ComposeConfig>,
    server: Option<ServerConfig>,
}

fn env_or_u64(var: &str, fallback: u64) -> u64 {
    match env::var(var) {
        Ok(v) => v.trim().parse::<u64>().ok().unwrap_or(fallback),
        Err(_) => fallback,
    }
}

fn env_or_string(var: &str, fallback: &str) -> String {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => fallback.to_string(),
    }
}

fn env_or_optional(var: &str, fallback: Option<String>) -> Option<String> {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => Some(v.trim().to_string()),
        _ => fallback,
    }
}

fn invalid(message: impl Into<String>) -> anyhow::Error {
    ConfigError::InvalidConfig(message.into()).into()
}

fn validate(cfg: &JournalConfig) -> Result<()> {
    match cfg.store.backend.as_str() {
        BACKEND_FILE => {}
        BACKEND_HTTP => {
            let has_url = cfg
                .store
                .url
                .as_deref()
                .is_some_and(|u| !u.trim().is_empty());
            if !has_url {
                return Err(invalid("http store backend requires store.url"));
            }
        }
        other => {
            return Err(invalid(format!(
                "unknown store backend `{other}`: use `file` or `http`"
            )));
        }
    }
    if cfg.store.timeout_secs == 0 {
        return Err(invalid("store timeout must be >= 1 second"));
    }
    if cfg.server.bind.trim().is_empty() {
        return Err(invalid("server bind address cannot be empty"));
    }
    cfg.timezone().map_err(|err| invalid(err.to_string()))?;
    Ok(())
}

fn merge_file_config(paths: &JournalPaths, base: &mut JournalConfig) -> Result<()> {
    let path = &paths.config_file;
    if !path.exists() {
        return Ok(());
    }

    let raw = fs::read_to_string(path)
        .map_err(|err| invalid(format!("failed to read {}: {err}", path.display())))?;
    let parsed: PartialJournalConfig = toml::from_str(&raw)
        .map_err(|err| invalid(format!("failed to parse {}: {err}", path.display())))?;
    if let Some(store) = parsed.store {
        base.store = store;
    }
    if let Some(compose) = parsed.compose {
        base.compose = compose;
    }
    if let Some(server) = parsed.server {
        base.server = server;
    }
    Ok(())
}

pub fn load_config(paths: &JournalPaths) -> Result<JournalConfig> {
    let mut cfg = JournalConfig::default();
    merge_file_config(paths, &mut cfg)?;

    cfg.store.backend = env_or_string("ASTRAEA_STORE_BACKEND", &cfg.store.backend);
    cfg.store.url = env_or_optional("ASTRAEA_BLOB_URL", cfg.store.url.take());
    cfg.store.token = env_or_optional("ASTRAEA_BLOB_TOKEN", cfg.store.token.take());
    cfg.store.timeout_secs = env_or_u64("ASTRAEA_STORE_TIMEOUT_SECS", cfg.store.timeout_secs);
    cfg.compose.write_key = env_or_optional("ASTRAEA_WRITE_KEY", cfg.compose.write_key.take());
    cfg.compose.timezone = env_or_string("ASTRAEA_TIMEZONE", &cfg.compose.timezone);
    cfg.server.bind = env_or_string("ASTRAEA_BIND", &cfg.server.bind);

    validate(&cfg)?;
    Ok(cfg)
}
