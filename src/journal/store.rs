//! The authoritative document: one JSON array replaced whole on every write.
//!
//! Backends are injected as [`DocumentStore`] trait objects. Reads never
//! fail; they degrade to the bundled seed document or to an empty list.

use crate::assets::SEED_DOCUMENT;
use crate::journal::config::{BACKEND_HTTP, JournalConfig};
use crate::journal::entry::Entry;
use crate::journal::merge::dedupe_by_id;
use crate::journal::normalize::normalize_document;
use crate::journal::paths::JournalPaths;
use crate::journal::warn;
use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header::{CACHE_CONTROL, CONTENT_TYPE};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::NamedTempFile;

pub trait DocumentStore: Send + Sync {
    fn describe(&self) -> String;

    /// Raw document as stored, with no shape guarantees.
    fn fetch(&self) -> Result<Value>;

    /// Replaces the whole document. There is no partial update.
    fn replace(&self, document: &[Entry]) -> Result<()>;
}

pub fn serialize_document(document: &[Entry]) -> Result<String> {
    let data = serde_json::to_string_pretty(document)?;
    Ok(format!("{data}\n"))
}

#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DocumentStore for FileStore {
    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }

    fn fetch(&self) -> Result<Value> {
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        let parsed = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse {}", self.path.display()))?;
        Ok(parsed)
    }

    fn replace(&self, document: &[Entry]) -> Result<()> {
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;

        let data = serialize_document(document)?;
        let mut tmp = NamedTempFile::new_in(&parent)
            .with_context(|| format!("failed to create temp file in {}", parent.display()))?;
        tmp.write_all(data.as_bytes())?;
        tmp.persist(&self.path)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        Ok(())
    }
}

/// Document kept at a single URL: `GET` reads it, `PUT` replaces it.
pub struct HttpBlobStore {
    url: String,
    token: Option<String>,
    client: Client,
}

impl HttpBlobStore {
    pub fn new(url: &str, token: Option<String>, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            url: url.trim().to_string(),
            token,
            client,
        })
    }
}

impl DocumentStore for HttpBlobStore {
    fn describe(&self) -> String {
        format!("http:{}", self.url)
    }

    fn fetch(&self) -> Result<Value> {
        let response = self
            .client
            .get(&self.url)
            .header(CACHE_CONTROL, "no-store")
            .send()
            .with_context(|| format!("failed to fetch {}", self.url))?;
        if !response.status().is_success() {
            anyhow::bail!("blob fetch failed with status {}", response.status());
        }
        let json: Value = response.json().context("blob body is not JSON")?;
        Ok(json)
    }

    fn replace(&self, document: &[Entry]) -> Result<()> {
        let mut request = self
            .client
            .put(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .body(serialize_document(document)?);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request
            .send()
            .with_context(|| format!("failed to upload {}", self.url))?;
        if !response.status().is_success() {
            anyhow::bail!("blob upload failed with status {}", response.status());
        }
        Ok(())
    }
}

pub fn open_store(cfg: &JournalConfig, paths: &JournalPaths) -> Result<Box<dyn DocumentStore>> {
    if cfg.store.backend == BACKEND_HTTP {
        let url = cfg
            .store
            .url
            .as_deref()
            .context("http store backend requires store.url")?;
        let store = HttpBlobStore::new(url, cfg.store.token.clone(), cfg.store.timeout_secs)?;
        return Ok(Box::new(store));
    }
    Ok(Box::new(FileStore::new(&paths.store_file)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadSource {
    Store,
    Seed,
    Empty,
}

impl ReadSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Store => "store",
            Self::Seed => "seed",
            Self::Empty => "empty",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReadOutcome {
    pub entries: Vec<Entry>,
    pub source: ReadSource,
}

pub fn seed_entries() -> Vec<Entry> {
    match serde_json::from_str::<Vec<Value>>(SEED_DOCUMENT) {
        Ok(records) => dedupe_by_id(normalize_document(&records, "seed")),
        Err(err) => {
            warn::emit("seed_invalid", "read", "seed", "", &err.to_string());
            Vec::new()
        }
    }
}

/// Fetch failure falls back to the seed document; a document that is not an
/// array reads as empty. Each record is leniently normalized and duplicate ids
/// collapse to their last occurrence.
pub fn read_document(store: &dyn DocumentStore) -> ReadOutcome {
    let source = store.describe();
    match store.fetch() {
        Ok(Value::Array(records)) => ReadOutcome {
            entries: dedupe_by_id(normalize_document(&records, &source)),
            source: ReadSource::Store,
        },
        Ok(_) => {
            warn::emit("not_an_array", "read", &source, "", "document is not a JSON array");
            ReadOutcome {
                entries: Vec::new(),
                source: ReadSource::Empty,
            }
        }
        Err(err) => {
            warn::emit("seed_fallback", "read", &source, "", &format!("{err:#}"));
            ReadOutcome {
                entries: seed_entries(),
                source: ReadSource::Seed,
            }
        }
    }
}

/// In-memory fake for deterministic tests.
#[cfg(test)]
pub struct MemoryStore {
    document: std::sync::Mutex<Option<Value>>,
    writes: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl MemoryStore {
    pub fn new(document: Value) -> Self {
        Self {
            document: std::sync::Mutex::new(Some(document)),
            writes: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// A store whose reads always fail.
    pub fn unreachable() -> Self {
        Self {
            document: std::sync::Mutex::new(None),
            writes: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    pub fn document(&self) -> Option<Value> {
        self.document.lock().expect("lock").clone()
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
impl DocumentStore for MemoryStore {
    fn describe(&self) -> String {
        "memory".to_string()
    }

    fn fetch(&self) -> Result<Value> {
        self.document
            .lock()
            .expect("lock")
            .clone()
            .context("memory store unreachable")
    }

    fn replace(&self, document: &[Entry]) -> Result<()> {
        let value = serde_json::to_value(document)?;
        *self.document.lock().expect("lock") = Some(value);
        self.writes
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok(())
    }
}
