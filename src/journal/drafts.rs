use crate::journal::entry::Entry;
use crate::journal::normalize::normalize_document;
use crate::journal::warn;
use anyhow::{Context, Result};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

/// On-disk shape: `{ "astraea_drafts": [ ...newest first... ] }`.
#[derive(Debug, Default, Serialize, Deserialize)]
struct DraftFile {
    #[serde(default)]
    astraea_drafts: Vec<Value>,
}

/// Entries composed locally but not yet published.
#[derive(Debug, Clone)]
pub struct DraftStore {
    path: PathBuf,
}

impl DraftStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".lock");
        PathBuf::from(name)
    }

    fn read_raw(&self) -> Result<Vec<Value>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        let parsed: DraftFile = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse {}", self.path.display()))?;
        Ok(parsed.astraea_drafts)
    }

    fn write_raw(&self, records: Vec<Value>) -> Result<()> {
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let data = serde_json::to_string_pretty(&DraftFile {
            astraea_drafts: records,
        })?;
        let mut tmp = NamedTempFile::new_in(&parent)
            .with_context(|| format!("failed to create temp file in {}", parent.display()))?;
        tmp.write_all(format!("{data}\n").as_bytes())?;
        tmp.persist(&self.path)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        Ok(())
    }

    /// Runs `f` while holding an exclusive advisory lock beside the drafts file.
    fn locked<T>(&self, f: impl FnOnce() -> Result<T>) -> Result<T> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let lock_path = self.lock_path();
        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .with_context(|| format!("failed to open {}", lock_path.display()))?;
        lock.lock_exclusive()
            .with_context(|| format!("failed to lock {}", lock_path.display()))?;
        let result = f();
        let _ = FileExt::unlock(&lock);
        result
    }

    /// Drafts newest first. Unreadable storage reads as no drafts.
    pub fn list(&self) -> Vec<Entry> {
        match self.read_raw() {
            Ok(records) => normalize_document(&records, "drafts"),
            Err(err) => {
                warn::emit(
                    "drafts_ignored",
                    "read",
                    &self.path.display().to_string(),
                    "",
                    &format!("{err:#}"),
                );
                Vec::new()
            }
        }
    }

    /// Puts `entry` at the front, replacing any older draft with the same id.
    /// Returns the number of drafts kept.
    pub fn add(&self, entry: &Entry) -> Result<usize> {
        self.locked(|| {
            let mut records = self
                .read_raw()
                .context("refusing to overwrite unreadable drafts file")?;
            records.retain(|r| r.get("id").and_then(Value::as_str) != Some(entry.id.as_str()));
            records.insert(0, serde_json::to_value(entry)?);
            let count = records.len();
            self.write_raw(records)?;
            Ok(count)
        })
    }

    /// Removes every draft. Returns how many readable drafts were dropped.
    pub fn clear(&self) -> Result<usize> {
        self.locked(|| {
            let dropped = self.read_raw().map(|r| r.len()).unwrap_or(0);
            if self.path.exists() {
                fs::remove_file(&self.path)
                    .with_context(|| format!("failed to remove {}", self.path.display()))?;
            }
            Ok(dropped)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::entry::Privacy;
    use tempfile::tempdir;

    fn draft(id: &str, mood: &str) -> Entry {
        let mut e = Entry::new(id, &id[..10]);
        e.mood = Some(mood.to_string());
        e
    }

    #[test]
    fn missing_file_has_no_drafts() {
        let tmp = tempdir().expect("tempdir");
        let store = DraftStore::new(tmp.path().join("drafts.json"));
        assert!(store.list().is_empty());
    }

    #[test]
    fn add_prepends_and_replaces_same_id() {
        let tmp = tempdir().expect("tempdir");
        let store = DraftStore::new(tmp.path().join("drafts.json"));
        store.add(&draft("2025-10-01-am", "flat")).expect("add");
        store.add(&draft("2025-10-02-am", "bright")).expect("add");
        let count = store.add(&draft("2025-10-01-am", "soft")).expect("add");
        assert_eq!(count, 2);

        let drafts = store.list();
        let ids = drafts.iter().map(|e| e.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["2025-10-01-am", "2025-10-02-am"]);
        assert_eq!(drafts[0].mood.as_deref(), Some("soft"));
    }

    #[test]
    fn file_uses_fixed_key() {
        let tmp = tempdir().expect("tempdir");
        let path = tmp.path().join("drafts.json");
        let store = DraftStore::new(&path);
        let mut entry = draft("2025-10-01-pm", "calm");
        entry.privacy = Privacy::Anon;
        store.add(&entry).expect("add");

        let raw = fs::read_to_string(&path).expect("read");
        let parsed: Value = serde_json::from_str(&raw).expect("json");
        assert_eq!(parsed["astraea_drafts"][0]["privacy"], "anon");
    }

    #[test]
    fn corrupt_drafts_are_ignored_but_not_clobbered() {
        let tmp = tempdir().expect("tempdir");
        let path = tmp.path().join("drafts.json");
        fs::write(&path, "{\"astraea_drafts\": 7").expect("write");
        let store = DraftStore::new(&path);

        assert!(store.list().is_empty());
        assert!(store.add(&draft("2025-10-01-am", "x")).is_err());
        assert_eq!(
            fs::read_to_string(&path).expect("read"),
            "{\"astraea_drafts\": 7"
        );
    }

    #[test]
    fn clear_removes_everything() {
        let tmp = tempdir().expect("tempdir");
        let store = DraftStore::new(tmp.path().join("drafts.json"));
        store.add(&draft("2025-10-01-am", "x")).expect("add");
        store.add(&draft("2025-10-02-am", "y")).expect("add");
        assert_eq!(store.clear().expect("clear"), 2);
        assert!(store.list().is_empty());
        assert_eq!(store.clear().expect("clear again"), 0);
    }
}
