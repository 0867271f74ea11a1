pub mod compose;
pub mod cycle;
pub mod drafts;
pub mod export;
pub mod list;
pub mod publish;
pub mod serve;
pub mod show;
pub mod status;
pub mod tags;
pub mod thread;

use crate::journal::config::{JournalConfig, load_config};
use crate::journal::drafts::DraftStore;
use crate::journal::entry::Entry;
use crate::journal::merge::overlay_drafts;
use crate::journal::paths::{JournalPaths, resolve_paths};
use crate::journal::store::{DocumentStore, open_store, read_document};
use crate::journal::util::truncate_with_ellipsis;
use anyhow::Result;
use serde::Serialize;
use serde_json::Value;
use std::env;

/// Env var the CLI reads the write credential from when `--key` is absent.
pub const COMPOSE_KEY_ENV: &str = "ASTRAEA_COMPOSE_KEY";

#[derive(Debug, Clone, Serialize)]
pub struct CommandReport {
    pub command: String,
    pub ok: bool,
    pub details: Vec<String>,
    pub issues: Vec<String>,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub data: Value,
}

impl CommandReport {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            ok: true,
            details: Vec::new(),
            issues: Vec::new(),
            data: Value::Null,
        }
    }

    pub fn detail(&mut self, text: impl Into<String>) {
        self.details.push(text.into());
    }

    pub fn issue(&mut self, text: impl Into<String>) {
        self.ok = false;
        self.issues.push(text.into());
    }

    pub fn set_data<T: Serialize>(&mut self, value: &T) -> Result<()> {
        self.data = serde_json::to_value(value)?;
        Ok(())
    }

    pub fn merge(&mut self, mut other: CommandReport) {
        self.ok &= other.ok;
        self.details.append(&mut other.details);
        self.issues.append(&mut other.issues);
    }
}

/// Resolved paths and config shared by every command.
#[derive(Debug, Clone)]
pub struct Session {
    pub paths: JournalPaths,
    pub config: JournalConfig,
    pub include_drafts: bool,
}

impl Session {
    pub fn load(include_drafts: bool) -> Result<Self> {
        let paths = resolve_paths()?;
        let config = load_config(&paths)?;
        Ok(Self {
            paths,
            config,
            include_drafts,
        })
    }

    pub fn store(&self) -> Result<Box<dyn DocumentStore>> {
        open_store(&self.config, &self.paths)
    }

    pub fn drafts(&self) -> DraftStore {
        DraftStore::new(&self.paths.drafts_file)
    }

    /// Stored entries, with local drafts layered over them unless disabled.
    pub fn entries(&self) -> Result<Vec<Entry>> {
        let store = self.store()?;
        let outcome = read_document(store.as_ref());
        log::debug!(
            "read {} entries from {} ({})",
            outcome.entries.len(),
            store.describe(),
            outcome.source.as_str()
        );
        if !self.include_drafts {
            return Ok(outcome.entries);
        }
        let drafts = self.drafts().list();
        Ok(overlay_drafts(outcome.entries, drafts))
    }

    /// Explicit key first, then the environment.
    pub fn credential(&self, explicit: Option<&str>) -> Option<String> {
        explicit
            .map(ToOwned::to_owned)
            .or_else(|| env::var(COMPOSE_KEY_ENV).ok())
            .filter(|k| !k.is_empty())
    }
}

/// One-line summary used by every list-shaped command.
pub fn entry_line(entry: &Entry) -> String {
    let mut line = format!(
        "{}  {} {}  {}  {}",
        entry.id,
        entry.lunar_phase.glyph(),
        entry.lunar_phase.label(),
        entry.cycle_day_label(),
        entry.privacy
    );
    if !entry.tags.is_empty() {
        line.push_str(&format!("  tags={}", entry.tags.join(",")));
    }
    if let Some(mood) = &entry.mood {
        line.push_str(&format!("  mood={}", truncate_with_ellipsis(mood, 40)));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::entry::{Phase, Privacy};

    #[test]
    fn report_turns_not_ok_on_issue_and_merge() {
        let mut report = CommandReport::new("status");
        report.detail("fine");
        let mut other = CommandReport::new("store");
        other.issue("store unreachable");
        report.merge(other);
        assert!(!report.ok);
        assert_eq!(report.details, vec!["fine"]);
        assert_eq!(report.issues, vec!["store unreachable"]);
    }

    #[test]
    fn data_is_omitted_when_unset() {
        let report = CommandReport::new("tags");
        let json = serde_json::to_value(&report).expect("json");
        assert!(json.get("data").is_none());
    }

    #[test]
    fn entry_line_summarizes_fields() {
        let mut entry = Entry::new("2025-10-02-pm", "2025-10-02");
        entry.lunar_phase = Phase::New;
        entry.privacy = Privacy::Anon;
        entry.cycle_day = Some(3);
        entry.tags = vec!["TCM".to_string(), "sleep".to_string()];
        assert_eq!(
            entry_line(&entry),
            "2025-10-02-pm  🌑 New  CD 3  anon  tags=TCM,sleep"
        );
    }
}
