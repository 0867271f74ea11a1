use crate::journal::paths::JournalPaths;
use crate::journal::util::now_epoch_secs;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    pub at_epoch_secs: u64,
    pub action: String,
    pub status: String,
    pub entry_id: String,
    pub message: String,
}

pub fn audit_log_path(paths: &JournalPaths) -> PathBuf {
    paths.logs_dir.join("audit.log")
}

pub fn append_event(
    paths: &JournalPaths,
    action: &str,
    status: &str,
    entry_id: &str,
    message: &str,
) -> Result<()> {
    fs::create_dir_all(&paths.logs_dir)
        .with_context(|| format!("failed to create {}", paths.logs_dir.display()))?;
    let event = AuditEvent {
        at_epoch_secs: now_epoch_secs()?,
        action: action.to_string(),
        status: status.to_string(),
        entry_id: entry_id.to_string(),
        message: message.to_string(),
    };

    let line = format!("{}\n", serde_json::to_string(&event)?);
    let path = audit_log_path(paths);
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    file.write_all(line.as_bytes())?;
    Ok(())
}

/// Audit failures never fail the operation being audited.
pub fn record(paths: &JournalPaths, action: &str, status: &str, entry_id: &str, message: &str) {
    if let Err(err) = append_event(paths, action, status, entry_id, message) {
        log::warn!("audit append failed: {err:#}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::paths::test_paths;
    use tempfile::tempdir;

    #[test]
    fn events_append_as_json_lines() {
        let tmp = tempdir().expect("tempdir");
        let paths = test_paths(tmp.path());
        append_event(&paths, "publish", "ok", "2025-10-02-am", "count=3").expect("append");
        append_event(&paths, "draft_add", "ok", "2025-10-02-pm", "").expect("append");

        let raw = fs::read_to_string(audit_log_path(&paths)).expect("read log");
        let lines = raw.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).expect("json line");
        assert_eq!(first["action"], "publish");
        assert_eq!(first["entry_id"], "2025-10-02-am");
    }
}
