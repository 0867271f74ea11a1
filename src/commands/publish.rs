use crate::commands::{CommandReport, Session};
use crate::error::WriteError;
use crate::journal::publish::write_entry_audited;
use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Publishes one entry read from a JSON file.
pub fn run(session: &Session, file: &Path, key: Option<&str>) -> Result<CommandReport> {
    let mut report = CommandReport::new("publish");
    let raw = fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let value: Value = match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(err) => {
            report.issue(format!("invalid JSON in {}: {err}", file.display()));
            return Ok(report);
        }
    };

    let store = session.store()?;
    let credential = session.credential(key);
    match write_entry_audited(
        &session.paths,
        store.as_ref(),
        credential.as_deref(),
        session.config.compose.write_key.as_deref(),
        &value,
    ) {
        Ok(outcome) => {
            report.detail(format!(
                "published {}: {} entries sha256={}",
                outcome.id, outcome.count, outcome.sha256
            ));
            report.set_data(&outcome)?;
        }
        Err(WriteError::Unauthorized) => report.issue(
            "unauthorized: pass --key or set ASTRAEA_COMPOSE_KEY to the configured write key",
        ),
        Err(err) => report.issue(err.to_string()),
    }
    Ok(report)
}
