use crate::commands::{CommandReport, Session};
use crate::journal::entry::Entry;
use crate::journal::export::{to_csv, to_json};
use crate::journal::query::FilterSpec;
use crate::journal::views::library;
use anyhow::{Context, Result};
use clap::ValueEnum;
use serde_json::json;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}

/// Exports exactly what the library view shows for `spec`.
pub fn run(
    session: &Session,
    spec: &FilterSpec,
    format: ExportFormat,
    out: Option<&Path>,
) -> Result<CommandReport> {
    let mut report = CommandReport::new("export");
    let view = library(&session.entries()?, spec);
    let entries = view.entries.into_iter().map(|v| v.entry).collect::<Vec<Entry>>();
    let rendered = match format {
        ExportFormat::Json => to_json(&entries)?,
        ExportFormat::Csv => to_csv(&entries)?,
    };

    match out {
        Some(path) => {
            fs::write(path, &rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
            report.detail(format!(
                "wrote {} entries to {} ({})",
                entries.len(),
                path.display(),
                format.as_str()
            ));
        }
        None => {
            let text = rendered.trim_end();
            if !text.is_empty() {
                report.detail(text.to_string());
            }
        }
    }
    report.set_data(&json!({
        "format": format.as_str(),
        "count": entries.len(),
        "query": view.query,
    }))?;
    Ok(report)
}
