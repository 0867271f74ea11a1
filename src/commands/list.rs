use crate::commands::{CommandReport, Session, entry_line};
use crate::journal::query::FilterSpec;
use crate::journal::views::library;
use anyhow::Result;

pub fn run(session: &Session, spec: &FilterSpec) -> Result<CommandReport> {
    let mut report = CommandReport::new("list");
    let entries = session.entries()?;
    let view = library(&entries, spec);

    if view.query.is_empty() {
        report.detail(format!("showing {} of {}", view.entries.len(), view.total));
    } else {
        report.detail(format!(
            "showing {} of {} (?{})",
            view.entries.len(),
            view.total,
            view.query
        ));
    }
    for item in &view.entries {
        report.detail(entry_line(&item.entry));
    }
    report.set_data(&view)?;
    Ok(report)
}
