use crate::commands::{CommandReport, Session, entry_line};
use crate::journal::views::thread;
use anyhow::Result;

pub fn run(session: &Session, slug: &str) -> Result<CommandReport> {
    let mut report = CommandReport::new("thread");
    let view = thread(&session.entries()?, slug);
    report.detail(format!("thread {}: {} entries", view.slug, view.entries.len()));
    for item in &view.entries {
        report.detail(entry_line(&item.entry));
    }
    report.set_data(&view)?;
    Ok(report)
}
