use crate::commands::{CommandReport, Session};
use crate::journal::query::distinct_tags;
use crate::journal::visibility::visible;
use anyhow::Result;

pub fn run(session: &Session) -> Result<CommandReport> {
    let mut report = CommandReport::new("tags");
    let tags = distinct_tags(&visible(session.entries()?));
    for tag in &tags {
        report.detail(tag.clone());
    }
    report.set_data(&tags)?;
    Ok(report)
}
