use crate::commands::{CommandReport, Session, entry_line};
use crate::journal::audit;
use anyhow::Result;

pub fn list(session: &Session) -> Result<CommandReport> {
    let mut report = CommandReport::new("drafts-list");
    let drafts = session.drafts().list();
    report.detail(format!("{} drafts", drafts.len()));
    for draft in &drafts {
        report.detail(entry_line(draft));
    }
    report.set_data(&drafts)?;
    Ok(report)
}

pub fn clear(session: &Session) -> Result<CommandReport> {
    let mut report = CommandReport::new("drafts-clear");
    let dropped = session.drafts().clear()?;
    audit::record(
        &session.paths,
        "drafts_clear",
        "ok",
        "",
        &format!("dropped={dropped}"),
    );
    report.detail(format!("cleared {dropped} drafts"));
    Ok(report)
}
