use crate::commands::{CommandReport, Session};
use crate::journal::visibility::{EMPTY_PLACEHOLDER, EntryView};
use crate::journal::views::entry_detail;
use anyhow::Result;

fn list_or_placeholder(items: &[String]) -> String {
    if items.is_empty() {
        EMPTY_PLACEHOLDER.to_string()
    } else {
        items.join(", ")
    }
}

fn text_or_placeholder(text: Option<&str>) -> &str {
    text.unwrap_or(EMPTY_PLACEHOLDER)
}

fn detail_lines(view: &EntryView) -> Vec<String> {
    let e = &view.entry;
    let mut lines = vec![
        format!("id: {}", e.id),
        format!("date: {}", e.date),
        format!("cycle day: {}", e.cycle_day_label()),
        format!("phase: {} {}", e.lunar_phase.glyph(), e.lunar_phase.label()),
        format!("privacy: {}", e.privacy),
        format!("tags: {}", list_or_placeholder(&e.tags)),
        format!("symptoms: {}", list_or_placeholder(&e.symptoms)),
        format!("practices: {}", list_or_placeholder(&e.practices)),
        format!("threads: {}", list_or_placeholder(&e.threads)),
        format!("herbs: {}", list_or_placeholder(&e.herbs)),
        format!("mood: {}", text_or_placeholder(e.mood.as_deref())),
        format!(
            "digestion: {}",
            text_or_placeholder(e.digestion_notes.as_deref())
        ),
        format!("digestion tags: {}", list_or_placeholder(&e.digestion_tags)),
    ];
    if let Some(prompt) = &e.baseline_prompt {
        lines.push(format!("baseline prompt: {prompt}"));
        lines.push(format!(
            "baseline response: {}",
            text_or_placeholder(e.baseline_response.as_deref())
        ));
    }
    if !e.what_helped.is_empty() {
        lines.push(format!("helped: {}", e.what_helped.join(", ")));
    }
    if !e.what_hindered.is_empty() {
        lines.push(format!("hindered: {}", e.what_hindered.join(", ")));
    }
    if let Some(thread_notes) = &e.thread_notes {
        lines.push(format!("thread notes: {thread_notes}"));
    }
    lines.push(format!("notes: {}", view.notes_display()));
    lines
}

pub fn run(session: &Session, id: &str) -> Result<CommandReport> {
    let mut report = CommandReport::new("show");
    let entries = session.entries()?;
    match entry_detail(&entries, id) {
        Some(view) => {
            for line in detail_lines(&view) {
                report.detail(line);
            }
            report.set_data(&view)?;
        }
        None => report.issue(format!("entry not found: {id}")),
    }
    Ok(report)
}
