use crate::commands::{CommandReport, Session, entry_line};
use crate::journal::cycles::load_plans;
use crate::journal::query::Count;
use crate::journal::views::{CycleView, cycles};
use anyhow::Result;

fn counts_line(counts: &[Count]) -> String {
    if counts.is_empty() {
        return "—".to_string();
    }
    counts
        .iter()
        .map(|c| format!("{}({})", c.value, c.count))
        .collect::<Vec<_>>()
        .join(", ")
}

fn summary_line(view: &CycleView) -> String {
    let mut line = format!(
        "{}..{}  {}  entries={}",
        view.plan.start,
        view.plan.end,
        view.plan.display_title(),
        view.count
    );
    if let Some(herb) = &view.plan.herb {
        line.push_str(&format!("  herb={herb}"));
    }
    line
}

pub fn run(session: &Session, id: Option<&str>) -> Result<CommandReport> {
    let mut report = CommandReport::new("cycle");
    let plans = load_plans(&session.paths)?;
    let mut views = cycles(&session.entries()?, &plans);

    if let Some(id) = id {
        views.retain(|v| v.plan.id == id);
        if views.is_empty() {
            report.issue(format!("cycle plan not found: {id}"));
            return Ok(report);
        }
    }

    for view in &views {
        report.detail(summary_line(view));
        report.detail(format!("  top tags: {}", counts_line(&view.top_tags)));
        report.detail(format!("  top herbs: {}", counts_line(&view.top_herbs)));
        if id.is_some() {
            if !view.plan.threads.is_empty() {
                report.detail(format!("  threads: {}", view.plan.threads.join(", ")));
            }
            if let Some(prompt) = &view.plan.baseline_prompt {
                report.detail(format!("  baseline prompt: {prompt}"));
            }
            for item in &view.entries {
                report.detail(format!("  {}", entry_line(&item.entry)));
            }
        }
    }
    report.set_data(&views)?;
    Ok(report)
}
