use crate::cli::ComposeArgs;
use crate::commands::{CommandReport, Session};
use crate::error::WriteError;
use crate::journal::audit;
use crate::journal::entry::{DayPart, compose_id};
use crate::journal::normalize::validate_for_write;
use crate::journal::publish::write_entry_audited;
use crate::journal::query::split_list;
use crate::journal::util::today_in;
use anyhow::Result;
use serde_json::{Value, json};

/// Builds the raw record the compose form would submit.
pub fn build_record(args: &ComposeArgs, date: &str) -> Value {
    let part = if args.pm { DayPart::Pm } else { DayPart::Am };
    json!({
        "id": compose_id(date, part),
        "date": date,
        "cycle_day": args.cycle_day,
        "lunar_phase": args.phase,
        "tags": split_list(&args.tags),
        "symptoms": split_list(&args.symptoms),
        "practices": split_list(&args.practices),
        "threads": split_list(&args.threads),
        "herbs": split_list(&args.herbs),
        "mood": args.mood,
        "digestion_notes": args.digestion_notes,
        "digestion_tags": split_list(&args.digestion_tags),
        "baseline_prompt": args.baseline_prompt,
        "baseline_response": args.baseline_response,
        "what_helped": split_list(&args.helped),
        "what_hindered": split_list(&args.hindered),
        "thread_notes": args.thread_notes,
        "privacy": args.privacy,
        "notes": args.notes,
        "schema_version": 1,
    })
}

pub fn run(session: &Session, args: &ComposeArgs) -> Result<CommandReport> {
    let mut report = CommandReport::new("compose");
    let date = match &args.date {
        Some(date) => date.trim().to_string(),
        None => today_in(session.config.timezone()?),
    };
    let raw = build_record(args, &date);

    if args.print || args.draft {
        let entry = match validate_for_write(&raw) {
            Ok(entry) => entry,
            Err(err) => {
                report.issue(WriteError::from(err).to_string());
                return Ok(report);
            }
        };
        if args.draft {
            let count = session.drafts().add(&entry)?;
            audit::record(
                &session.paths,
                "draft_add",
                "ok",
                &entry.id,
                &format!("drafts={count}"),
            );
            report.detail(format!("draft saved: {} ({count} drafts)", entry.id));
        } else {
            report.detail(serde_json::to_string_pretty(&entry)?);
        }
        report.set_data(&entry)?;
        return Ok(report);
    }

    let store = session.store()?;
    let credential = session.credential(args.key.as_deref());
    match write_entry_audited(
        &session.paths,
        store.as_ref(),
        credential.as_deref(),
        session.config.compose.write_key.as_deref(),
        &raw,
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

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(args: &[&str]) -> ComposeArgs {
        #[derive(Parser)]
        struct Wrapper {
            #[command(flatten)]
            args: ComposeArgs,
        }
        let mut argv = vec!["compose"];
        argv.extend_from_slice(args);
        Wrapper::parse_from(argv).args
    }

    #[test]
    fn record_uses_half_day_id_and_splits_lists() {
        let args = parse(&["--pm", "--tags", "herbal, sleep,,TCM", "--phase", "new"]);
        let raw = build_record(&args, "2025-10-02");
        assert_eq!(raw["id"], "2025-10-02-pm");
        assert_eq!(raw["tags"], json!(["herbal", "sleep", "TCM"]));
        assert_eq!(raw["lunar_phase"], "new");
        assert_eq!(raw["cycle_day"], Value::Null);

        let entry = validate_for_write(&raw).expect("valid");
        assert_eq!(entry.mood, None);
        assert_eq!(entry.privacy.as_str(), "public");
    }

    #[test]
    fn morning_is_the_default_slot() {
        let args = parse(&["--cycle-day", "13", "--mood", "steady"]);
        let raw = build_record(&args, "2025-10-03");
        assert_eq!(raw["id"], "2025-10-03-am");
        assert_eq!(raw["cycle_day"], 13);
        assert_eq!(raw["mood"], "steady");
    }

    #[test]
    fn legacy_phase_fails_validation() {
        let args = parse(&["--phase", "full_moon"]);
        let err = validate_for_write(&build_record(&args, "2025-10-03")).expect_err("invalid");
        assert_eq!(
            WriteError::from(err).to_string(),
            "bad payload: invalid lunar_phase: full_moon"
        );
    }
}
