use crate::assets::DEFAULT_CYCLES;
use crate::error::ConfigError;
use crate::journal::paths::JournalPaths;
use crate::journal::query::DateRange;
use anyhow::{Context, Result};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fs;

/// Length given to the newest plan when it has no explicit end.
pub const DEFAULT_SPAN_DAYS: u64 = 29;

#[derive(Debug, Clone, Deserialize)]
struct RawPlan {
    #[serde(alias = "cycle_id")]
    id: String,
    title: Option<String>,
    #[serde(alias = "new_moon")]
    start: String,
    end: Option<String>,
    #[serde(default)]
    threads: Vec<String>,
    herb: Option<String>,
    baseline_prompt: Option<String>,
    notes: Option<String>,
}

/// An author-curated date window. `end` is always resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CyclePlan {
    pub id: String,
    pub title: Option<String>,
    pub start: String,
    pub end: String,
    pub threads: Vec<String>,
    pub herb: Option<String>,
    pub baseline_prompt: Option<String>,
    pub notes: Option<String>,
}

impl CyclePlan {
    pub fn range(&self) -> DateRange {
        DateRange::new(&self.start, &self.end)
    }

    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.id)
    }
}

fn parse_date(plan: &str, field: &str, raw: &str) -> Result<NaiveDate, ConfigError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .filter(|_| raw.len() == 10)
        .ok_or_else(|| ConfigError::InvalidCycles(format!("plan {plan}: invalid {field} `{raw}`")))
}

/// Parses JSON5 plans and resolves open ends. Result is ordered by start.
pub fn parse_plans(raw: &str) -> Result<Vec<CyclePlan>, ConfigError> {
    let mut plans: Vec<RawPlan> =
        json5::from_str(raw).map_err(|err| ConfigError::InvalidCycles(err.to_string()))?;

    for plan in &plans {
        if plan.id.trim().is_empty() {
            return Err(ConfigError::InvalidCycles("plan with empty id".to_string()));
        }
        parse_date(&plan.id, "start", &plan.start)?;
        if let Some(end) = &plan.end {
            parse_date(&plan.id, "end", end)?;
        }
    }
    plans.sort_by(|a, b| a.start.cmp(&b.start));

    let next_starts = plans
        .iter()
        .skip(1)
        .map(|p| Some(p.start.clone()))
        .chain(std::iter::once(None))
        .collect::<Vec<_>>();

    plans
        .into_iter()
        .zip(next_starts)
        .map(|(plan, next_start)| {
            let end = match (plan.end, next_start) {
                (Some(end), _) => end,
                (None, Some(next)) => next,
                (None, None) => {
                    let start = parse_date(&plan.id, "start", &plan.start)?;
                    start
                        .checked_add_days(Days::new(DEFAULT_SPAN_DAYS))
                        .ok_or_else(|| {
                            ConfigError::InvalidCycles(format!(
                                "plan {}: end out of range",
                                plan.id
                            ))
                        })?
                        .format("%Y-%m-%d")
                        .to_string()
                }
            };
            Ok(CyclePlan {
                id: plan.id,
                title: plan.title,
                start: plan.start,
                end,
                threads: plan.threads,
                herb: plan.herb,
                baseline_prompt: plan.baseline_prompt,
                notes: plan.notes,
            })
        })
        .collect()
}

/// Author's cycles file when present, else the bundled default plans.
pub fn load_plans(paths: &JournalPaths) -> Result<Vec<CyclePlan>> {
    if !paths.cycles_file.exists() {
        return Ok(parse_plans(DEFAULT_CYCLES)?);
    }
    let raw = fs::read_to_string(&paths.cycles_file)
        .with_context(|| format!("failed to read {}", paths.cycles_file.display()))?;
    let plans = parse_plans(&raw)
        .with_context(|| format!("failed to load {}", paths.cycles_file.display()))?;
    Ok(plans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::paths::test_paths;
    use tempfile::tempdir;

    #[test]
    fn open_ends_resolve_to_next_start_or_default_span() {
        let plans = parse_plans(
            r#"[
                // out of order on purpose
                { id: "nov", start: "2025-11-20" },
                { id: "oct", start: "2025-10-21", title: "October" },
            ]"#,
        )
        .expect("parse");
        assert_eq!(plans[0].id, "oct");
        assert_eq!(plans[0].end, "2025-11-20");
        assert_eq!(plans[1].end, "2025-12-19");
        assert_eq!(plans[0].display_title(), "October");
        assert_eq!(plans[1].display_title(), "nov");
    }

    #[test]
    fn legacy_field_names_are_accepted() {
        let plans = parse_plans(
            r#"[{ cycle_id: "2025-10-new", new_moon: "2025-10-21", full_moon: "2025-11-05", herb: "linden" }]"#,
        )
        .expect("parse");
        assert_eq!(plans[0].id, "2025-10-new");
        assert_eq!(plans[0].start, "2025-10-21");
        assert_eq!(plans[0].herb.as_deref(), Some("linden"));
    }

    #[test]
    fn explicit_end_is_kept() {
        let plans =
            parse_plans(r#"[{ id: "a", start: "2025-10-21", end: "2025-11-19" }]"#).expect("parse");
        let range = plans[0].range();
        assert!(!range.contains("2025-10-20"));
        assert!(range.contains("2025-10-21"));
        assert!(range.contains("2025-11-19"));
        assert!(!range.contains("2025-11-20"));
    }

    #[test]
    fn rejects_bad_dates_and_syntax() {
        assert!(matches!(
            parse_plans(r#"[{ id: "a", start: "2025-1-2" }]"#),
            Err(ConfigError::InvalidCycles(_))
        ));
        assert!(matches!(
            parse_plans("[{ id: "),
            Err(ConfigError::InvalidCycles(_))
        ));
    }

    #[test]
    fn load_falls_back_to_bundled_plans() {
        let tmp = tempdir().expect("tempdir");
        let paths = test_paths(tmp.path());
        let plans = load_plans(&paths).expect("load");
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].start, "2025-10-02");
        assert_eq!(plans[0].end, "2025-10-31");

        fs::write(&paths.cycles_file, r#"[{ id: "x", start: "2025-01-01", end: "2025-01-05" }]"#)
            .expect("write");
        let plans = load_plans(&paths).expect("load file");
        assert_eq!(plans[0].id, "x");
    }
}
