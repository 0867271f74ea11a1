use anyhow::Result;
use serde_json::Value;
use std::env;

use crate::commands::CommandReport;
use crate::env_loader::unknown_env_keys;
use crate::journal::config::load_config;
use crate::journal::cycles::load_plans;
use crate::journal::drafts::DraftStore;
use crate::journal::paths::{JournalPaths, resolve_paths};
use crate::journal::store::open_store;

fn store_report(paths: &JournalPaths) -> Result<CommandReport> {
    let mut report = CommandReport::new("store");
    let cfg = match load_config(paths) {
        Ok(cfg) => cfg,
        Err(err) => {
            report.issue(format!("config={err:#}"));
            return Ok(report);
        }
    };
    report.detail(format!("store.backend={}", cfg.store.backend));
    report.detail(format!("compose.timezone={}", cfg.compose.timezone));
    report.detail(format!(
        "compose.write_key={}",
        if cfg.compose.write_key.is_some() { "set" } else { "unset" }
    ));
    report.detail(format!("server.bind={}", cfg.server.bind));

    let store = open_store(&cfg, paths)?;
    report.detail(format!("store={}", store.describe()));
    match store.fetch() {
        Ok(Value::Array(records)) => report.detail(format!("store.records={}", records.len())),
        Ok(_) => report.issue("store document is not a JSON array (reads as empty)"),
        Err(err) => report.issue(format!(
            "store unreachable, reads fall back to seed ({err:#})"
        )),
    }
    Ok(report)
}

pub fn run() -> Result<CommandReport> {
    let paths = resolve_paths()?;
    let mut report = CommandReport::new("status");

    report.detail(format!("build={}", env!("BUILD_UUID")));
    report.detail(format!("home={}", paths.home.display()));
    report.detail(format!("config_file={}", paths.config_file.display()));
    report.detail(format!("drafts_file={}", paths.drafts_file.display()));
    report.detail(format!("cycles_file={}", paths.cycles_file.display()));
    report.detail(format!("logs_dir={}", paths.logs_dir.display()));

    if !paths.config_file.exists() {
        report.detail("config_file=not_found (defaults in use)");
    }
    report.merge(store_report(&paths)?);

    report.detail(format!(
        "drafts={}",
        DraftStore::new(&paths.drafts_file).list().len()
    ));
    match load_plans(&paths) {
        Ok(plans) => report.detail(format!("cycle_plans={}", plans.len())),
        Err(err) => report.issue(format!("cycle_plans={err:#}")),
    }

    for key in unknown_env_keys(env::vars_os().filter_map(|(k, _)| k.into_string().ok())) {
        report.issue(format!("unknown env var {key} (typo?)"));
    }

    Ok(report)
}
