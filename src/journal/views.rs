//! Read-side compositions shared by the CLI and the HTTP server. Every view
//! starts from the visible set and hands out redacted entries only.

use crate::journal::cycles::CyclePlan;
use crate::journal::entry::Entry;
use crate::journal::query::{Count, FilterSpec, apply, distinct_tags, top_herbs, top_tags};
use crate::journal::visibility::{EntryView, lookup, redact, visible};
use serde::Serialize;

fn redact_all(entries: &[Entry]) -> Vec<EntryView> {
    entries.iter().filter_map(redact).collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct LibraryView {
    pub query: String,
    pub total: usize,
    pub tags: Vec<String>,
    pub entries: Vec<EntryView>,
}

pub fn library(entries: &[Entry], spec: &FilterSpec) -> LibraryView {
    let public = visible(entries.to_vec());
    let matched = apply(&public, spec);
    LibraryView {
        query: spec.to_query_string(),
        total: public.len(),
        tags: distinct_tags(&public),
        entries: redact_all(&matched),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ThreadView {
    pub slug: String,
    pub entries: Vec<EntryView>,
}

pub fn thread(entries: &[Entry], slug: &str) -> ThreadView {
    let public = visible(entries.to_vec());
    ThreadView {
        slug: slug.to_string(),
        entries: redact_all(&apply(&public, &FilterSpec::thread(slug))),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CycleView {
    #[serde(flatten)]
    pub plan: CyclePlan,
    pub count: usize,
    pub top_tags: Vec<Count>,
    pub top_herbs: Vec<Count>,
    pub entries: Vec<EntryView>,
}

/// Plans newest first, each with the visible entries inside its window.
pub fn cycles(entries: &[Entry], plans: &[CyclePlan]) -> Vec<CycleView> {
    let public = visible(entries.to_vec());
    let mut ordered = plans.to_vec();
    ordered.sort_by(|a, b| b.start.cmp(&a.start));

    ordered
        .into_iter()
        .map(|plan| {
            let matched = apply(&public, &FilterSpec::range(&plan.range()));
            CycleView {
                count: matched.len(),
                top_tags: top_tags(&matched),
                top_herbs: top_herbs(&matched),
                entries: redact_all(&matched),
                plan,
            }
        })
        .collect()
}

pub fn entry_detail(entries: &[Entry], id: &str) -> Option<EntryView> {
    lookup(entries, id)
}
