use crate::journal::entry::{Entry, Phase};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

/// How many tags/herbs a cycle summary exposes.
pub const TOP_N: usize = 6;

const ANY_PHASE: &str = "any";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PhaseFilter {
    #[default]
    Any,
    Only(Phase),
}

impl PhaseFilter {
    pub fn parse(raw: &str) -> Self {
        match Phase::parse(raw.trim()) {
            Some(phase) => Self::Only(phase),
            None => Self::Any,
        }
    }

    fn matches(self, phase: Phase) -> bool {
        match self {
            Self::Any => true,
            Self::Only(wanted) => wanted == phase,
        }
    }
}

/// Inclusive `start..=end` over zero-padded ISO dates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

impl DateRange {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    pub fn contains(&self, date: &str) -> bool {
        self.start.as_str() <= date && date <= self.end.as_str()
    }
}

/// Everything a view can filter on. Categories combine with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    pub q: String,
    pub phase: PhaseFilter,
    pub tags: Vec<String>,
    pub thread: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

impl FilterSpec {
    pub fn thread(slug: impl Into<String>) -> Self {
        Self {
            thread: Some(slug.into()),
            ..Self::default()
        }
    }

    pub fn range(range: &DateRange) -> Self {
        Self {
            from: Some(range.start.clone()),
            to: Some(range.end.clone()),
            ..Self::default()
        }
    }

    /// Canonical query string; empty when nothing is filtered. Tags are
    /// comma-joined, so a tag containing a comma does not round-trip; writes
    /// reject such tags.
    pub fn to_query_string(&self) -> String {
        let mut pairs: Vec<(&str, String)> = Vec::new();
        let q = self.q.trim();
        if !q.is_empty() {
            pairs.push(("q", q.to_string()));
        }
        if let PhaseFilter::Only(phase) = self.phase {
            pairs.push(("phase", phase.as_str().to_string()));
        }
        if !self.tags.is_empty() {
            pairs.push(("tags", self.tags.join(",")));
        }
        if let Some(thread) = &self.thread {
            pairs.push(("thread", thread.clone()));
        }
        if let Some(from) = &self.from {
            pairs.push(("from", from.clone()));
        }
        if let Some(to) = &self.to {
            pairs.push(("to", to.clone()));
        }
        serde_urlencoded::to_string(&pairs).unwrap_or_default()
    }

    /// Lenient decode: unknown keys are ignored, unknown phases mean "any",
    /// and the first occurrence of a repeated key wins.
    pub fn from_query_string(raw: &str) -> Self {
        let pairs: Vec<(String, String)> =
            serde_urlencoded::from_str(raw.trim_start_matches('?')).unwrap_or_default();
        let first = |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.trim().to_string())
        };
        let non_empty = |key: &str| first(key).filter(|v| !v.is_empty());

        Self {
            q: first("q").unwrap_or_default(),
            phase: first("phase")
                .filter(|v| v != ANY_PHASE)
                .map(|v| PhaseFilter::parse(&v))
                .unwrap_or_default(),
            tags: first("tags")
                .map(|raw| split_list(&raw))
                .unwrap_or_default(),
            thread: non_empty("thread"),
            from: non_empty("from"),
            to: non_empty("to"),
        }
    }

    pub fn matches(&self, entry: &Entry) -> bool {
        if !self.phase.matches(entry.lunar_phase) {
            return false;
        }
        if !self.tags.iter().all(|t| entry.tags.contains(t)) {
            return false;
        }
        if !text_matches(entry, &self.q) {
            return false;
        }
        if let Some(thread) = &self.thread
            && !entry.threads.contains(thread)
        {
            return false;
        }
        if let Some(from) = &self.from
            && entry.date.as_str() < from.as_str()
        {
            return false;
        }
        if let Some(to) = &self.to
            && entry.date.as_str() > to.as_str()
        {
            return false;
        }
        true
    }
}

/// Splits a comma list, trimming and dropping empty items.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

fn haystack(entry: &Entry) -> String {
    let parts = [
        entry.date.clone(),
        entry.tags.join(" "),
        entry.symptoms.join(" "),
        entry.practices.join(" "),
        entry.mood.clone().unwrap_or_default(),
        entry.notes.clone(),
        entry.threads.join(" "),
    ];
    parts.join(" ").to_lowercase()
}

fn text_matches(entry: &Entry, q: &str) -> bool {
    let needle = q.trim().to_lowercase();
    needle.is_empty() || haystack(entry).contains(&needle)
}

/// Most recent first. Stable, so equal dates keep their incoming order.
pub fn sort_by_date_desc(entries: &mut [Entry]) {
    entries.sort_by(|a, b| b.date.cmp(&a.date));
}

pub fn apply(entries: &[Entry], spec: &FilterSpec) -> Vec<Entry> {
    let mut out = entries
        .iter()
        .filter(|e| spec.matches(e))
        .cloned()
        .collect::<Vec<_>>();
    sort_by_date_desc(&mut out);
    out
}

/// Case-insensitive first, lowercase before uppercase on ties.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

pub fn distinct_tags(entries: &[Entry]) -> Vec<String> {
    let set = entries
        .iter()
        .flat_map(|e| e.tags.iter().cloned())
        .collect::<BTreeSet<_>>();
    let mut out = set.into_iter().collect::<Vec<_>>();
    out.sort_by(|a, b| locale_cmp(a, b));
    out
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Count {
    pub value: String,
    pub count: usize,
}

/// Count descending; ties keep first-encountered order.
pub fn frequency<'a, I>(items: I) -> Vec<Count>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: Vec<Count> = Vec::new();
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    for item in items {
        match index.get(item) {
            Some(&pos) => counts[pos].count += 1,
            None => {
                index.insert(item, counts.len());
                counts.push(Count {
                    value: item.to_string(),
                    count: 1,
                });
            }
        }
    }
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

pub fn top_tags(entries: &[Entry]) -> Vec<Count> {
    let mut counts = frequency(entries.iter().flat_map(|e| e.tags.iter().map(String::as_str)));
    counts.truncate(TOP_N);
    counts
}

pub fn top_herbs(entries: &[Entry]) -> Vec<Count> {
    let mut counts = frequency(entries.iter().flat_map(|e| e.herbs.iter().map(String::as_str)));
    counts.truncate(TOP_N);
    counts
}
