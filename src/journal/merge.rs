use crate::journal::entry::Entry;
use crate::journal::query::sort_by_date_desc;
use std::collections::HashMap;

/// Insertion-ordered id → entry map. A later write for an id replaces the
/// earlier one in place.
#[derive(Debug, Default)]
struct IdMap {
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
}

impl IdMap {
    fn from_entries(entries: Vec<Entry>) -> Self {
        let mut map = Self::default();
        for entry in entries {
            map.put(entry);
        }
        map
    }

    fn put(&mut self, entry: Entry) {
        match self.index.get(&entry.id) {
            Some(&pos) => self.entries[pos] = entry,
            None => {
                self.index.insert(entry.id.clone(), self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    fn into_vec(self) -> Vec<Entry> {
        self.entries
    }
}

/// Collapses duplicate ids, keeping the last occurrence in the position of
/// the first.
pub fn dedupe_by_id(entries: Vec<Entry>) -> Vec<Entry> {
    IdMap::from_entries(entries).into_vec()
}

/// Next full document after writing `entry`: deduplicated by id, latest write
/// wins, most recent date first.
pub fn upsert(document: Vec<Entry>, entry: Entry) -> Vec<Entry> {
    let mut map = IdMap::from_entries(document);
    map.put(entry);
    let mut next = map.into_vec();
    sort_by_date_desc(&mut next);
    next
}

/// Local drafts (stored newest first) layered over the authoritative set.
/// The newest draft for an id wins over older drafts and the stored entry.
pub fn overlay_drafts(authoritative: Vec<Entry>, drafts: Vec<Entry>) -> Vec<Entry> {
    let mut map = IdMap::from_entries(authoritative);
    for draft in drafts.into_iter().rev() {
        map.put(draft);
    }
    map.into_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, date: &str, mood: &str) -> Entry {
        let mut e = Entry::new(id, date);
        e.mood = Some(mood.to_string());
        e
    }

    fn ids(entries: &[Entry]) -> Vec<&str> {
        entries.iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn upsert_inserts_and_sorts() {
        let doc = vec![entry("a", "2025-10-01", "x"), entry("c", "2025-10-03", "x")];
        let next = upsert(doc, entry("b", "2025-10-02", "x"));
        assert_eq!(ids(&next), vec!["c", "b", "a"]);
    }

    #[test]
    fn upsert_is_idempotent() {
        let doc = vec![entry("a", "2025-10-01", "x"), entry("b", "2025-10-02", "x")];
        let incoming = entry("a", "2025-10-01", "y");
        let once = upsert(doc, incoming.clone());
        let twice = upsert(once.clone(), incoming);
        assert_eq!(once, twice);
        assert_eq!(once.iter().filter(|e| e.id == "a").count(), 1);
    }

    #[test]
    fn latest_applied_wins_regardless_of_base_order() {
        let base = vec![
            entry("a", "2025-10-01", "old"),
            entry("b", "2025-10-02", "x"),
            entry("c", "2025-10-03", "x"),
        ];
        let incoming = entry("a", "2025-10-01", "new");
        for rotation in 0..base.len() {
            let mut rotated = base.clone();
            rotated.rotate_left(rotation);
            let next = upsert(rotated, incoming.clone());
            let got = next.iter().find(|e| e.id == "a").expect("present");
            assert_eq!(got, &incoming);
            assert_eq!(next.len(), 3);
        }
    }

    #[test]
    fn duplicate_ids_in_storage_collapse_to_last_occurrence() {
        let doc = vec![
            entry("a", "2025-10-01", "first"),
            entry("b", "2025-10-01", "x"),
            entry("a", "2025-10-01", "second"),
        ];
        let next = upsert(doc, entry("z", "2025-09-01", "x"));
        assert_eq!(ids(&next), vec!["a", "b", "z"]);
        assert_eq!(next[0].mood.as_deref(), Some("second"));
    }

    #[test]
    fn dedupe_keeps_last_occurrence() {
        let doc = vec![
            entry("a", "2025-10-01", "first"),
            entry("b", "2025-10-02", "x"),
            entry("a", "2025-10-01", "second"),
        ];
        let deduped = dedupe_by_id(doc);
        assert_eq!(ids(&deduped), vec!["a", "b"]);
        assert_eq!(deduped[0].mood.as_deref(), Some("second"));
    }

    #[test]
    fn drafts_override_authoritative_entries() {
        let stored = vec![entry("a", "2025-10-01", "stored"), entry("b", "2025-10-02", "x")];
        let drafts = vec![
            entry("a", "2025-10-01", "newest draft"),
            entry("c", "2025-10-05", "x"),
            entry("a", "2025-10-01", "older draft"),
        ];
        let merged = overlay_drafts(stored, drafts);
        assert_eq!(merged.len(), 3);
        let a = merged.iter().find(|e| e.id == "a").expect("a");
        assert_eq!(a.mood.as_deref(), Some("newest draft"));
    }
}
