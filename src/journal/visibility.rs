use crate::journal::entry::{Entry, Privacy};
use serde::Serialize;

pub const EMPTY_PLACEHOLDER: &str = "—";
pub const HIDDEN_NOTES_MESSAGE: &str = "Notes hidden for anonymized entry.";

pub fn is_visible(entry: &Entry) -> bool {
    entry.privacy != Privacy::Private
}

/// Drops private entries. Order is preserved.
pub fn visible(mut entries: Vec<Entry>) -> Vec<Entry> {
    entries.retain(is_visible);
    entries
}

/// An entry as the public may see it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryView {
    #[serde(flatten)]
    pub entry: Entry,
    pub notes_hidden: bool,
}

impl EntryView {
    pub fn notes_display(&self) -> &str {
        if self.notes_hidden {
            HIDDEN_NOTES_MESSAGE
        } else if self.entry.notes.is_empty() {
            EMPTY_PLACEHOLDER
        } else {
            &self.entry.notes
        }
    }
}

/// Field-level redaction. `None` for private entries.
pub fn redact(entry: &Entry) -> Option<EntryView> {
    match entry.privacy {
        Privacy::Private => None,
        Privacy::Public => Some(EntryView {
            entry: entry.clone(),
            notes_hidden: false,
        }),
        Privacy::Anon => {
            let mut entry = entry.clone();
            entry.notes.clear();
            Some(EntryView {
                entry,
                notes_hidden: true,
            })
        }
    }
}

/// Detail lookup. A private entry is indistinguishable from a missing id; with
/// duplicate ids the last occurrence is the current one.
pub fn lookup(entries: &[Entry], id: &str) -> Option<EntryView> {
    entries.iter().rev().find(|e| e.id == id).and_then(redact)
}
