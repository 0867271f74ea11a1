use crate::error::WriteError;
use crate::journal::audit;
use crate::journal::merge::upsert;
use crate::journal::normalize::validate_for_write;
use crate::journal::paths::JournalPaths;
use crate::journal::store::{DocumentStore, read_document, serialize_document};
use crate::journal::util::sha256_hex;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteOutcome {
    pub ok: bool,
    pub id: String,
    pub count: usize,
    pub sha256: String,
}

/// A write key must be configured and match exactly.
pub fn authorize(credential: Option<&str>, expected_key: Option<&str>) -> Result<(), WriteError> {
    match (credential, expected_key) {
        (Some(given), Some(expected)) if !expected.is_empty() && given == expected => Ok(()),
        _ => Err(WriteError::Unauthorized),
    }
}

/// Validates `raw`, upserts it into the current document and replaces the
/// stored document whole. Nothing is written unless every check passes.
pub fn write_entry(
    store: &dyn DocumentStore,
    credential: Option<&str>,
    expected_key: Option<&str>,
    raw: &Value,
) -> Result<WriteOutcome, WriteError> {
    authorize(credential, expected_key)?;
    let entry = validate_for_write(raw)?;
    let id = entry.id.clone();

    let current = read_document(store);
    log::debug!(
        "publishing {id} over {} entries from {}",
        current.entries.len(),
        current.source.as_str()
    );
    let next = upsert(current.entries, entry);
    let body = serialize_document(&next).map_err(WriteError::Store)?;
    store.replace(&next).map_err(WriteError::Store)?;

    Ok(WriteOutcome {
        ok: true,
        id,
        count: next.len(),
        sha256: sha256_hex(body.as_bytes()),
    })
}

/// [`write_entry`] plus an audit line for the attempt.
pub fn write_entry_audited(
    paths: &JournalPaths,
    store: &dyn DocumentStore,
    credential: Option<&str>,
    expected_key: Option<&str>,
    raw: &Value,
) -> Result<WriteOutcome, WriteError> {
    let subject = raw
        .get("id")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let result = write_entry(store, credential, expected_key, raw);
    match &result {
        Ok(outcome) => audit::record(
            paths,
            "publish",
            "ok",
            &outcome.id,
            &format!("count={} sha256={}", outcome.count, outcome.sha256),
        ),
        Err(err) => audit::record(paths, "publish", "rejected", &subject, &err.to_string()),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::journal::entry::Entry;
    use crate::journal::paths::test_paths;
    use crate::journal::store::MemoryStore;
    use serde_json::json;
    use tempfile::tempdir;

    const KEY: &str = "moonbeam";

    fn base_store() -> MemoryStore {
        MemoryStore::new(json!([
            {"id": "2025-10-01-am", "date": "2025-10-01", "privacy": "public"}
        ]))
    }

    fn stored_ids(store: &MemoryStore) -> Vec<String> {
        store
            .document()
            .and_then(|d| d.as_array().cloned())
            .unwrap_or_default()
            .iter()
            .filter_map(|r| r["id"].as_str().map(ToOwned::to_owned))
            .collect()
    }

    #[test]
    fn unauthorized_never_touches_the_store() {
        let store = base_store();
        let raw = json!({"id": "2025-10-02-am", "date": "2025-10-02"});

        for (credential, expected) in [
            (None, Some(KEY)),
            (Some("wrong"), Some(KEY)),
            (Some(KEY), None),
            (Some(""), Some("")),
        ] {
            let err = write_entry(&store, credential, expected, &raw).expect_err("rejected");
            assert!(matches!(err, WriteError::Unauthorized));
        }
        assert_eq!(store.write_count(), 0);
        assert_eq!(stored_ids(&store), vec!["2025-10-01-am"]);
    }

    #[test]
    fn authorization_is_checked_before_validation() {
        let store = base_store();
        let err = write_entry(&store, Some("wrong"), Some(KEY), &json!("not an object"))
            .expect_err("rejected");
        assert!(matches!(err, WriteError::Unauthorized));
    }

    #[test]
    fn bad_payloads_are_rejected_without_writing() {
        let store = base_store();
        let err = write_entry(
            &store,
            Some(KEY),
            Some(KEY),
            &json!({"id": "x", "date": "2025-10-02", "lunar_phase": "full_moon"}),
        )
        .expect_err("legacy phase rejected on write");
        assert!(matches!(
            err,
            WriteError::Validation(ValidationError::InvalidLunarPhase(_))
        ));
        assert_eq!(err.to_string(), "bad payload: invalid lunar_phase: full_moon");
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn write_upserts_and_reports_count() {
        let store = base_store();
        let outcome = write_entry(
            &store,
            Some(KEY),
            Some(KEY),
            &json!({"id": "2025-10-02-am", "date": "2025-10-02", "mood": "bright"}),
        )
        .expect("write");
        assert!(outcome.ok);
        assert_eq!(outcome.count, 2);
        assert_eq!(outcome.sha256.len(), 64);
        assert_eq!(stored_ids(&store), vec!["2025-10-02-am", "2025-10-01-am"]);

        let again = write_entry(
            &store,
            Some(KEY),
            Some(KEY),
            &json!({"id": "2025-10-02-am", "date": "2025-10-02", "mood": "dim"}),
        )
        .expect("rewrite");
        assert_eq!(again.count, 2);
        let doc = store.document().expect("document");
        assert_eq!(doc[0]["mood"], "dim");
    }

    #[test]
    fn unreadable_store_writes_over_seed() {
        let store = MemoryStore::unreachable();
        let outcome = write_entry(
            &store,
            Some(KEY),
            Some(KEY),
            &json!({"id": "2030-01-01-am", "date": "2030-01-01"}),
        )
        .expect("write");
        assert!(outcome.count > 1);
        assert_eq!(stored_ids(&store)[0], "2030-01-01-am");
    }

    #[test]
    fn concurrent_writers_lose_updates() {
        let store = base_store();
        let stale = read_document(&store).entries;

        write_entry(
            &store,
            Some(KEY),
            Some(KEY),
            &json!({"id": "b", "date": "2025-10-03"}),
        )
        .expect("writer b");
        store
            .replace(&upsert(stale, Entry::new("a", "2025-10-02")))
            .expect("writer a");

        let ids = stored_ids(&store);
        assert!(ids.contains(&"a".to_string()));
        assert!(!ids.contains(&"b".to_string()));
    }

    #[test]
    fn audited_write_logs_both_outcomes() {
        let tmp = tempdir().expect("tempdir");
        let paths = test_paths(tmp.path());
        let store = base_store();
        let raw = json!({"id": "2025-10-02-am", "date": "2025-10-02"});

        write_entry_audited(&paths, &store, Some("nope"), Some(KEY), &raw).expect_err("rejected");
        write_entry_audited(&paths, &store, Some(KEY), Some(KEY), &raw).expect("write");

        let log = std::fs::read_to_string(audit::audit_log_path(&paths)).expect("audit log");
        let lines = log.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("\"rejected\""));
        assert!(lines[1].contains("\"ok\""));
    }
}
