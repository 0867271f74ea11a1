//! Raw JSON records to canonical [`Entry`] values.
//!
//! Two entry points with deliberately different strictness:
//! [`normalize_lenient`] tolerates legacy enum values on the read path, while
//! [`validate_for_write`] rejects them before anything reaches the store.

use crate::error::ValidationError;
use crate::journal::entry::{Entry, Phase, Privacy};
use crate::journal::warn;
use chrono::NaiveDate;
use serde_json::{Map, Value};

const PHASE_ALIASES: &[(&str, Phase)] = &[("full_moon", Phase::Full)];

type Record = Map<String, Value>;

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => true,
        Value::String(s) => s.is_empty(),
        Value::Number(n) => n.as_f64() == Some(0.0),
        _ => false,
    }
}

fn number_to_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite())
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => {
            let trimmed = s.trim();
            trimmed.parse::<i64>().ok().or_else(|| {
                trimmed
                    .parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(|f| f.trunc() as i64)
            })
        }
        _ => None,
    }
}

fn string_array(record: &Record, key: &str) -> Vec<String> {
    match record.get(key) {
        Some(Value::Array(items)) => items.iter().filter_map(scalar_to_string).collect(),
        _ => Vec::new(),
    }
}

fn optional_text(record: &Record, key: &str) -> Option<String> {
    record
        .get(key)
        .filter(|v| !is_falsy(v))
        .and_then(scalar_to_string)
}

fn cycle_day(record: &Record) -> Option<i64> {
    match record.get("cycle_day") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(other) => number_to_i64(other),
    }
}

fn required_keys(record: &Record) -> Result<(String, String), ValidationError> {
    let id = record
        .get("id")
        .and_then(scalar_to_string)
        .unwrap_or_default();
    if id.is_empty() {
        return Err(ValidationError::MissingId);
    }
    let date = record
        .get("date")
        .and_then(scalar_to_string)
        .unwrap_or_default();
    if date.is_empty() {
        return Err(ValidationError::MissingDate);
    }
    Ok((id, date))
}

fn assemble(
    record: &Record,
    id: String,
    date: String,
    lunar_phase: Phase,
    privacy: Privacy,
) -> Entry {
    Entry {
        id,
        date,
        cycle_day: cycle_day(record),
        lunar_phase,
        tags: string_array(record, "tags"),
        symptoms: string_array(record, "symptoms"),
        practices: string_array(record, "practices"),
        threads: string_array(record, "threads"),
        herbs: string_array(record, "herbs"),
        mood: optional_text(record, "mood"),
        digestion_notes: optional_text(record, "digestion_notes"),
        digestion_tags: string_array(record, "digestion_tags"),
        baseline_prompt: optional_text(record, "baseline_prompt"),
        baseline_response: optional_text(record, "baseline_response"),
        what_helped: string_array(record, "what_helped"),
        what_hindered: string_array(record, "what_hindered"),
        thread_notes: optional_text(record, "thread_notes"),
        privacy,
        notes: record
            .get("notes")
            .and_then(scalar_to_string)
            .unwrap_or_default(),
        schema_version: record
            .get("schema_version")
            .and_then(number_to_i64)
            .unwrap_or(1),
    }
}

fn canonical_phase(raw: &str) -> Option<Phase> {
    Phase::parse(raw).or_else(|| {
        PHASE_ALIASES
            .iter()
            .find(|(alias, _)| *alias == raw)
            .map(|(_, phase)| *phase)
    })
}

/// Present-but-not-a-string enum values are reported with their JSON text.
fn enum_text(value: &Value) -> String {
    scalar_to_string(value).unwrap_or_else(|| value.to_string())
}

fn is_iso_date(date: &str) -> bool {
    date.len() == 10 && NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok()
}

/// Read-path normalization: unknown phases become `full`, unknown privacy
/// becomes `public`. Only structural problems (not an object, missing id or
/// date) are errors.
pub fn normalize_lenient(raw: &Value) -> Result<Entry, ValidationError> {
    let record = raw.as_object().ok_or(ValidationError::NotAnObject)?;
    let (id, date) = required_keys(record)?;

    let lunar_phase = record
        .get("lunar_phase")
        .and_then(scalar_to_string)
        .and_then(|raw| canonical_phase(&raw))
        .unwrap_or(Phase::Full);
    let privacy = record
        .get("privacy")
        .and_then(scalar_to_string)
        .and_then(|raw| Privacy::parse(&raw))
        .unwrap_or(Privacy::Public);

    let entry = assemble(record, id, date, lunar_phase, privacy);
    if let Some(tag) = entry.tags.iter().find(|t| t.contains(',')) {
        return Err(ValidationError::InvalidTag(tag.clone()));
    }
    Ok(entry)
}

/// Write-path validation. Absent enums take their defaults; present but
/// unrecognized values are rejected.
pub fn validate_for_write(raw: &Value) -> Result<Entry, ValidationError> {
    let record = raw.as_object().ok_or(ValidationError::NotAnObject)?;
    let (id, date) = required_keys(record)?;
    if !is_iso_date(&date) {
        return Err(ValidationError::InvalidDate(date));
    }

    let lunar_phase = match record.get("lunar_phase") {
        None | Some(Value::Null) => Phase::Full,
        Some(value) => {
            let text = enum_text(value);
            Phase::parse(&text).ok_or(ValidationError::InvalidLunarPhase(text))?
        }
    };
    let privacy = match record.get("privacy") {
        None | Some(Value::Null) => Privacy::Public,
        Some(value) => {
            let text = enum_text(value);
            Privacy::parse(&text).ok_or(ValidationError::InvalidPrivacy(text))?
        }
    };

    Ok(assemble(record, id, date, lunar_phase, privacy))
}

/// Leniently normalizes every record of a document, dropping (and reporting)
/// records that cannot be salvaged.
pub fn normalize_document(records: &[Value], source: &str) -> Vec<Entry> {
    let mut out = Vec::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        match normalize_lenient(record) {
            Ok(entry) => out.push(entry),
            Err(err) => warn::emit(
                "record_dropped",
                "normalize",
                source,
                &format!("index {index}"),
                &err.to_string(),
            ),
        }
    }
    out
}
