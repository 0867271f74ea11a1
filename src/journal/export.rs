use crate::journal::entry::Entry;
use anyhow::Result;
use serde_json::Value;

/// Column order of the CSV export; matches the serialized field order.
pub const CSV_COLUMNS: &[&str] = &[
    "id",
    "date",
    "cycle_day",
    "lunar_phase",
    "tags",
    "symptoms",
    "practices",
    "threads",
    "herbs",
    "mood",
    "digestion_notes",
    "digestion_tags",
    "baseline_prompt",
    "baseline_response",
    "what_helped",
    "what_hindered",
    "thread_notes",
    "privacy",
    "notes",
    "schema_version",
];

pub fn to_json(entries: &[Entry]) -> Result<String> {
    Ok(format!("{}\n", serde_json::to_string_pretty(entries)?))
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(cell_text).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}

fn quote(text: &str) -> String {
    format!("\"{}\"", text.replace('"', "\"\""))
}

/// Every cell is quoted; list fields are comma-joined inside their cell.
pub fn to_csv(entries: &[Entry]) -> Result<String> {
    if entries.is_empty() {
        return Ok(String::new());
    }
    let mut lines = Vec::with_capacity(entries.len() + 1);
    lines.push(CSV_COLUMNS.join(","));
    for entry in entries {
        let row = serde_json::to_value(entry)?;
        let cells = CSV_COLUMNS
            .iter()
            .map(|column| quote(&cell_text(row.get(*column).unwrap_or(&Value::Null))))
            .collect::<Vec<_>>();
        lines.push(cells.join(","));
    }
    Ok(format!("{}\n", lines.join("\n")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::entry::Privacy;

    #[test]
    fn empty_export_is_empty() {
        assert_eq!(to_csv(&[]).expect("csv"), "");
    }

    #[test]
    fn csv_quotes_everything_and_joins_lists() {
        let mut e = Entry::new("2025-10-02-pm", "2025-10-02");
        e.tags = vec!["TCM".to_string(), "sleep".to_string()];
        e.notes = "said \"enough\"".to_string();
        e.privacy = Privacy::Anon;
        e.cycle_day = Some(3);

        let csv = to_csv(&[e]).expect("csv");
        let lines = csv.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("id,date,cycle_day,lunar_phase,tags"));
        assert!(
            lines[1].starts_with("\"2025-10-02-pm\",\"2025-10-02\",\"3\",\"full\",\"TCM,sleep\"")
        );
        assert!(lines[1].contains("\"said \"\"enough\"\"\""));
        assert!(lines[1].contains(",\"\",\"anon\","));
    }

    #[test]
    fn header_matches_serialized_fields() {
        let row = serde_json::to_value(Entry::new("a", "2025-01-01")).expect("value");
        let object = row.as_object().expect("object");
        assert_eq!(object.len(), CSV_COLUMNS.len());
        for column in CSV_COLUMNS {
            assert!(object.contains_key(*column), "missing {column}");
        }
    }

    #[test]
    fn json_export_is_an_array() {
        let json = to_json(&[Entry::new("a", "2025-01-01")]).expect("json");
        let parsed: Value = serde_json::from_str(&json).expect("parse");
        assert_eq!(parsed[0]["id"], "a");
    }
}
