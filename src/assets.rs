/// Document served when the store cannot be read.
pub const SEED_DOCUMENT: &str = include_str!("../assets/seed_logs.json");

/// Cycle plans used when the author has not written a cycles file.
pub const DEFAULT_CYCLES: &str = include_str!("../assets/cycles.json5");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_document_is_a_json_array() {
        let parsed: serde_json::Value = serde_json::from_str(SEED_DOCUMENT).expect("seed parses");
        assert!(parsed.as_array().is_some_and(|a| !a.is_empty()));
    }

    #[test]
    fn default_cycles_parse_as_json5() {
        let parsed: serde_json::Value = json5::from_str(DEFAULT_CYCLES).expect("cycles parse");
        assert_eq!(parsed.as_array().map(Vec::len), Some(1));
    }
}
