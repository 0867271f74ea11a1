use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    New,
    WaxingCrescent,
    FirstQuarter,
    WaxingGibbous,
    Full,
    WaningGibbous,
    LastQuarter,
    WaningCrescent,
}

impl Phase {
    pub const ALL: [Phase; 8] = [
        Phase::New,
        Phase::WaxingCrescent,
        Phase::FirstQuarter,
        Phase::WaxingGibbous,
        Phase::Full,
        Phase::WaningGibbous,
        Phase::LastQuarter,
        Phase::WaningCrescent,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::WaxingCrescent => "waxing_crescent",
            Self::FirstQuarter => "first_quarter",
            Self::WaxingGibbous => "waxing_gibbous",
            Self::Full => "full",
            Self::WaningGibbous => "waning_gibbous",
            Self::LastQuarter => "last_quarter",
            Self::WaningCrescent => "waning_crescent",
        }
    }

    /// Canonical names only; legacy aliases are handled by the lenient normalizer.
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|phase| phase.as_str() == raw)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::New => "New",
            Self::WaxingCrescent => "Waxing Crescent",
            Self::FirstQuarter => "First Quarter",
            Self::WaxingGibbous => "Waxing Gibbous",
            Self::Full => "Full",
            Self::WaningGibbous => "Waning Gibbous",
            Self::LastQuarter => "Last Quarter",
            Self::WaningCrescent => "Waning Crescent",
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            Self::New => "🌑",
            Self::WaxingCrescent => "🌒",
            Self::FirstQuarter => "🌓",
            Self::WaxingGibbous => "🌔",
            Self::Full => "🌕",
            Self::WaningGibbous => "🌖",
            Self::LastQuarter => "🌗",
            Self::WaningCrescent => "🌘",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Privacy {
    Public,
    Anon,
    Private,
}

impl Privacy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Anon => "anon",
            Self::Private => "private",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "public" => Some(Self::Public),
            "anon" => Some(Self::Anon),
            "private" => Some(Self::Private),
            _ => None,
        }
    }
}

impl fmt::Display for Privacy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One logged observation, in canonical form.
///
/// Every field is always serialized so a stored document round-trips through
/// the lenient normalizer unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: String,
    pub date: String,
    pub cycle_day: Option<i64>,
    pub lunar_phase: Phase,
    pub tags: Vec<String>,
    pub symptoms: Vec<String>,
    pub practices: Vec<String>,
    pub threads: Vec<String>,
    pub herbs: Vec<String>,
    pub mood: Option<String>,
    pub digestion_notes: Option<String>,
    pub digestion_tags: Vec<String>,
    pub baseline_prompt: Option<String>,
    pub baseline_response: Option<String>,
    pub what_helped: Vec<String>,
    pub what_hindered: Vec<String>,
    pub thread_notes: Option<String>,
    pub privacy: Privacy,
    pub notes: String,
    pub schema_version: i64,
}

impl Entry {
    /// Minimal public entry; mostly useful for building fixtures.
    pub fn new(id: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            date: date.into(),
            cycle_day: None,
            lunar_phase: Phase::Full,
            tags: Vec::new(),
            symptoms: Vec::new(),
            practices: Vec::new(),
            threads: Vec::new(),
            herbs: Vec::new(),
            mood: None,
            digestion_notes: None,
            digestion_tags: Vec::new(),
            baseline_prompt: None,
            baseline_response: None,
            what_helped: Vec::new(),
            what_hindered: Vec::new(),
            thread_notes: None,
            privacy: Privacy::Public,
            notes: String::new(),
            schema_version: 1,
        }
    }

    pub fn cycle_day_label(&self) -> String {
        match self.cycle_day {
            Some(day) => format!("CD {day}"),
            None => "CD —".to_string(),
        }
    }
}

/// Id used by the compose flow: one slot per half day.
pub fn compose_id(date: &str, part: DayPart) -> String {
    format!("{date}-{}", part.as_str())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DayPart {
    #[default]
    Am,
    Pm,
}

impl DayPart {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Am => "am",
            Self::Pm => "pm",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_names_round_trip() {
        for phase in Phase::ALL {
            assert_eq!(Phase::parse(phase.as_str()), Some(phase));
        }
        assert_eq!(Phase::parse("full_moon"), None);
    }

    #[test]
    fn entry_serializes_every_field() {
        let json = serde_json::to_value(Entry::new("2025-10-02-am", "2025-10-02")).expect("json");
        assert_eq!(json["lunar_phase"], "full");
        assert_eq!(json["privacy"], "public");
        assert!(json["herbs"].as_array().expect("herbs").is_empty());
        assert!(json["mood"].is_null());
        assert_eq!(json["schema_version"], 1);
    }

    #[test]
    fn compose_id_uses_day_part_suffix() {
        assert_eq!(compose_id("2025-10-02", DayPart::Pm), "2025-10-02-pm");
    }

    #[test]
    fn cycle_day_label_has_placeholder() {
        let mut e = Entry::new("x", "2025-10-02");
        assert_eq!(e.cycle_day_label(), "CD —");
        e.cycle_day = Some(13);
        assert_eq!(e.cycle_day_label(), "CD 13");
    }
}
