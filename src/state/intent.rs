//! Backend response parsing
//!
//! Every response is expected to open with exactly one tag. The tags are
//! mutually exclusive and none is a prefix of another, so the order they
//! are tried in never changes the outcome.

use std::fmt;

/// The action category resolved for a turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Arithmetic expression to evaluate and speak
    Calculate(String),
    /// Text to type into the focused application
    Write(String),
    /// Final answer to speak
    Speak(String),
    /// Follow-up question before the command can complete
    NeedsClarification(String),
    /// Follow-up question asking where the user is
    NeedsLocation(String),
    /// Response without a recognized tag, kept verbatim
    Unrecognized(String),
}

pub const CALCULATE_TAG: &str = "CALCULATE:";
pub const WRITE_TAG: &str = "WRITE_RESPONSE:";
pub const SPEAK_TAG: &str = "SPEAK_RESPONSE:";
pub const CLARIFICATION_TAG: &str = "CLARIFICATION_NEEDED:";
pub const LOCATION_TAG: &str = "LOCATION_NEEDED:";

/// Tag table in priority order
const TAGS: &[(&str, fn(String) -> Intent)] = &[
    (CALCULATE_TAG, Intent::Calculate),
    (WRITE_TAG, Intent::Write),
    (SPEAK_TAG, Intent::Speak),
    (CLARIFICATION_TAG, Intent::NeedsClarification),
    (LOCATION_TAG, Intent::NeedsLocation),
];

impl Intent {
    /// Parse a raw backend response.
    ///
    /// Leading whitespace is ignored when matching a tag; the payload after
    /// the tag is trimmed.
    pub fn parse(response: &str) -> Self {
        let candidate = response.trim_start();
        TAGS.iter()
            .find_map(|(tag, variant)| {
                candidate
                    .strip_prefix(tag)
                    .map(|payload| variant(payload.trim().to_string()))
            })
            .unwrap_or_else(|| Intent::Unrecognized(response.to_string()))
    }

    /// The text this intent carries
    pub fn payload(&self) -> &str {
        match self {
            Intent::Calculate(s)
            | Intent::Write(s)
            | Intent::Speak(s)
            | Intent::NeedsClarification(s)
            | Intent::NeedsLocation(s)
            | Intent::Unrecognized(s) => s,
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Intent::Calculate(_) => write!(f, "CALCULATE"),
            Intent::Write(_) => write!(f, "WRITE"),
            Intent::Speak(_) => write!(f, "SPEAK"),
            Intent::NeedsClarification(_) => write!(f, "NEEDS_CLARIFICATION"),
            Intent::NeedsLocation(_) => write!(f, "NEEDS_LOCATION"),
            Intent::Unrecognized(_) => write!(f, "UNRECOGNIZED"),
        }
    }
}
