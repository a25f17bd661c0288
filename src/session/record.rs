//! The persisted session record

use serde::{Deserialize, Serialize};

/// Which path raised the pending question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClarificationKind {
    /// General follow-up question
    Clarification,
    /// The backend asked where the user is
    Location,
}

impl std::fmt::Display for ClarificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClarificationKind::Clarification => write!(f, "clarification"),
            ClarificationKind::Location => write!(f, "location"),
        }
    }
}

/// Conversation state carried across turns and process restarts.
///
/// Missing keys in a stored record fall back to their defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Session {
    /// Raw utterances collected while a clarification is pending
    #[serde(rename = "accumulated_user_input")]
    pub accumulated_inputs: Vec<String>,

    /// The question the backend is waiting on
    #[serde(rename = "last_gemini_question")]
    pub pending_question: Option<String>,

    #[serde(rename = "needs_clarification")]
    pub awaiting_clarification: bool,

    /// Which path raised `pending_question`
    pub pending_question_kind: Option<ClarificationKind>,

    /// Location the user supplied in answer to a location question
    pub user_defined_location: Option<String>,

    #[serde(rename = "last_retrieved_ip_location")]
    pub last_known_ip_location: Option<String>,
}

impl Session {
    /// The kind of question outstanding, if any
    pub fn pending_kind(&self) -> Option<ClarificationKind> {
        if self.awaiting_clarification {
            Some(
                self.pending_question_kind
                    .unwrap_or(ClarificationKind::Clarification),
            )
        } else {
            None
        }
    }

    /// Record a question raised in answer to `utterance`.
    pub fn raise_question(&mut self, utterance: &str, question: &str, kind: ClarificationKind) {
        self.accumulated_inputs.push(utterance.to_string());
        self.pending_question = Some(question.to_string());
        self.pending_question_kind = Some(kind);
        self.awaiting_clarification = true;
    }

    /// Clear the clarification cycle, keeping both location facts.
    pub fn reset_turn(&mut self) {
        self.accumulated_inputs.clear();
        self.pending_question = None;
        self.pending_question_kind = None;
        self.awaiting_clarification = false;
    }

    /// Bring a stored record back in line with the clarification invariants.
    ///
    /// Returns true when anything had to change.
    pub fn repair(&mut self) -> bool {
        let consistent = if self.awaiting_clarification {
            self.pending_question.is_some()
        } else {
            self.pending_question.is_none()
                && self.pending_question_kind.is_none()
                && self.accumulated_inputs.is_empty()
        };

        if !consistent {
            self.reset_turn();
        }
        !consistent
    }
}
