//! Core dialogue state machine
//!
//! Carries the session between turns, moves between Idle and
//! AwaitingClarification based on the parsed intent of each backend
//! response, and decides what the user hears or gets typed.

use tracing::{debug, info, warn};

use crate::backend::{BackendError, LanguageBackend};
use crate::calc;
use crate::location::now_formatted;
use crate::normalize::normalize;
use crate::session::{ClarificationKind, Session};

use super::intent::Intent;
use super::prompt::build_prompt;

/// Utterances that end the session
const TERMINATION_PHRASES: &[&str] = &["exit", "quit", "stop", "goodbye"];

/// The two dialogue states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Waiting for a new command
    Idle,
    /// A question is outstanding
    AwaitingClarification(ClarificationKind),
}

impl Default for State {
    fn default() -> Self {
        Self::Idle
    }
}

impl std::fmt::Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            State::Idle => write!(f, "Idle"),
            State::AwaitingClarification(kind) => write!(f, "AwaitingClarification({})", kind),
        }
    }
}

/// User-visible effect of a resolved turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Speak(String),
    Type(String),
}

/// Result of applying one backend response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub intent: Intent,
    pub action: Action,
    /// Whether the session changed and should be saved
    pub persist: bool,
}

/// Outcome of a full turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// A termination phrase was spoken; no backend call was made
    Terminate,
    Resolved(Resolution),
}

/// The dialogue state machine, owning the in-memory session
pub struct DialogueMachine {
    session: Session,
    /// IANA zone used for the time line of the prompt
    timezone: String,
    clock: fn(&str) -> String,
}

impl DialogueMachine {
    /// Create a machine resuming `session`
    pub fn new(session: Session, timezone: impl Into<String>) -> Self {
        Self {
            session,
            timezone: timezone.into(),
            clock: now_formatted,
        }
    }

    /// Replace the clock used to render the current time
    #[cfg(test)]
    pub fn with_clock(mut self, clock: fn(&str) -> String) -> Self {
        self.clock = clock;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Record the location label found at startup
    pub fn set_ip_location(&mut self, label: impl Into<String>) {
        self.session.last_known_ip_location = Some(label.into());
    }

    /// Current state, derived from the session
    pub fn state(&self) -> State {
        match self.session.pending_kind() {
            Some(kind) => State::AwaitingClarification(kind),
            None => State::Idle,
        }
    }

    /// The question to repeat when a restart finds one still outstanding
    pub fn resume_question(&self) -> Option<&str> {
        match self.state() {
            State::Idle => None,
            State::AwaitingClarification(_) => self.session.pending_question.as_deref(),
        }
    }

    /// Check whether a normalized utterance ends the session
    pub fn is_termination(normalized: &str) -> bool {
        let candidate = normalized.trim().to_lowercase();
        TERMINATION_PHRASES.contains(&candidate.as_str())
    }

    /// Build the backend prompt for an already normalized utterance
    pub fn build_prompt(&self, normalized: &str) -> String {
        let current_time = (self.clock)(&self.timezone);
        build_prompt(&self.session, &current_time, normalized)
    }

    /// Run one full turn for `raw`.
    ///
    /// Termination phrases short-circuit before the backend is consulted and
    /// clear the in-memory session; the caller resets the stored record.
    pub async fn handle_turn(&mut self, raw: &str, backend: &dyn LanguageBackend) -> TurnOutcome {
        let normalized = normalize(raw);
        debug!(%normalized, "normalized utterance");

        if Self::is_termination(&normalized) {
            info!("termination phrase received");
            self.session = Session::default();
            return TurnOutcome::Terminate;
        }

        let prompt = self.build_prompt(&normalized);
        debug!(%prompt, "sending prompt");

        let response = backend.complete(&prompt).await;
        TurnOutcome::Resolved(self.apply_response(raw, response))
    }

    /// Parse a backend response and apply its transition.
    ///
    /// `raw` is the utterance as heard; it is what gets stored in the
    /// session, both as accumulated input and as a user-supplied location.
    pub fn apply_response(
        &mut self,
        raw: &str,
        response: Result<String, BackendError>,
    ) -> Resolution {
        let intent = match response {
            Ok(text) => {
                let intent = Intent::parse(&text);
                if let Intent::Unrecognized(_) = intent {
                    warn!("backend response carried no recognized tag");
                }
                intent
            }
            Err(e) => {
                warn!(kind = %e.kind, error = %e, "backend request failed");
                Intent::Unrecognized(e.user_message())
            }
        };

        debug!(payload = intent.payload(), "parsed response");

        let old_state = self.state();
        let action = self.transition(raw, &intent);
        let new_state = self.state();

        info!(
            intent = %intent,
            from = %old_state,
            to = %new_state,
            "turn resolved"
        );

        Resolution {
            intent,
            action,
            persist: true,
        }
    }

    fn transition(&mut self, raw: &str, intent: &Intent) -> Action {
        match intent {
            Intent::Calculate(expression) => {
                let (output, success) = calc::evaluate(expression);
                info!(%expression, %output, success, "calculation");
                self.session.reset_turn();
                Action::Speak(output)
            }
            Intent::Write(text) => {
                self.session.reset_turn();
                Action::Type(text.clone())
            }
            Intent::Speak(text) => {
                if self.state() == State::AwaitingClarification(ClarificationKind::Location) {
                    let location = raw.trim().to_string();
                    info!(%location, "user location recorded");
                    self.session.user_defined_location = Some(location);
                }
                self.session.reset_turn();
                Action::Speak(text.clone())
            }
            Intent::NeedsClarification(question) => {
                self.session
                    .raise_question(raw, question, ClarificationKind::Clarification);
                Action::Speak(question.clone())
            }
            Intent::NeedsLocation(question) => {
                self.session
                    .raise_question(raw, question, ClarificationKind::Location);
                Action::Speak(question.clone())
            }
            Intent::Unrecognized(text) => {
                self.session.reset_turn();
                Action::Speak(text.trim().to_string())
            }
        }
    }
}
