//! The turn loop
//!
//! Wires the collaborators to the dialogue state machine: listen, resolve
//! the turn, dispatch its action, persist the session.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use crate::actions::ActionDispatcher;
use crate::backend::LanguageBackend;
use crate::location::Locator;
use crate::session::{SessionError, SessionStore};
use crate::speech::{Heard, Listener};
use crate::state::{DialogueMachine, TurnOutcome};

const GREETING: &str = "Hello, I am your voice assistant. How can I help you today?";
const FAREWELL: &str = "Goodbye! Have a great day.";

/// Timing of the listen loop
#[derive(Debug, Clone, Copy)]
pub struct Timing {
    pub listen_timeout: Duration,
    pub max_phrase: Duration,
    pub turn_pause: Duration,
}

/// Outcome of processing a single captured utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    Terminated,
}

pub struct Assistant {
    machine: DialogueMachine,
    store: SessionStore,
    backend: Arc<dyn LanguageBackend>,
    listener: Arc<dyn Listener>,
    dispatcher: ActionDispatcher,
    timing: Timing,
}

impl Assistant {
    /// Greet the user, restore the session and resolve the location.
    ///
    /// A clarification left pending by a previous run is asked again before
    /// any new input is accepted.
    pub async fn start(
        store: SessionStore,
        locator: &dyn Locator,
        backend: Arc<dyn LanguageBackend>,
        listener: Arc<dyn Listener>,
        dispatcher: ActionDispatcher,
        timing: Timing,
    ) -> Result<Self, SessionError> {
        dispatcher.speak(GREETING).await;

        let session = store.load()?;
        let location = locator.locate().await;

        let mut machine = DialogueMachine::new(session, location.timezone);
        machine.set_ip_location(location.label);
        store.save(machine.session())?;

        info!(path = ?store.path(), state = %machine.state(), "session restored");

        if let Some(question) = machine.resume_question() {
            info!(%question, "resuming incomplete command");
            dispatcher
                .speak(&format!(
                    "Welcome back! Last time, I was trying to understand your request. {}",
                    question
                ))
                .await;
        }

        Ok(Self {
            machine,
            store,
            backend,
            listener,
            dispatcher,
            timing,
        })
    }

    pub fn machine(&self) -> &DialogueMachine {
        &self.machine
    }

    /// Run turns until a termination phrase is heard or the input closes.
    ///
    /// A closed input leaves the session as it is, like a shutdown signal.
    pub async fn run(&mut self) {
        info!("entering turn loop");
        loop {
            let heard = self
                .listener
                .listen(self.timing.listen_timeout, self.timing.max_phrase)
                .await;

            match heard {
                Heard::Utterance(utterance) => {
                    if self.process(&utterance).await == Step::Terminated {
                        return;
                    }
                }
                Heard::Silence => {}
                Heard::Closed => {
                    info!("input closed, leaving turn loop");
                    return;
                }
            }

            tokio::time::sleep(self.timing.turn_pause).await;
        }
    }

    /// Resolve one utterance end to end
    pub async fn process(&mut self, utterance: &str) -> Step {
        info!(%utterance, "heard");

        match self.machine.handle_turn(utterance, self.backend.as_ref()).await {
            TurnOutcome::Terminate => {
                self.dispatcher.speak(FAREWELL).await;
                if let Err(e) = self.store.reset_to_default() {
                    error!(error = %e, "failed to reset session");
                }
                info!("session terminated");
                Step::Terminated
            }
            TurnOutcome::Resolved(resolution) => {
                self.dispatcher.dispatch(&resolution.action).await;
                if resolution.persist {
                    if let Err(e) = self.store.save(self.machine.session()) {
                        error!(error = %e, "failed to save session");
                    }
                }
                Step::Continue
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use tempfile::TempDir;

    use super::*;
    use crate::backend::BackendError;
    use crate::keyboard::{Typist, TypingError};
    use crate::location::Location;
    use crate::session::{ClarificationKind, Session};
    use crate::speech::{SpeechError, Speaker};

    struct FixedLocator;

    #[async_trait]
    impl Locator for FixedLocator {
        async fn locate(&self) -> Location {
            Location {
                label: "Cambridge, Massachusetts, US".to_string(),
                timezone: "America/New_York".to_string(),
            }
        }
    }

    struct ScriptedBackend {
        responses: Mutex<VecDeque<String>>,
        calls: Mutex<usize>,
    }

    #[async_trait]
    impl LanguageBackend for ScriptedBackend {
        async fn complete(&self, _prompt: &str) -> Result<String, BackendError> {
            *self.calls.lock().unwrap() += 1;
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| BackendError::unknown("script exhausted"))
        }
    }

    /// Plays back `Some` as an utterance and `None` as silence, then closes
    struct ScriptedListener {
        utterances: Mutex<VecDeque<Option<String>>>,
    }

    #[async_trait]
    impl Listener for ScriptedListener {
        async fn listen(&self, _timeout: Duration, _max_phrase: Duration) -> Heard {
            match self.utterances.lock().unwrap().pop_front() {
                Some(Some(utterance)) => Heard::Utterance(utterance),
                Some(None) => Heard::Silence,
                None => Heard::Closed,
            }
        }
    }

    #[derive(Default)]
    struct RecordingSpeaker {
        spoken: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Speaker for RecordingSpeaker {
        async fn speak(&self, text: &str) -> Result<(), SpeechError> {
            self.spoken.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingTypist {
        typed: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Typist for RecordingTypist {
        async fn type_text(&self, text: &str) -> Result<(), TypingError> {
            self.typed.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    struct Harness {
        _dir: TempDir,
        store: SessionStore,
        backend: Arc<ScriptedBackend>,
        speaker: Arc<RecordingSpeaker>,
        typist: Arc<RecordingTypist>,
    }

    impl Harness {
        fn new(stored: Option<Session>) -> Self {
            let dir = TempDir::new().unwrap();
            let store = SessionStore::new(dir.path().join("conversation_memory.json"));
            if let Some(session) = stored {
                store.save(&session).unwrap();
            }
            Self {
                _dir: dir,
                store,
                backend: Arc::new(ScriptedBackend {
                    responses: Mutex::default(),
                    calls: Mutex::new(0),
                }),
                speaker: Arc::default(),
                typist: Arc::default(),
            }
        }

        async fn start(&self, responses: &[&str], utterances: &[Option<&str>]) -> Assistant {
            *self.backend.responses.lock().unwrap() =
                responses.iter().map(|r| r.to_string()).collect();
            let listener = Arc::new(ScriptedListener {
                utterances: Mutex::new(
                    utterances
                        .iter()
                        .map(|u| u.map(str::to_string))
                        .collect(),
                ),
            });
            let dispatcher = ActionDispatcher::new(
                self.speaker.clone(),
                self.typist.clone(),
                Duration::ZERO,
            );
            let timing = Timing {
                listen_timeout: Duration::ZERO,
                max_phrase: Duration::ZERO,
                turn_pause: Duration::ZERO,
            };

            Assistant::start(
                self.store.clone(),
                &FixedLocator,
                self.backend.clone(),
                listener,
                dispatcher,
                timing,
            )
            .await
            .unwrap()
        }

        fn spoken(&self) -> Vec<String> {
            self.speaker.spoken.lock().unwrap().clone()
        }
    }

    #[tokio::test]
    async fn test_startup_records_ip_location() {
        let harness = Harness::new(None);

        let assistant = harness.start(&[], &[]).await;

        assert_eq!(harness.spoken(), vec![GREETING]);
        let stored = harness.store.load().unwrap();
        assert_eq!(
            stored.last_known_ip_location.as_deref(),
            Some("Cambridge, Massachusetts, US")
        );
        assert_eq!(assistant.machine().session(), &stored);
    }

    #[tokio::test]
    async fn test_calculation_turn() {
        let harness = Harness::new(None);
        let mut assistant = harness.start(&["CALCULATE:10 * 4"], &[]).await;

        let step = assistant.process("what's ten times four").await;

        assert_eq!(step, Step::Continue);
        assert_eq!(harness.spoken().last().unwrap(), "40");
        assert!(!harness.store.load().unwrap().awaiting_clarification);
    }

    #[tokio::test]
    async fn test_write_turn() {
        let harness = Harness::new(None);
        let mut assistant = harness.start(&["WRITE_RESPONSE:hello world"], &[]).await;

        assistant.process("type hello world").await;

        assert_eq!(*harness.typist.typed.lock().unwrap(), vec!["hello world"]);
    }

    #[tokio::test]
    async fn test_location_dialogue_survives_restart() {
        let harness = Harness::new(None);
        let mut assistant = harness
            .start(&["LOCATION_NEEDED:What city are you in?"], &[])
            .await;

        assistant.process("what's the weather").await;

        assert_eq!(harness.spoken().last().unwrap(), "What city are you in?");
        let stored = harness.store.load().unwrap();
        assert!(stored.awaiting_clarification);
        assert_eq!(stored.pending_question_kind, Some(ClarificationKind::Location));
        assert_eq!(stored.accumulated_inputs, vec!["what's the weather"]);
        drop(assistant);

        let mut restarted = harness.start(&["SPEAK_RESPONSE:Okay, noted."], &[]).await;
        assert_eq!(
            harness.spoken().last().unwrap(),
            "Welcome back! Last time, I was trying to understand your request. What city are you in?"
        );

        restarted.process("Boston").await;

        let stored = harness.store.load().unwrap();
        assert_eq!(stored.user_defined_location.as_deref(), Some("Boston"));
        assert!(!stored.awaiting_clarification);
        assert!(stored.accumulated_inputs.is_empty());
        assert_eq!(harness.spoken().last().unwrap(), "Okay, noted.");
    }

    #[tokio::test]
    async fn test_run_skips_silence_and_terminates() {
        let mut stored = Session {
            user_defined_location: Some("Boston".to_string()),
            ..Default::default()
        };
        stored.raise_question("open", "Which file?", ClarificationKind::Clarification);
        let harness = Harness::new(Some(stored));
        let mut assistant = harness
            .start(&["SPEAK_RESPONSE:Done."], &[None, Some("the report"), None, Some("goodbye")])
            .await;

        assistant.run().await;

        assert_eq!(*harness.backend.calls.lock().unwrap(), 1);
        assert_eq!(harness.spoken().last().unwrap(), FAREWELL);
        assert_eq!(harness.store.load().unwrap(), Session::default());
    }

    #[tokio::test]
    async fn test_run_returns_when_input_closes() {
        let mut stored = Session::default();
        stored.raise_question(
            "what's the weather",
            "What city are you in?",
            ClarificationKind::Location,
        );
        let harness = Harness::new(Some(stored));
        let mut assistant = harness.start(&[], &[None, None]).await;

        assistant.run().await;

        assert_eq!(*harness.backend.calls.lock().unwrap(), 0);
        assert_ne!(harness.spoken().last().unwrap(), FAREWELL);
        let stored = harness.store.load().unwrap();
        assert!(stored.awaiting_clarification);
        assert_eq!(stored.pending_question.as_deref(), Some("What city are you in?"));
    }
}
