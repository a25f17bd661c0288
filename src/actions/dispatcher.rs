//! Dispatches resolved actions to the speech and keyboard collaborators

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use crate::keyboard::Typist;
use crate::speech::Speaker;
use crate::state::Action;

/// Spoken before typing so the user can move focus to the target window
pub const TYPING_WARNING: &str =
    "Okay, I will type that for you. Please switch to the desired application now.";

pub struct ActionDispatcher {
    speaker: Arc<dyn Speaker>,
    typist: Arc<dyn Typist>,
    /// Pause between the typing warning and the first keystroke
    settle_delay: Duration,
}

impl ActionDispatcher {
    pub fn new(speaker: Arc<dyn Speaker>, typist: Arc<dyn Typist>, settle_delay: Duration) -> Self {
        Self {
            speaker,
            typist,
            settle_delay,
        }
    }

    /// Perform `action`. Collaborator failures never propagate.
    pub async fn dispatch(&self, action: &Action) {
        match action {
            Action::Speak(text) => self.speak(text).await,
            Action::Type(text) => self.type_text(text).await,
        }
    }

    /// Speak `text`, logging playback failures
    pub async fn speak(&self, text: &str) {
        if let Err(e) = self.speaker.speak(text).await {
            error!(error = %e, text, "speech output failed");
        }
    }

    async fn type_text(&self, text: &str) {
        self.speak(TYPING_WARNING).await;
        tokio::time::sleep(self.settle_delay).await;

        match self.typist.type_text(text).await {
            Ok(()) => {
                let preview: String = text.chars().take(50).collect();
                info!(%preview, "typed response");
            }
            Err(e) => {
                error!(error = %e, "typing failed");
                self.speak(&format!("I encountered an error trying to type: {}", e))
                    .await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::keyboard::TypingError;
    use crate::speech::SpeechError;

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
        fail: bool,
    }

    #[async_trait]
    impl Typist for RecordingTypist {
        async fn type_text(&self, text: &str) -> Result<(), TypingError> {
            if self.fail {
                return Err(TypingError::Failed("exit status: 1".to_string()));
            }
            self.typed.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    fn create_dispatcher(
        typist: RecordingTypist,
    ) -> (ActionDispatcher, Arc<RecordingSpeaker>, Arc<RecordingTypist>) {
        let speaker = Arc::new(RecordingSpeaker::default());
        let typist = Arc::new(typist);
        let dispatcher = ActionDispatcher::new(speaker.clone(), typist.clone(), Duration::ZERO);
        (dispatcher, speaker, typist)
    }

    #[tokio::test]
    async fn test_speak() {
        let (dispatcher, speaker, typist) = create_dispatcher(RecordingTypist::default());

        dispatcher.dispatch(&Action::Speak("40".to_string())).await;

        assert_eq!(*speaker.spoken.lock().unwrap(), vec!["40"]);
        assert!(typist.typed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_type_warns_first() {
        let (dispatcher, speaker, typist) = create_dispatcher(RecordingTypist::default());

        dispatcher
            .dispatch(&Action::Type("hello world".to_string()))
            .await;

        assert_eq!(*speaker.spoken.lock().unwrap(), vec![TYPING_WARNING]);
        assert_eq!(*typist.typed.lock().unwrap(), vec!["hello world"]);
    }

    #[tokio::test]
    async fn test_typing_failure_is_spoken() {
        let (dispatcher, speaker, _typist) = create_dispatcher(RecordingTypist {
            fail: true,
            ..Default::default()
        });

        dispatcher.dispatch(&Action::Type("hello".to_string())).await;

        let spoken = speaker.spoken.lock().unwrap();
        assert_eq!(spoken.len(), 2);
        assert!(spoken[1].starts_with("I encountered an error trying to type:"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_settle_delay_before_typing() {
        let speaker = Arc::new(RecordingSpeaker::default());
        let typist = Arc::new(RecordingTypist::default());
        let dispatcher =
            ActionDispatcher::new(speaker, typist.clone(), Duration::from_secs(2));

        let start = tokio::time::Instant::now();
        dispatcher.dispatch(&Action::Type("hi".to_string())).await;

        assert!(start.elapsed() >= Duration::from_secs(2));
        assert_eq!(*typist.typed.lock().unwrap(), vec!["hi"]);
    }
}
