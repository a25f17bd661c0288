//! Speech collaborators backed by external programs

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::{transcript, Heard, Listener, SpeechError, Speaker};

/// Reads text aloud by running a TTS program with the text as last argument
pub struct CommandSpeaker {
    program: String,
    args: Vec<String>,
}

impl CommandSpeaker {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

#[async_trait]
impl Speaker for CommandSpeaker {
    async fn speak(&self, text: &str) -> Result<(), SpeechError> {
        info!(text, "speaking");

        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .status()
            .await
            .map_err(|source| SpeechError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !status.success() {
            return Err(SpeechError::Failed {
                program: self.program.clone(),
                status: status.to_string(),
            });
        }
        Ok(())
    }
}

/// Captures one utterance by running an STT program that prints the
/// transcript to stdout
pub struct CommandListener {
    program: String,
    args: Vec<String>,
}

impl CommandListener {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

#[async_trait]
impl Listener for CommandListener {
    async fn listen(&self, timeout: Duration, max_phrase: Duration) -> Heard {
        info!("listening");

        let output = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .output();

        match tokio::time::timeout(timeout + max_phrase, output).await {
            Ok(Ok(output)) if output.status.success() => {
                let heard = transcript(&String::from_utf8_lossy(&output.stdout));
                if heard == Heard::Silence {
                    debug!("could not understand audio");
                }
                heard
            }
            Ok(Ok(output)) => {
                warn!(status = %output.status, "speech capture command failed");
                Heard::Silence
            }
            Ok(Err(e)) => {
                warn!(program = %self.program, error = %e, "failed to run speech capture command");
                Heard::Silence
            }
            Err(_) => {
                debug!("no speech detected within the timeout period");
                Heard::Silence
            }
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_command_listener_reads_stdout() {
        let listener = CommandListener::new("echo", vec!["  what's ten times four ".to_string()]);
        let heard = listener
            .listen(Duration::from_secs(5), Duration::from_secs(5))
            .await;
        assert_eq!(heard, Heard::Utterance("what's ten times four".to_string()));
    }

    #[tokio::test]
    async fn test_command_listener_blank_output() {
        let listener = CommandListener::new("true", vec![]);
        let heard = listener
            .listen(Duration::from_secs(5), Duration::from_secs(5))
            .await;
        assert_eq!(heard, Heard::Silence);
    }

    #[tokio::test]
    async fn test_command_listener_timeout() {
        let listener = CommandListener::new("sleep", vec!["5".to_string()]);
        let heard = listener
            .listen(Duration::from_millis(50), Duration::from_millis(50))
            .await;
        assert_eq!(heard, Heard::Silence);
    }

    #[tokio::test]
    async fn test_command_speaker_reports_failure() {
        let speaker = CommandSpeaker::new("false", vec![]);
        let err = speaker.speak("hello").await.unwrap_err();
        assert!(matches!(err, SpeechError::Failed { .. }));

        let speaker = CommandSpeaker::new("definitely-not-a-tts-program", vec![]);
        let err = speaker.speak("hello").await.unwrap_err();
        assert!(matches!(err, SpeechError::Spawn { .. }));
    }
}
