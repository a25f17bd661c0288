//! Speech collaborators
//!
//! Capture turns audio (or a typed stand-in) into a transcript; output
//! reads text aloud. Both are external programs behind small traits so the
//! turn loop can be driven by fakes in tests.

mod command;
mod stdin;

pub use command::{CommandListener, CommandSpeaker};
pub use stdin::StdinListener;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Errors raised by speech output
#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("failed to start speech command '{program}': {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("speech command '{program}' exited with {status}")]
    Failed { program: String, status: String },
}

/// What a single listen produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Heard {
    Utterance(String),
    /// Timeout, blank transcript or unrecognized audio
    Silence,
    /// The input source is gone; no further utterances will arrive
    Closed,
}

/// Speech capture
#[async_trait]
pub trait Listener: Send + Sync {
    /// Wait up to `timeout` for speech to start and up to `max_phrase` for it
    /// to finish.
    async fn listen(&self, timeout: Duration, max_phrase: Duration) -> Heard;
}

/// Speech output
#[async_trait]
pub trait Speaker: Send + Sync {
    /// Speak `text`, returning once playback has finished
    async fn speak(&self, text: &str) -> Result<(), SpeechError>;
}

/// Treat blank transcripts as no utterance at all
fn transcript(raw: &str) -> Heard {
    let text = raw.trim();
    if text.is_empty() {
        Heard::Silence
    } else {
        Heard::Utterance(text.to_string())
    }
}
