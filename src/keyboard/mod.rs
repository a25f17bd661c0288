//! Keystroke injection
//!
//! Types text into whichever application has focus. macOS posts unicode
//! keyboard events through Quartz; other platforms drive `xdotool`.

#[cfg(target_os = "macos")]
mod quartz;
#[cfg(not(target_os = "macos"))]
mod xdotool;

#[cfg(target_os = "macos")]
pub use quartz::QuartzTypist as SystemTypist;
#[cfg(not(target_os = "macos"))]
pub use xdotool::XdotoolTypist as SystemTypist;

use async_trait::async_trait;
use thiserror::Error;

/// Delay between simulated keystrokes
pub const KEYSTROKE_INTERVAL_MS: u64 = 10;

/// Errors that can occur while typing
#[derive(Debug, Error)]
pub enum TypingError {
    #[cfg(target_os = "macos")]
    #[error("failed to create keyboard event")]
    EventCreation,

    #[error("failed to run typing command: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("typing command exited with {0}")]
    Failed(String),
}

/// Keystroke injection collaborator
#[async_trait]
pub trait Typist: Send + Sync {
    async fn type_text(&self, text: &str) -> Result<(), TypingError>;
}
