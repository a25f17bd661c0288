//! Keystroke injection via the `xdotool` command

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use super::{Typist, TypingError, KEYSTROKE_INTERVAL_MS};

#[derive(Debug, Default)]
pub struct XdotoolTypist;

impl XdotoolTypist {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Typist for XdotoolTypist {
    async fn type_text(&self, text: &str) -> Result<(), TypingError> {
        let status = Command::new("xdotool")
            .arg("type")
            .arg("--delay")
            .arg(KEYSTROKE_INTERVAL_MS.to_string())
            .arg("--")
            .arg(text)
            .status()
            .await?;

        if !status.success() {
            return Err(TypingError::Failed(status.to_string()));
        }

        debug!(chars = text.chars().count(), "typed text");
        Ok(())
    }
}
