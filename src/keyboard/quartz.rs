//! Keystroke injection via Quartz keyboard events

use std::time::Duration;

use async_trait::async_trait;
use core_graphics::event::{CGEvent, CGEventTapLocation};
use core_graphics::event_source::{CGEventSource, CGEventSourceStateID};
use tracing::debug;

use super::{Typist, TypingError, KEYSTROKE_INTERVAL_MS};

#[derive(Debug, Default)]
pub struct QuartzTypist;

impl QuartzTypist {
    pub fn new() -> Self {
        Self
    }
}

/// Post a key down/up pair carrying `ch` as its unicode string
fn post_char(ch: char) -> Result<(), TypingError> {
    let mut buf = [0u8; 4];
    let s = ch.encode_utf8(&mut buf);

    for key_down in [true, false] {
        let source = CGEventSource::new(CGEventSourceStateID::HIDSystemState)
            .map_err(|_| TypingError::EventCreation)?;
        let event = CGEvent::new_keyboard_event(source, 0, key_down)
            .map_err(|_| TypingError::EventCreation)?;
        event.set_string(s);
        event.post(CGEventTapLocation::HID);
    }
    Ok(())
}

#[async_trait]
impl Typist for QuartzTypist {
    async fn type_text(&self, text: &str) -> Result<(), TypingError> {
        // CGEvent is not Send; never hold one across an await
        for ch in text.chars() {
            post_char(ch)?;
            tokio::time::sleep(Duration::from_millis(KEYSTROKE_INTERVAL_MS)).await;
        }

        debug!(chars = text.chars().count(), "typed text");
        Ok(())
    }
}
