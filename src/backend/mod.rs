//! Language backend collaborator
//!
//! The state machine hands a fully built prompt to a `LanguageBackend` and
//! gets back either the raw response text or a classified error.

mod error;
mod gemini;

pub use error::BackendError;
#[cfg(test)]
pub use error::BackendErrorKind;
pub use gemini::GeminiBackend;

use async_trait::async_trait;

/// A natural-language completion service
#[async_trait]
pub trait LanguageBackend: Send + Sync {
    /// Complete `prompt`, returning the raw response text
    async fn complete(&self, prompt: &str) -> Result<String, BackendError>;
}
