//! Backend error types

use thiserror::Error;

/// Backend error with classification
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct BackendError {
    pub kind: BackendErrorKind,
    pub message: String,
}

impl BackendError {
    pub fn new(kind: BackendErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Transport, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Unavailable, message)
    }

    pub fn quota(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Quota, message)
    }

    pub fn policy_block(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::PolicyBlock, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::InvalidRequest, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Unknown, message)
    }

    /// The sentence spoken to the user in place of a response
    pub fn user_message(&self) -> String {
        match self.kind {
            BackendErrorKind::Transport => {
                "Error: I cannot connect to the language service. Please check your internet connection.".to_string()
            }
            BackendErrorKind::Unavailable => {
                "Error: The language service is currently unavailable. Please try again later.".to_string()
            }
            BackendErrorKind::Quota => {
                "Error: You've sent too many requests. Please wait a moment.".to_string()
            }
            BackendErrorKind::PolicyBlock => {
                "Error: Your request was blocked due to content policy. Please try rephrasing.".to_string()
            }
            BackendErrorKind::InvalidRequest => {
                "Error: The request sent to the language service was invalid. This might be a prompt issue.".to_string()
            }
            BackendErrorKind::Unknown => {
                format!("Error communicating with the language service: {}", self.message)
            }
        }
    }
}

/// Failure categories surfaced by a backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendErrorKind {
    /// Connection failures and timeouts
    Transport,
    /// Server-side errors (5xx)
    Unavailable,
    /// Rate limit or quota exhausted (429)
    Quota,
    /// Prompt or response blocked by content policy
    PolicyBlock,
    /// Rejected request: bad prompt, bad key, unknown model
    InvalidRequest,
    Unknown,
}

impl std::fmt::Display for BackendErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendErrorKind::Transport => write!(f, "transport"),
            BackendErrorKind::Unavailable => write!(f, "unavailable"),
            BackendErrorKind::Quota => write!(f, "quota"),
            BackendErrorKind::PolicyBlock => write!(f, "policy_block"),
            BackendErrorKind::InvalidRequest => write!(f, "invalid_request"),
            BackendErrorKind::Unknown => write!(f, "unknown"),
        }
    }
}
