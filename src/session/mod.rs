//! Session module for cross-turn conversation state
//!
//! Provides the persisted session record and a file-backed store:
//! - Session: accumulated inputs, pending question, location facts
//! - SessionStore: load/save/reset with corruption recovery

mod record;
mod store;

pub use record::{ClarificationKind, Session};
pub use store::{SessionError, SessionStore};
