//! File-backed session persistence
//!
//! The record is written as pretty JSON to a temporary sibling file and
//! renamed over the target, so a reader never observes a partial write.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::record::Session;

/// Errors that can occur while reading or writing the session file
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("failed to read session file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write session file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to encode session: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Durable store for the single conversation session
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Create a store backed by the file at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored session.
    ///
    /// A missing file is created with defaults. An unparseable file is
    /// discarded and replaced with defaults; only I/O failures are errors.
    pub fn load(&self) -> Result<Session, SessionError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = ?self.path, "no stored session, creating defaults");
                let session = Session::default();
                self.save(&session)?;
                return Ok(session);
            }
            Err(source) => {
                return Err(SessionError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        match serde_json::from_str::<Session>(&contents) {
            Ok(mut session) => {
                if session.repair() {
                    warn!(path = ?self.path, "stored session had inconsistent clarification state, cleared it");
                    self.save(&session)?;
                }
                debug!(
                    awaiting_clarification = session.awaiting_clarification,
                    "session loaded"
                );
                Ok(session)
            }
            Err(e) => {
                warn!(path = ?self.path, error = %e, "corrupted session file, resetting");
                self.reset_to_default()
            }
        }
    }

    /// Persist `session`, replacing the stored record.
    pub fn save(&self, session: &Session) -> Result<(), SessionError> {
        let json = serde_json::to_string_pretty(session)?;
        let tmp_path = self.path.with_extension("json.tmp");

        let write = |source: std::io::Error| SessionError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(write)?;
            }
        }
        std::fs::write(&tmp_path, json).map_err(write)?;
        std::fs::rename(&tmp_path, &self.path).map_err(write)?;

        debug!(path = ?self.path, "session saved");
        Ok(())
    }

    /// Clear every field, location facts included, and persist the result.
    pub fn reset_to_default(&self) -> Result<Session, SessionError> {
        let session = Session::default();
        self.save(&session)?;
        info!("session cleared and file reset");
        Ok(session)
    }
}
