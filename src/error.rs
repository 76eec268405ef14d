//! Error types shared across the daemon

use std::path::PathBuf;

use thiserror::Error;

/// Every failure the timer subsystem can report.
///
/// None of these is fatal: configuration errors reject a single edit,
/// persistence errors cost durability but never the running session.
#[derive(Debug, Error)]
pub enum PomodoroError {
    /// A duration, repetition count or theme value was rejected
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The persisted blob could not be read or parsed
    #[error("failed to read persisted state from {}: {reason}", .path.display())]
    PersistenceRead { path: PathBuf, reason: String },

    /// The persisted blob could not be written
    #[error("failed to write persisted state to {}: {reason}", .path.display())]
    PersistenceWrite { path: PathBuf, reason: String },

    /// A lock around shared state was poisoned by a panicking holder
    #[error("failed to lock {0}")]
    StateLock(String),
}

impl PomodoroError {
    /// Shorthand for a rejected configuration edit
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration(message.into())
    }
}

pub type Result<T> = std::result::Result<T, PomodoroError>;
