//! ColorBuddy Error Types
//!
//! Centralized error handling for the tutor.

use thiserror::Error;

/// Central error type for ColorBuddy
#[derive(Error, Debug)]
pub enum BuddyError {
    #[error("Speech engine error: {0}")]
    Speech(String),

    #[error("Voice capture error: {0}")]
    Voice(String),

    #[error("Profile store error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Profile error: {0}")]
    Profile(String),

    #[error("Lock poisoned: {0}")]
    Lock(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for ColorBuddy operations
pub type BuddyResult<T> = Result<T, BuddyError>;

/// Helper to convert Mutex poison errors
impl<T> From<std::sync::PoisonError<T>> for BuddyError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        BuddyError::Lock(err.to_string())
    }
}
