//! Error types for the Questline core library.
//!
//! Errors only surface at load and configuration boundaries. Dispatch,
//! condition evaluation and action interpretation never fail: malformed
//! authored content degrades to "nothing happened".

use thiserror::Error;

/// Top-level error type for all Questline load-time operations.
#[derive(Error, Debug)]
pub enum QuestlineError {
    /// Configuration could not be parsed or failed validation.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Authored event definitions were rejected by the parser.
    #[error("Definition error: {0}")]
    Definition(String),

    /// Two events in one catalog share the same non-blank id.
    #[error("Duplicate event id in catalog: {0}")]
    DuplicateEventId(String),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for QuestlineError {
    fn from(err: serde_json::Error) -> Self {
        Self::Definition(err.to_string())
    }
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, QuestlineError>;
