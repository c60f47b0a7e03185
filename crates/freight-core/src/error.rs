//! # Error Types
//!
//! Top-level error hierarchy for the freight workflow stack. Library crates
//! define their own `thiserror` enums and convert into [`FreightError`] at
//! crate boundaries.
//!
//! - Lookup misses name the identifier kind and the rejected value.
//! - Transition errors carry the current status and the attempted target.

use thiserror::Error;

/// Top-level error type for the freight workflow stack.
#[derive(Error, Debug)]
pub enum FreightError {
    /// A status, document type, or phase outside the closed set.
    #[error("unknown {kind}: {value:?}")]
    UnknownIdentifier {
        /// What kind of identifier was looked up ("status", "document type", ...).
        kind: &'static str,
        /// The rejected value.
        value: String,
    },

    /// Workflow transition rejected.
    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    /// Persisted state changed between read and write.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Input failed validation (malformed identifier, timestamp, ...).
    #[error("validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl FreightError {
    /// Shorthand for an [`FreightError::UnknownIdentifier`].
    pub fn unknown(kind: &'static str, value: impl Into<String>) -> Self {
        Self::UnknownIdentifier {
            kind,
            value: value.into(),
        }
    }
}
