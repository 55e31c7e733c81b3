//! Error types for custody
//!
//! Workflow failures fall into exactly two kinds, both of which abort the
//! whole invocation with no state written:
//!
//! | Variant | Raised when |
//! |---------|-------------|
//! | `InvalidTransition` | the record is not at the command's precondition stage |
//! | `MalformedInvocation` | unknown command, batched operations, or a denied lifecycle action |
//!
//! The remaining variants report engine failures (storage, persistence,
//! configuration) and never result from workflow semantics.

use std::io;
use thiserror::Error;

use crate::command::Command;
use crate::stage::Stage;

/// Result type alias for custody operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for all custody operations
#[derive(Debug, Error)]
pub enum Error {
    /// Current stage does not match the command's precondition stage
    #[error("invalid transition: {command} requires stage {expected}, record is at stage {actual}")]
    InvalidTransition {
        /// Command that was rejected
        command: Command,
        /// Stage the command requires
        expected: Stage,
        /// Stage the record is actually in
        actual: Stage,
    },

    /// Invocation is structurally invalid or names a forbidden action
    #[error("malformed invocation: {reason}")]
    MalformedInvocation {
        /// What was wrong with the invocation
        reason: String,
    },

    /// Read set changed between read and commit
    #[error("conflict: {0}")]
    Conflict(String),

    /// Persisted data cannot be decoded into a valid record
    #[error("corruption: {0}")]
    Corruption(String),

    /// Storage layer failure
    #[error("storage error: {0}")]
    Storage(String),

    /// Encoding or decoding failure
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Invalid configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Build a `MalformedInvocation` error
    pub fn malformed(reason: impl Into<String>) -> Self {
        Error::MalformedInvocation {
            reason: reason.into(),
        }
    }

    /// Whether this is a precondition failure
    pub fn is_invalid_transition(&self) -> bool {
        matches!(self, Error::InvalidTransition { .. })
    }

    /// Whether the invocation itself was rejected as malformed
    pub fn is_malformed(&self) -> bool {
        matches!(self, Error::MalformedInvocation { .. })
    }

    /// Whether the invocation was rejected by workflow rules (as opposed to
    /// an engine failure)
    pub fn is_rejection(&self) -> bool {
        self.is_invalid_transition() || self.is_malformed()
    }

    /// Whether resubmitting the same invocation could succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Conflict(_))
    }
}
