//! Unified error type for custody.
//!
//! Wraps the internal crates' errors and presents a stable interface.

use thiserror::Error;

/// All custody errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Record is not at the command's precondition stage
    #[error("invalid transition: {command} requires stage {expected}, record is at stage {actual}")]
    InvalidTransition {
        /// Rejected command
        command: String,
        /// Required stage
        expected: u64,
        /// Actual stage
        actual: u64,
    },

    /// Invocation is structurally invalid or names a forbidden action
    #[error("malformed invocation: {0}")]
    MalformedInvocation(String),

    /// Concurrent modification detected at commit
    #[error("conflict: {0}")]
    Conflict(String),

    /// Invalid configuration
    #[error("config error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Storage error, including corrupt persisted data
    #[error("storage error: {0}")]
    Storage(String),

    /// Internal error (bug or invariant violation)
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type for custody operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether the invocation was rejected for being out of order
    pub fn is_invalid_transition(&self) -> bool {
        matches!(self, Error::InvalidTransition { .. })
    }

    /// Whether the invocation was rejected as malformed
    pub fn is_malformed(&self) -> bool {
        matches!(self, Error::MalformedInvocation(_))
    }

    /// Whether the error is a workflow rejection rather than an engine failure
    pub fn is_rejection(&self) -> bool {
        self.is_invalid_transition() || self.is_malformed()
    }

    /// Retryable errors (conflicts) may succeed on retry with fresh data.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Conflict(_))
    }
}

// Convert from internal core errors
impl From<custody_core::Error> for Error {
    fn from(e: custody_core::Error) -> Self {
        use custody_core::Error as CoreError;
        match e {
            CoreError::InvalidTransition {
                command,
                expected,
                actual,
            } => Error::InvalidTransition {
                command: command.to_string(),
                expected: expected.value(),
                actual: actual.value(),
            },
            CoreError::MalformedInvocation { reason } => Error::MalformedInvocation(reason),
            CoreError::Conflict(msg) => Error::Conflict(msg),
            CoreError::Corruption(msg) => Error::Storage(format!("corruption: {}", msg)),
            CoreError::Storage(msg) => Error::Storage(msg),
            CoreError::Serialization(msg) => Error::Serialization(msg),
            CoreError::Config(msg) => Error::Config(msg),
            CoreError::Io(io_err) => Error::Io(io_err),
        }
    }
}

// Convert from serde_json errors
impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use custody_core::{Command, Stage};

    #[test]
    fn test_core_rejections_keep_their_kind() {
        let err: Error = custody_core::Error::InvalidTransition {
            command: Command::ItemDelivered,
            expected: Stage::new(2),
            actual: Stage::new(1),
        }
        .into();
        assert!(err.is_invalid_transition());
        assert!(err.is_rejection());
        assert!(err.to_string().contains("ItemDelivered requires stage 2"));

        let err: Error = custody_core::Error::malformed("bundled").into();
        assert!(err.is_malformed());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_engine_failures_are_not_rejections() {
        let err: Error = custody_core::Error::Corruption("stage 0".into()).into();
        assert!(matches!(err, Error::Storage(_)));
        assert!(!err.is_rejection());

        let err: Error = custody_core::Error::Conflict("stage".into()).into();
        assert!(err.is_retryable());
    }
}
