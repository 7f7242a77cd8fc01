//! Error types for guarded remote operations.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure raised by a wrapped remote operation.
///
/// Operations report a human-readable message and, when the remote service
/// answered at all, the status code it answered with. The classifier in
/// `classify.rs` decides from these two fields whether the failure is worth
/// retrying.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct RemoteError {
    /// Human-readable failure description.
    pub message: String,
    /// Status code returned by the remote service, if any.
    pub status: Option<String>,
}

impl RemoteError {
    /// Failure without a status code (transport-level errors).
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
        }
    }

    /// Failure carrying a remote status code.
    pub fn with_status(status: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: Some(status.into()),
        }
    }

    /// The most specific identifier available: status code if present,
    /// otherwise the message. Used as the error-count key.
    pub fn count_key(&self) -> &str {
        self.status.as_deref().unwrap_or(&self.message)
    }
}

/// Classifier verdict for a single failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Expected to resolve if retried after a delay.
    Transient,
    /// Will not resolve by retrying.
    Permanent,
}

/// Failure surface of the retry loop.
#[derive(Debug, Error)]
pub enum GuardError {
    /// The operation failed with a non-retryable error; no further attempts
    /// were made.
    #[error("operation '{operation}' failed after {attempts} attempt(s): {source}")]
    Permanent {
        operation: String,
        attempts: u32,
        source: RemoteError,
    },

    /// Retries were exhausted on a transient error.
    #[error("operation '{operation}' exhausted {attempts} attempt(s), last error: {source}")]
    Exhausted {
        operation: String,
        attempts: u32,
        source: RemoteError,
    },
}

impl GuardError {
    /// The last underlying remote error.
    pub fn remote(&self) -> &RemoteError {
        match self {
            GuardError::Permanent { source, .. } | GuardError::Exhausted { source, .. } => source,
        }
    }

    /// Total attempts made before giving up.
    pub fn attempts(&self) -> u32 {
        match self {
            GuardError::Permanent { attempts, .. } | GuardError::Exhausted { attempts, .. } => {
                *attempts
            }
        }
    }
}

/// Result type for guarded operations.
pub type GuardResult<T> = Result<T, GuardError>;

/// Failure surface of a call routed through a circuit breaker.
///
/// Generic over the wrapped failure type so a breaker can guard a bare
/// operation (`E = RemoteError`) or a whole retry loop (`E = GuardError`).
/// `Open` never reaches the wrapped operation and is always distinguishable
/// from the operation's own errors.
#[derive(Debug, Error)]
pub enum BreakerError<E> {
    /// Rejected without invoking the operation.
    #[error("circuit '{key}' is open, failing fast")]
    Open { key: String },

    /// The wrapped operation ran and failed.
    #[error("{0}")]
    Operation(E),
}

impl<E> BreakerError<E> {
    /// True for rejections that never invoked the operation.
    pub fn is_open(&self) -> bool {
        matches!(self, BreakerError::Open { .. })
    }
}
