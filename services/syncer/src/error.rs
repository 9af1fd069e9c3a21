//! Store-call error taxonomy.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by the desired-state source and the two actual-state
/// stores.
///
/// The sweep engines convert these at apply time: `NotFound` on an expected
/// update target becomes a create, `Conflict` on a create becomes an update,
/// and `Transient` is logged and retried on the next scheduled sweep.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The target record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A record with this identity already exists.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Network failure, timeout, or a retryable server-side error.
    #[error("transient store failure: {0}")]
    Transient(String),

    /// A response the reconciler has no conversion for.
    #[error("unexpected store response: {0}")]
    Unexpected(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict(_))
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Transient(_))
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() || e.is_connect() || e.is_request() {
            StoreError::Transient(e.to_string())
        } else if e.is_decode() {
            StoreError::Unexpected(e.to_string())
        } else {
            StoreError::Transient(e.to_string())
        }
    }
}
