//! Error types for GUID parsing and validation.

use thiserror::Error;

/// Errors that can occur when parsing or validating GUIDs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GuidError {
    /// The GUID string is empty.
    #[error("GUID cannot be empty")]
    Empty,

    /// The GUID has an invalid prefix.
    #[error("invalid GUID prefix: expected '{expected}', got '{actual}'")]
    InvalidPrefix {
        expected: &'static str,
        actual: String,
    },

    /// The GUID is missing the underscore separator.
    #[error("GUID missing underscore separator")]
    MissingSeparator,

    /// The ULID portion of the GUID is invalid.
    #[error("invalid ULID: {0}")]
    InvalidUlid(String),

    /// A composite process GUID is missing its version half.
    #[error("process GUID missing version token")]
    MissingVersionToken,
}

impl GuidError {
    /// Returns true if this error indicates a prefix mismatch.
    pub fn is_prefix_error(&self) -> bool {
        matches!(self, GuidError::InvalidPrefix { .. })
    }
}
