//! Error types for the core domain.

use thiserror::Error;

/// Result type alias using `CoreError`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised while constructing core domain values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A user key was empty or blank.
    #[error("invalid user key: {0:?}")]
    InvalidKey(String),

    /// A role label outside the known catalog.
    #[error("unknown role: {0}")]
    UnknownRole(String),
}

impl CoreError {
    /// Returns the error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidKey(_) => "INVALID_KEY",
            Self::UnknownRole(_) => "UNKNOWN_ROLE",
        }
    }
}
