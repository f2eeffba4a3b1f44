//! # Predicate Errors

use thiserror::Error;

/// Result type for predicate operations
pub type PredicateResult<T> = Result<T, PredicateError>;

/// Predicate errors
#[derive(Debug, Clone, Error)]
pub enum PredicateError {
    #[error("No predicate registered for IRI {0}.")]
    NotFound(String),

    #[error("Invalid registration: {0}")]
    InvalidRegistration(String),

    #[error("Callback failed: {0}")]
    CallbackFailed(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PredicateError {
    /// Shorthand for callbacks signalling a per-row failure
    pub fn callback(detail: impl Into<String>) -> Self {
        PredicateError::CallbackFailed(detail.into())
    }

    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            PredicateError::NotFound(_) => 404,
            PredicateError::InvalidRegistration(_) => 400,
            PredicateError::CallbackFailed(_) => 500,
            PredicateError::Internal(_) => 500,
        }
    }
}
