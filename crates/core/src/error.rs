//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// This is a propagation type, not a recovery taxonomy: nothing in the Xerox
/// modules retries or translates these. Failures raised by external
/// collaborators (predicate builders, transmitters) travel through
/// [`DomainError::External`] untouched.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A record referenced by id does not exist in the store.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// The record store failed (connection, lock poisoning, ...).
    #[error("storage error: {0}")]
    Storage(String),

    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// Error raised by an external collaborator, propagated unmodified.
    #[error(transparent)]
    External(#[from] anyhow::Error),
}

impl DomainError {
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
