//! Domain-level error types.

use thiserror::Error;

/// Domain errors - a request or record violates an ad invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("ad name is required")]
    MissingName,

    #[error("ad price is required")]
    MissingPrice,

    #[error("ad price must be a finite non-negative number")]
    InvalidPrice,

    #[error("invalid sort order {0:?}, expected \"asc\" or \"desc\"")]
    InvalidSortOrder(String),
}

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    /// The identifier is not a valid hex-encoded document id. No query was issued.
    #[error("invalid ad identifier {0:?}")]
    InvalidIdentifier(String),

    /// The identifier is well formed but no document matches it.
    #[error("ad {0} not found")]
    NotFound(String),

    /// The request was rejected before reaching storage.
    #[error(transparent)]
    Invalid(#[from] DomainError),

    #[error("storage operation failed: {0}")]
    Storage(String),

    /// The storage engine returned an identifier of an unexpected shape.
    #[error("unexpected identifier from storage: {0}")]
    Encoding(String),
}

impl RepoError {
    /// Whether the error was caused by the caller's input rather than storage.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            RepoError::InvalidIdentifier(_) | RepoError::NotFound(_) | RepoError::Invalid(_)
        )
    }
}
