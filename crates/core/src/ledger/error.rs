//! Ledger error types.

use moneybook_shared::{AppError, types::EntryId};
use thiserror::Error;

/// Errors that can occur during money book operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Malformed or missing input, or a restore target that is not deleted.
    #[error("{0}")]
    Validation(String),

    /// Entry absent, soft-deleted, or owned by someone else.
    #[error("Entry not found: {0}")]
    NotFound(EntryId),

    /// Generic client error reported by `modify` whatever the underlying cause.
    #[error("Invalid request")]
    InvalidRequest(#[source] Box<LedgerError>),

    /// Entry store failure.
    #[error("Store error: {0}")]
    Store(String),
}

impl LedgerError {
    /// Create a store error.
    #[must_use]
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Wraps an error into the coarse `InvalidRequest` variant.
    ///
    /// Already wrapped errors are returned unchanged.
    #[must_use]
    pub fn invalid_request(self) -> Self {
        match self {
            Self::InvalidRequest(_) => self,
            other => Self::InvalidRequest(Box::new(other)),
        }
    }

    /// Returns the innermost error, looking through `InvalidRequest`.
    #[must_use]
    pub fn cause(&self) -> &Self {
        match self {
            Self::InvalidRequest(inner) => inner.cause(),
            other => other,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::InvalidRequest(_) => "BAD_REQUEST",
            Self::Store(_) => "DATABASE_ERROR",
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Validation(msg) => Self::Validation(msg),
            LedgerError::NotFound(id) => Self::NotFound(format!("entry {id}")),
            LedgerError::InvalidRequest(_) => {
                Self::BadRequest("request could not be applied".to_string())
            }
            LedgerError::Store(msg) => Self::Database(msg),
        }
    }
}
