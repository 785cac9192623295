//! Portfolio-specific error types.

use thiserror::Error;

use super::status::PortfolioStatus;
use crate::domain::foundation::{DomainError, ErrorCode, RowId, ValidationError};
use crate::domain::mutation::ReplaceError;

/// Errors reported by portfolio commands.
///
/// Every variant is recoverable: the command that raised it has left the
/// store and the persisted snapshot as they were.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PortfolioError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("A portfolio named '{0}' already exists")]
    DuplicateName(String),

    #[error(transparent)]
    Replace(#[from] ReplaceError),

    #[error("No portfolio named '{0}'")]
    NotFound(String),

    #[error("Row {0} not found")]
    RowNotFound(RowId),

    #[error("Cannot move portfolio from {from:?} to {to:?}")]
    InvalidState {
        from: PortfolioStatus,
        to: PortfolioStatus,
    },

    #[error("Storage error: {0}")]
    Storage(String),
}

impl PortfolioError {
    pub fn duplicate_name(name: impl Into<String>) -> Self {
        PortfolioError::DuplicateName(name.into())
    }

    pub fn not_found(name: impl Into<String>) -> Self {
        PortfolioError::NotFound(name.into())
    }

    pub fn storage(message: impl Into<String>) -> Self {
        PortfolioError::Storage(message.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            PortfolioError::Validation(err) => err.code(),
            PortfolioError::DuplicateName(_) => ErrorCode::DuplicateName,
            PortfolioError::Replace(err) => err.code(),
            PortfolioError::NotFound(_) => ErrorCode::PortfolioNotFound,
            PortfolioError::RowNotFound(_) => ErrorCode::RowNotFound,
            PortfolioError::InvalidState { .. } => ErrorCode::InvalidStateTransition,
            PortfolioError::Storage(_) => ErrorCode::StorageError,
        }
    }
}

impl From<PortfolioError> for DomainError {
    fn from(err: PortfolioError) -> Self {
        DomainError::new(err.code(), err.to_string())
    }
}
