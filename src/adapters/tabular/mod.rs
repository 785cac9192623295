//! Comma-separated import and export.
//!
//! - Catalog template: fixed header, fixed field order
//! - Row import: `region,size,quantity,hours,pricing_model`, fed through the
//!   row validator by the caller
//! - Projection export: one record per row and scenario

mod export;
mod import;

pub use export::{write_projections, write_template, PROJECTION_HEADER};
pub use import::{read_rows, IMPORT_HEADER};

use crate::domain::foundation::ErrorCode;

/// Errors raised while reading or writing tabular data.
#[derive(Debug, thiserror::Error)]
pub enum TabularError {
    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Missing column '{0}'")]
    MissingColumn(String),
}

impl TabularError {
    pub fn code(&self) -> ErrorCode {
        match self {
            TabularError::Csv(_) | TabularError::MissingColumn(_) => ErrorCode::ValidationFailed,
            TabularError::Io(_) => ErrorCode::StorageError,
        }
    }
}
