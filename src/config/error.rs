//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Pricing value '{0}' must be positive")]
    NonPositiveRate(&'static str),

    #[error("Scenario factor '{0}' must be in (0, 1]")]
    FactorOutOfRange(&'static str),

    #[error("Notice TTL must be between 1 and 3600 seconds")]
    InvalidNoticeTtl,

    #[error("Invalid log filter: {0}")]
    InvalidLogFilter(String),
}
