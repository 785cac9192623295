//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `COST_ADVISOR` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use cloud_cost_advisor::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Snapshots live in {}", config.storage.data_dir.display());
//! ```

mod error;
mod logging;
mod notices;
mod pricing;
mod storage;

pub use error::{ConfigError, ValidationError};
pub use logging::{LogFormat, LoggingConfig};
pub use notices::{DefaultsConfig, NoticeConfig};
pub use pricing::validate_pricing;
pub use storage::{StorageBackend, StorageConfig};

use serde::Deserialize;

use crate::application::StoreSettings;
use crate::domain::projection::CostConstants;

/// Root application configuration
///
/// Every section has defaults, so an empty environment loads cleanly.
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Snapshot storage (file or memory)
    #[serde(default)]
    pub storage: StorageConfig,

    /// Log filter and format
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Cost constants and scenario factors
    #[serde(default)]
    pub pricing: CostConstants,

    /// Status notice lifetime
    #[serde(default)]
    pub notices: NoticeConfig,

    /// Startup state
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `COST_ADVISOR` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `COST_ADVISOR__STORAGE__BACKEND=memory` -> `storage.backend = memory`
    /// - `COST_ADVISOR__PRICING__BASE_HOURLY_RATE=0.07` -> `pricing.base_hourly_rate = 0.07`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("COST_ADVISOR")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.storage.validate()?;
        self.logging.validate()?;
        validate_pricing(&self.pricing)?;
        self.notices.validate()?;
        Ok(())
    }

    /// Settings the portfolio store is opened with
    pub fn store_settings(&self) -> StoreSettings {
        StoreSettings {
            default_provider: self.defaults.provider,
            constants: self.pricing.clone(),
            notice_ttl_secs: self.notices.ttl_secs,
        }
    }
}
