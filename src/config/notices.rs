//! Status notice and startup defaults configuration

use serde::Deserialize;

use crate::domain::instance::CloudProvider;
use crate::domain::sync::DEFAULT_NOTICE_TTL_SECS;

use super::error::ValidationError;

/// How long status notices stay visible
#[derive(Debug, Clone, Deserialize)]
pub struct NoticeConfig {
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

impl NoticeConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.ttl_secs == 0 || self.ttl_secs > 3600 {
            return Err(ValidationError::InvalidNoticeTtl);
        }
        Ok(())
    }
}

impl Default for NoticeConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
        }
    }
}

fn default_ttl_secs() -> u64 {
    DEFAULT_NOTICE_TTL_SECS
}

/// Startup defaults for the application state
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default)]
    pub provider: CloudProvider,
}
