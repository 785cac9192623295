//! Transient status notices for the notification bar.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ErrorCode, Timestamp};

/// Seconds a notice stays visible unless configured otherwise.
pub const DEFAULT_NOTICE_TTL_SECS: u64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A dismissible status message that expires on its own.
///
/// Expiry only affects display; nothing in the data model depends on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub posted_at: Timestamp,
    pub ttl_secs: u64,
}

impl Notice {
    pub fn success(text: impl Into<String>, ttl_secs: u64) -> Self {
        Self {
            level: NoticeLevel::Success,
            text: text.into(),
            code: None,
            posted_at: Timestamp::now(),
            ttl_secs,
        }
    }

    pub fn error(code: ErrorCode, text: impl Into<String>, ttl_secs: u64) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
            code: Some(code.to_string()),
            posted_at: Timestamp::now(),
            ttl_secs,
        }
    }

    pub fn expires_at(&self) -> Timestamp {
        self.posted_at.plus_secs(self.ttl_secs)
    }

    pub fn is_expired(&self, now: &Timestamp) -> bool {
        now.is_at_or_after(&self.expires_at())
    }
}
