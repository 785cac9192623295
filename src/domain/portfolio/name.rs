//! Portfolio name value object.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::ValidationError;

/// Maximum length for a portfolio name.
pub const MAX_NAME_LENGTH: usize = 120;

/// A trimmed, non-empty portfolio name.
///
/// Names are stored as entered but compared case-insensitively for
/// uniqueness; `key()` gives the comparison form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PortfolioName(String);

impl PortfolioName {
    /// Creates a name, returning an error if it is blank or too long.
    pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::empty_field("name"));
        }
        if trimmed.chars().count() > MAX_NAME_LENGTH {
            return Err(ValidationError::invalid_value(
                "name",
                trimmed,
                format!("must be at most {} characters", MAX_NAME_LENGTH),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-folded form used for uniqueness checks.
    pub fn key(&self) -> String {
        self.0.to_lowercase()
    }

    /// True if both names collide under case-insensitive comparison.
    pub fn collides_with(&self, other: &PortfolioName) -> bool {
        self.key() == other.key()
    }
}

impl fmt::Display for PortfolioName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PortfolioName {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        PortfolioName::new(value)
    }
}

impl From<PortfolioName> for String {
    fn from(name: PortfolioName) -> Self {
        name.0
    }
}
