//! Cloud provider and pricing model enums.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Cloud provider a portfolio is priced against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CloudProvider {
    #[default]
    Aws,
    Azure,
    Gcp,
}

impl CloudProvider {
    /// All supported providers, in display order.
    pub const ALL: [CloudProvider; 3] = [CloudProvider::Aws, CloudProvider::Azure, CloudProvider::Gcp];

    pub fn as_str(&self) -> &'static str {
        match self {
            CloudProvider::Aws => "aws",
            CloudProvider::Azure => "azure",
            CloudProvider::Gcp => "gcp",
        }
    }

    /// Returns the display label for this provider.
    pub fn label(&self) -> &'static str {
        match self {
            CloudProvider::Aws => "AWS",
            CloudProvider::Azure => "Azure",
            CloudProvider::Gcp => "GCP",
        }
    }
}

impl fmt::Display for CloudProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CloudProvider {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "aws" => Ok(CloudProvider::Aws),
            "azure" => Ok(CloudProvider::Azure),
            "gcp" | "google" => Ok(CloudProvider::Gcp),
            _ => Err(ValidationError::invalid_value(
                "provider",
                s,
                "expected one of aws, azure, gcp",
            )),
        }
    }
}

/// How an instance is billed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PricingModel {
    #[default]
    #[serde(rename = "on-demand")]
    OnDemand,
    #[serde(rename = "reserved")]
    Reserved,
    #[serde(rename = "spot")]
    Spot,
}

impl PricingModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            PricingModel::OnDemand => "on-demand",
            PricingModel::Reserved => "reserved",
            PricingModel::Spot => "spot",
        }
    }

    /// Parses a pricing model, falling back to on-demand for empty or
    /// unsupported input.
    pub fn parse_or_default(raw: Option<&str>) -> Self {
        raw.and_then(|s| s.parse().ok()).unwrap_or_default()
    }
}

impl fmt::Display for PricingModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PricingModel {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_ascii_lowercase()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect();
        match normalized.as_str() {
            "ondemand" => Ok(PricingModel::OnDemand),
            "reserved" => Ok(PricingModel::Reserved),
            "spot" => Ok(PricingModel::Spot),
            _ => Err(ValidationError::invalid_value(
                "pricing_model",
                s,
                "expected one of on-demand, reserved, spot",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_parses_case_insensitively() {
        assert_eq!("AWS".parse::<CloudProvider>().unwrap(), CloudProvider::Aws);
        assert_eq!(" Azure ".parse::<CloudProvider>().unwrap(), CloudProvider::Azure);
        assert_eq!("gcp".parse::<CloudProvider>().unwrap(), CloudProvider::Gcp);
        assert!("oracle".parse::<CloudProvider>().is_err());
    }

    #[test]
    fn pricing_model_accepts_spelling_variants() {
        for raw in ["on-demand", "ondemand", "On Demand", "ON_DEMAND"] {
            assert_eq!(raw.parse::<PricingModel>().unwrap(), PricingModel::OnDemand);
        }
        assert_eq!("Spot".parse::<PricingModel>().unwrap(), PricingModel::Spot);
        assert_eq!("reserved".parse::<PricingModel>().unwrap(), PricingModel::Reserved);
    }

    #[test]
    fn unsupported_pricing_model_defaults_to_on_demand() {
        assert_eq!(PricingModel::parse_or_default(Some("lease")), PricingModel::OnDemand);
        assert_eq!(PricingModel::parse_or_default(Some("")), PricingModel::OnDemand);
        assert_eq!(PricingModel::parse_or_default(None), PricingModel::OnDemand);
        assert_eq!(PricingModel::parse_or_default(Some("spot")), PricingModel::Spot);
    }

    #[test]
    fn pricing_model_serializes_canonically() {
        let json = serde_json::to_string(&PricingModel::OnDemand).unwrap();
        assert_eq!(json, "\"on-demand\"");
    }
}
