//! Instance row records.
//!
//! `RawInstanceRow` is what the form, the import file, or a bulk edit hands
//! over: every field optional and still a string. `InstanceRow` is the
//! normalized record that portfolios hold and snapshots persist.

use serde::{Deserialize, Serialize};

use super::provider::PricingModel;
use crate::domain::foundation::RowId;

/// Unvalidated row fields as entered by a collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawInstanceRow {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub quantity: Option<String>,
    #[serde(default)]
    pub hours: Option<String>,
    #[serde(default, alias = "pricing_model")]
    pub pricing_model: Option<String>,
}

impl RawInstanceRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    pub fn with_quantity(mut self, quantity: impl Into<String>) -> Self {
        self.quantity = Some(quantity.into());
        self
    }

    pub fn with_hours(mut self, hours: impl Into<String>) -> Self {
        self.hours = Some(hours.into());
        self
    }

    pub fn with_pricing_model(mut self, pricing_model: impl Into<String>) -> Self {
        self.pricing_model = Some(pricing_model.into());
        self
    }

    /// Overlays the fields set in `edit` on top of this row.
    pub fn merged_with(&self, edit: &RawInstanceRow) -> RawInstanceRow {
        RawInstanceRow {
            id: edit.id.clone().or_else(|| self.id.clone()),
            region: edit.region.clone().or_else(|| self.region.clone()),
            size: edit.size.clone().or_else(|| self.size.clone()),
            quantity: edit.quantity.clone().or_else(|| self.quantity.clone()),
            hours: edit.hours.clone().or_else(|| self.hours.clone()),
            pricing_model: edit.pricing_model.clone().or_else(|| self.pricing_model.clone()),
        }
    }
}

/// A normalized portfolio entry.
///
/// # Invariants
///
/// - `quantity >= 1`
/// - `hours <= quantity * hours_per_month`
/// - `region` was valid for the active provider when the row was written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceRow {
    pub id: RowId,
    pub region: String,
    pub size: String,
    pub quantity: u32,
    pub hours: u32,
    pub pricing_model: PricingModel,
}

impl InstanceRow {
    /// Returns the row as raw fields, the starting point for edits.
    pub fn to_raw(&self) -> RawInstanceRow {
        RawInstanceRow {
            id: Some(self.id.to_string()),
            region: Some(self.region.clone()),
            size: Some(self.size.clone()),
            quantity: Some(self.quantity.to_string()),
            hours: Some(self.hours.to_string()),
            pricing_model: Some(self.pricing_model.as_str().to_string()),
        }
    }
}
