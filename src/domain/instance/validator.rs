//! Row normalization and add-time validation.

use std::num::IntErrorKind;

use super::provider::{CloudProvider, PricingModel};
use super::row::{InstanceRow, RawInstanceRow};
use crate::domain::foundation::{RowId, ValidationError};

/// Monthly runtime hours of a single always-on instance.
pub const HOURS_PER_MONTH: u32 = 730;

/// Largest instance count a single row may carry.
pub const MAX_QUANTITY: u32 = 100_000;

/// Normalizes raw rows for one provider's region set.
///
/// Rules are applied in a fixed order: quantity, hours bound, pricing
/// model, region. Size must be present; it is otherwise free-form since
/// the instance catalog is not authoritative for custom shapes.
#[derive(Debug, Clone)]
pub struct RowValidator {
    provider: CloudProvider,
    regions: Vec<String>,
    hours_per_month: u32,
}

impl RowValidator {
    pub fn new(provider: CloudProvider, regions: Vec<String>) -> Self {
        Self {
            provider,
            regions,
            hours_per_month: HOURS_PER_MONTH,
        }
    }

    pub fn with_hours_per_month(mut self, hours_per_month: u32) -> Self {
        self.hours_per_month = hours_per_month;
        self
    }

    pub fn provider(&self) -> CloudProvider {
        self.provider
    }

    /// Returns true if `region` belongs to this provider's region set.
    pub fn is_valid_region(&self, region: &str) -> bool {
        self.regions.iter().any(|r| r == region)
    }

    /// Validates a brand-new row: all five fields must be present, then
    /// the row is normalized.
    ///
    /// # Errors
    ///
    /// - `MissingField` for the first absent required field
    /// - `InvalidValue` if the region is not offered by the provider
    /// - `InvalidValue` if the quantity exceeds `MAX_QUANTITY`
    pub fn validate_new(&self, raw: &RawInstanceRow) -> Result<InstanceRow, ValidationError> {
        Self::require_complete(raw)?;
        self.normalize(raw)
    }

    /// Checks that region, size, quantity, hours, and pricing model are all set.
    pub fn require_complete(raw: &RawInstanceRow) -> Result<(), ValidationError> {
        let required = [
            ("region", &raw.region),
            ("size", &raw.size),
            ("quantity", &raw.quantity),
            ("hours", &raw.hours),
            ("pricing_model", &raw.pricing_model),
        ];
        for (field, value) in required {
            if blank(value).is_none() {
                return Err(ValidationError::missing_field(field));
            }
        }
        Ok(())
    }

    /// Applies defaults and clamps, then checks the region.
    pub fn normalize(&self, raw: &RawInstanceRow) -> Result<InstanceRow, ValidationError> {
        self.normalize_with(raw, true)
    }

    /// Applies an edit to a committed row.
    ///
    /// The region is only re-checked when the edit changes it, so rows
    /// committed under another provider stay editable.
    pub fn apply_edit(
        &self,
        existing: &InstanceRow,
        edit: &RawInstanceRow,
    ) -> Result<InstanceRow, ValidationError> {
        let mut merged = existing.to_raw().merged_with(edit);
        merged.id = Some(existing.id.to_string());
        let region_changed = blank(&edit.region).is_some_and(|r| r != existing.region);
        self.normalize_with(&merged, region_changed)
    }

    fn normalize_with(
        &self,
        raw: &RawInstanceRow,
        check_region: bool,
    ) -> Result<InstanceRow, ValidationError> {
        let quantity = parse_quantity(blank(&raw.quantity))?;
        let hours = parse_hours(blank(&raw.hours), quantity, self.hours_per_month);
        let pricing_model = PricingModel::parse_or_default(blank(&raw.pricing_model));

        let region = blank(&raw.region).ok_or_else(|| ValidationError::missing_field("region"))?;
        if check_region && !self.is_valid_region(region) {
            return Err(ValidationError::invalid_value(
                "region",
                region,
                format!("not offered by {}", self.provider),
            ));
        }

        let size = blank(&raw.size).ok_or_else(|| ValidationError::missing_field("size"))?;

        let id = blank(&raw.id)
            .and_then(|id| id.parse::<RowId>().ok())
            .unwrap_or_default();

        Ok(InstanceRow {
            id,
            region: region.to_string(),
            size: size.to_string(),
            quantity,
            hours,
            pricing_model,
        })
    }
}

fn blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Positive integer up to `MAX_QUANTITY`; non-numeric or non-positive
/// input becomes 1.
fn parse_quantity(raw: Option<&str>) -> Result<u32, ValidationError> {
    let Some(raw) = raw else {
        return Ok(1);
    };
    let too_many = || {
        ValidationError::invalid_value(
            "quantity",
            raw,
            format!("at most {} instances per row", MAX_QUANTITY),
        )
    };
    match raw.parse::<u64>() {
        Ok(q) if q > u64::from(MAX_QUANTITY) => Err(too_many()),
        Ok(q) if q >= 1 => Ok(q as u32),
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => Err(too_many()),
        _ => Ok(1),
    }
}

/// Rounded, non-negative, and at most `quantity * hours_per_month`.
/// Missing or unparseable input takes the upper bound.
fn parse_hours(raw: Option<&str>, quantity: u32, hours_per_month: u32) -> u32 {
    let bound = quantity.saturating_mul(hours_per_month);
    match raw.and_then(|s| s.parse::<f64>().ok()).filter(|h| h.is_finite()) {
        Some(hours) => {
            let rounded = hours.round().max(0.0);
            if rounded >= bound as f64 {
                bound
            } else {
                rounded as u32
            }
        }
        None => bound,
    }
}
