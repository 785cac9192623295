//! Pricing constants validation
//!
//! The constants themselves live in the domain (`CostConstants`); this
//! module only checks values read from the environment.

use crate::domain::projection::CostConstants;

use super::error::ValidationError;

pub fn validate_pricing(constants: &CostConstants) -> Result<(), ValidationError> {
    if !(constants.base_hourly_rate.is_finite() && constants.base_hourly_rate > 0.0) {
        return Err(ValidationError::NonPositiveRate("base_hourly_rate"));
    }
    if constants.hours_per_month == 0 {
        return Err(ValidationError::NonPositiveRate("hours_per_month"));
    }
    if constants.default_vcpu == 0 {
        return Err(ValidationError::NonPositiveRate("default_vcpu"));
    }

    let factors = [
        ("optimized_factor", constants.optimized_factor),
        ("modernized_factor", constants.modernized_factor),
        ("downsized_factor", constants.downsized_factor),
    ];
    for (name, factor) in factors {
        if !(factor > 0.0 && factor <= 1.0) {
            return Err(ValidationError::FactorOutOfRange(name));
        }
    }
    Ok(())
}
