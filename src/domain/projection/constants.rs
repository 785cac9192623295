//! Fixed pricing constants used by the projection calculator.

use serde::Deserialize;

use crate::domain::instance::{DEFAULT_VCPU, HOURS_PER_MONTH};

/// Base hourly rate per vCPU.
pub const BASE_HOURLY_RATE: f64 = 0.05;

/// Share of the current cost kept by the hourly-optimized scenario (20% saving).
pub const OPTIMIZED_FACTOR: f64 = 0.80;

/// Share of the current cost kept by the modernized scenario (27% saving).
pub const MODERNIZED_FACTOR: f64 = 0.73;

/// Share of the current cost kept by the modernized+downsized scenario (60% saving).
pub const DOWNSIZED_FACTOR: f64 = 0.40;

/// Constants driving every scenario.
///
/// The factors carry no derivation; they are kept configurable rather
/// than inferred from a pricing model.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CostConstants {
    #[serde(default = "default_base_hourly_rate")]
    pub base_hourly_rate: f64,

    #[serde(default = "default_hours_per_month")]
    pub hours_per_month: u32,

    #[serde(default = "default_vcpu")]
    pub default_vcpu: u32,

    #[serde(default = "default_optimized_factor")]
    pub optimized_factor: f64,

    #[serde(default = "default_modernized_factor")]
    pub modernized_factor: f64,

    #[serde(default = "default_downsized_factor")]
    pub downsized_factor: f64,
}

impl Default for CostConstants {
    fn default() -> Self {
        Self {
            base_hourly_rate: BASE_HOURLY_RATE,
            hours_per_month: HOURS_PER_MONTH,
            default_vcpu: DEFAULT_VCPU,
            optimized_factor: OPTIMIZED_FACTOR,
            modernized_factor: MODERNIZED_FACTOR,
            downsized_factor: DOWNSIZED_FACTOR,
        }
    }
}

fn default_base_hourly_rate() -> f64 {
    BASE_HOURLY_RATE
}

fn default_hours_per_month() -> u32 {
    HOURS_PER_MONTH
}

fn default_vcpu() -> u32 {
    DEFAULT_VCPU
}

fn default_optimized_factor() -> f64 {
    OPTIMIZED_FACTOR
}

fn default_modernized_factor() -> f64 {
    MODERNIZED_FACTOR
}

fn default_downsized_factor() -> f64 {
    DOWNSIZED_FACTOR
}
