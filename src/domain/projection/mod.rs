//! Projection module - scenario costs and grand totals.
//!
//! # Components
//!
//! - `CostProjector` - Pure per-row projection into four scenarios
//! - `aggregate` - Order-independent reduction into a `GrandTotal`
//! - `CostConstants` - Rates and scenario factors
//!
//! All functions are pure. They take rows or projections and return
//! computed results; no ports are involved.

mod aggregation;
mod calculator;
mod constants;

pub use aggregation::{aggregate, paginate, GrandTotal, ScenarioTotal};
pub use calculator::{project, CostProjection, CostProjector, Scenario, ScenarioCost};
pub use constants::{
    CostConstants, BASE_HOURLY_RATE, DOWNSIZED_FACTOR, MODERNIZED_FACTOR, OPTIMIZED_FACTOR,
};
