//! Instance module - portfolio row model and validation.
//!
//! - `provider` - Cloud providers and pricing models
//! - `row` - Raw and normalized instance rows
//! - `validator` - Default/clamp rules and add-time checks
//! - `sizing` - vCPU token extraction from size names
//! - `draft` - In-progress form selection

mod draft;
mod provider;
mod row;
mod sizing;
mod validator;

pub use draft::DraftSelection;
pub use provider::{CloudProvider, PricingModel};
pub use row::{InstanceRow, RawInstanceRow};
pub use sizing::{extract_vcpu, replace_vcpu_token, DEFAULT_VCPU};
pub use validator::{RowValidator, HOURS_PER_MONTH, MAX_QUANTITY};
