//! Application layer - the portfolio store and the reports it serves.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Views send commands to `PortfolioStore` and learn about results through
//! the sync bus; they never write to storage themselves.

mod cost_report;
mod portfolio_store;
mod state;

pub use cost_report::CostReport;
pub use portfolio_store::{PortfolioStore, StoreSettings};
pub use state::AppState;
