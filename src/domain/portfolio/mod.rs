//! Portfolio module - named row sets and their lifecycle.

mod aggregate;
mod errors;
mod name;
mod status;

pub use aggregate::{Portfolio, PortfolioSummary};
pub use errors::PortfolioError;
pub use name::{PortfolioName, MAX_NAME_LENGTH};
pub use status::PortfolioStatus;
