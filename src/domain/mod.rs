//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (money, ids, timestamps, errors)
//! - `instance` - Instance row model and validation
//! - `projection` - Scenario cost projection and aggregation
//! - `mutation` - Bulk find-and-replace over rows
//! - `portfolio` - Named row sets and their lifecycle
//! - `sync` - Signals and notices shared between views
//! - `catalog` - Read-only instance reference records

pub mod catalog;
pub mod foundation;
pub mod instance;
pub mod mutation;
pub mod portfolio;
pub mod projection;
pub mod sync;
