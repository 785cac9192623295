//! Cloud Cost Advisor - portfolio data model and cost projection engine
//!
//! Collaborators build named portfolios of cloud VM rows, project what each
//! row costs under four scenarios, and keep several views in step through
//! a typed sync bus.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
