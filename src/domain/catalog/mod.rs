//! Catalog module - read-only instance reference data.

mod entry;

pub use entry::{CatalogEntry, TEMPLATE_HEADER};
