//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `storage` - Snapshot stores (files on disk, in-memory)
//! - `sync` - Sync bus implementations
//! - `catalog` - Instance catalog data
//! - `tabular` - CSV template, import, and export

pub mod catalog;
pub mod storage;
pub mod sync;
pub mod tabular;

pub use catalog::StaticCatalog;
pub use storage::{FileSnapshotStore, InMemorySnapshotStore};
pub use sync::InMemorySyncBus;
pub use tabular::TabularError;
