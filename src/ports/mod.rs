//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `SnapshotStore` - Persisted rows per portfolio name, plus the index
//! - `InstanceCatalog` - Read-only region/size reference data
//! - `SignalPublisher` / `SignalSubscriber` - The cross-view sync bus

mod instance_catalog;
mod signal_publisher;
mod signal_subscriber;
mod snapshot_store;

pub use instance_catalog::InstanceCatalog;
pub use signal_publisher::SignalPublisher;
pub use signal_subscriber::{SignalHandler, SignalSubscriber, SubscriptionId};
pub use snapshot_store::{SnapshotStore, SnapshotStoreError};
