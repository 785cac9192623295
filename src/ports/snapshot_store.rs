//! Snapshot Store Port - persisted row sets keyed by portfolio name.
//!
//! This is the only way portfolio data reaches persistent storage. The
//! backend is swappable: files on disk, or an in-memory map for tests.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::instance::InstanceRow;
use crate::domain::portfolio::PortfolioSummary;

/// Errors that can occur during snapshot storage operations
#[derive(Debug, thiserror::Error)]
pub enum SnapshotStoreError {
    #[error("Failed to serialize snapshot: {0}")]
    SerializationFailed(String),

    #[error("Failed to deserialize snapshot: {0}")]
    DeserializationFailed(String),

    #[error("IO error: {0}")]
    IoError(String),
}

impl From<SnapshotStoreError> for DomainError {
    fn from(err: SnapshotStoreError) -> Self {
        DomainError::new(ErrorCode::StorageError, err.to_string())
    }
}

/// Port for persisting portfolio snapshots and the portfolio index.
///
/// Writes are last-write-wins; there is no merge. Reading a key that was
/// never written yields `None`, never an error.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Load the rows saved under `name`.
    async fn get(&self, name: &str) -> Result<Option<Vec<InstanceRow>>, SnapshotStoreError>;

    /// Replace the rows saved under `name`.
    async fn put(&self, name: &str, rows: &[InstanceRow]) -> Result<(), SnapshotStoreError>;

    /// Remove the rows saved under `name`. Removing a missing key is a no-op.
    async fn delete(&self, name: &str) -> Result<(), SnapshotStoreError>;

    /// Load the list of saved portfolios, in creation order.
    async fn load_index(&self) -> Result<Vec<PortfolioSummary>, SnapshotStoreError>;

    /// Replace the list of saved portfolios.
    async fn save_index(&self, index: &[PortfolioSummary]) -> Result<(), SnapshotStoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Compile-time check that trait is object-safe
    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn SnapshotStore) {}

    #[test]
    fn snapshot_store_error_io() {
        let err = SnapshotStoreError::IoError("permission denied".to_string());
        assert!(err.to_string().contains("IO error"));
    }

    #[test]
    fn snapshot_store_error_maps_to_storage_code() {
        let err: DomainError = SnapshotStoreError::DeserializationFailed("eof".to_string()).into();
        assert_eq!(err.code, ErrorCode::StorageError);
    }
}
