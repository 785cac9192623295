//! In-Memory Snapshot Store Adapter
//!
//! Stores portfolio snapshots in memory.
//! Useful for testing and development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::instance::InstanceRow;
use crate::domain::portfolio::PortfolioSummary;
use crate::ports::{SnapshotStore, SnapshotStoreError};

/// In-memory storage for portfolio snapshots
#[derive(Debug, Clone)]
pub struct InMemorySnapshotStore {
    snapshots: Arc<RwLock<HashMap<String, Vec<InstanceRow>>>>,
    index: Arc<RwLock<Vec<PortfolioSummary>>>,
}

impl InMemorySnapshotStore {
    /// Create a new in-memory store
    pub fn new() -> Self {
        Self {
            snapshots: Arc::new(RwLock::new(HashMap::new())),
            index: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Clear all stored data (useful for tests)
    pub async fn clear(&self) {
        self.snapshots.write().await.clear();
        self.index.write().await.clear();
    }

    /// Get the number of stored snapshots
    pub async fn snapshot_count(&self) -> usize {
        self.snapshots.read().await.len()
    }
}

impl Default for InMemorySnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SnapshotStore for InMemorySnapshotStore {
    async fn get(&self, name: &str) -> Result<Option<Vec<InstanceRow>>, SnapshotStoreError> {
        Ok(self.snapshots.read().await.get(name).cloned())
    }

    async fn put(&self, name: &str, rows: &[InstanceRow]) -> Result<(), SnapshotStoreError> {
        self.snapshots
            .write()
            .await
            .insert(name.to_string(), rows.to_vec());
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<(), SnapshotStoreError> {
        self.snapshots.write().await.remove(name);
        Ok(())
    }

    async fn load_index(&self) -> Result<Vec<PortfolioSummary>, SnapshotStoreError> {
        Ok(self.index.read().await.clone())
    }

    async fn save_index(&self, index: &[PortfolioSummary]) -> Result<(), SnapshotStoreError> {
        *self.index.write().await = index.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::RowId;
    use crate::domain::instance::PricingModel;

    fn row(size: &str) -> InstanceRow {
        InstanceRow {
            id: RowId::new(),
            region: "eastus".to_string(),
            size: size.to_string(),
            quantity: 1,
            hours: 730,
            pricing_model: PricingModel::Spot,
        }
    }

    #[tokio::test]
    async fn put_get_delete() {
        let store = InMemorySnapshotStore::new();
        let rows = vec![row("Standard_D4s_v3")];

        store.put("Prod", &rows).await.unwrap();
        assert_eq!(store.get("Prod").await.unwrap(), Some(rows));
        assert_eq!(store.snapshot_count().await, 1);

        store.delete("Prod").await.unwrap();
        assert!(store.get("Prod").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn clones_share_state() {
        let store = InMemorySnapshotStore::new();
        let other = store.clone();

        store.put("Prod", &[row("Standard_B2s")]).await.unwrap();

        assert!(other.get("Prod").await.unwrap().is_some());
        other.clear().await;
        assert_eq!(store.snapshot_count().await, 0);
    }
}
