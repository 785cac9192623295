//! File-based Snapshot Store Adapter
//!
//! Stores each portfolio's rows as a JSON array on disk, plus a single
//! `index.json` listing the saved portfolios.
//!
//! ```text
//! <base>/
//!   index.json
//!   snapshots/
//!     <sha256(name)>.json
//! ```
//!
//! Names are hashed so any portfolio name maps to a safe file name.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::domain::instance::InstanceRow;
use crate::domain::portfolio::PortfolioSummary;
use crate::ports::{SnapshotStore, SnapshotStoreError};

/// File-based storage for portfolio snapshots
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    base_path: PathBuf,
}

impl FileSnapshotStore {
    /// Create a new file store with a base directory
    ///
    /// # Example
    /// ```ignore
    /// let store = FileSnapshotStore::new("./data/portfolios");
    /// ```
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn snapshots_dir(&self) -> PathBuf {
        self.base_path.join("snapshots")
    }

    fn snapshot_file_path(&self, name: &str) -> PathBuf {
        self.snapshots_dir().join(format!("{}.json", snapshot_key(name)))
    }

    fn index_file_path(&self) -> PathBuf {
        self.base_path.join("index.json")
    }

    async fn ensure_dir(&self, path: &Path) -> Result<(), SnapshotStoreError> {
        fs::create_dir_all(path)
            .await
            .map_err(|e| SnapshotStoreError::IoError(e.to_string()))
    }

    /// Writes through a sibling temp file so readers never see half a file.
    async fn write_atomic(&self, path: &Path, contents: String) -> Result<(), SnapshotStoreError> {
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, contents)
            .await
            .map_err(|e| SnapshotStoreError::IoError(e.to_string()))?;
        fs::rename(&tmp, path)
            .await
            .map_err(|e| SnapshotStoreError::IoError(e.to_string()))
    }
}

/// Hex SHA-256 of the exact portfolio name.
pub fn snapshot_key(name: &str) -> String {
    format!("{:x}", Sha256::digest(name.as_bytes()))
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    async fn get(&self, name: &str) -> Result<Option<Vec<InstanceRow>>, SnapshotStoreError> {
        let file_path = self.snapshot_file_path(name);

        if !file_path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&file_path)
            .await
            .map_err(|e| SnapshotStoreError::IoError(e.to_string()))?;

        let rows = serde_json::from_str(&json)
            .map_err(|e| SnapshotStoreError::DeserializationFailed(e.to_string()))?;

        tracing::debug!(portfolio = name, path = %file_path.display(), "snapshot loaded");
        Ok(Some(rows))
    }

    async fn put(&self, name: &str, rows: &[InstanceRow]) -> Result<(), SnapshotStoreError> {
        self.ensure_dir(&self.snapshots_dir()).await?;

        let json = serde_json::to_string_pretty(rows)
            .map_err(|e| SnapshotStoreError::SerializationFailed(e.to_string()))?;

        let file_path = self.snapshot_file_path(name);
        self.write_atomic(&file_path, json).await?;

        tracing::debug!(portfolio = name, rows = rows.len(), "snapshot written");
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<(), SnapshotStoreError> {
        let file_path = self.snapshot_file_path(name);

        if file_path.exists() {
            fs::remove_file(&file_path)
                .await
                .map_err(|e| SnapshotStoreError::IoError(e.to_string()))?;
            tracing::debug!(portfolio = name, "snapshot removed");
        }

        Ok(())
    }

    async fn load_index(&self) -> Result<Vec<PortfolioSummary>, SnapshotStoreError> {
        let file_path = self.index_file_path();

        if !file_path.exists() {
            return Ok(Vec::new());
        }

        let json = fs::read_to_string(&file_path)
            .await
            .map_err(|e| SnapshotStoreError::IoError(e.to_string()))?;

        serde_json::from_str(&json)
            .map_err(|e| SnapshotStoreError::DeserializationFailed(e.to_string()))
    }

    async fn save_index(&self, index: &[PortfolioSummary]) -> Result<(), SnapshotStoreError> {
        self.ensure_dir(&self.base_path).await?;

        let json = serde_json::to_string_pretty(index)
            .map_err(|e| SnapshotStoreError::SerializationFailed(e.to_string()))?;

        self.write_atomic(&self.index_file_path(), json).await
    }
}
