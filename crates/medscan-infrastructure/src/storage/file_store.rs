//! File-backed key-value store.

use async_trait::async_trait;
use medscan_core::error::{MedscanError, Result};
use medscan_core::store::KeyValueStore;
use std::path::{Path, PathBuf};

use super::atomic_file::AtomicFile;

/// A [`KeyValueStore`] keeping one `<key>.json` file per key in a directory.
///
/// Each write replaces the whole file atomically, so a crash mid-write
/// leaves the previous value readable. An optional byte limit per value
/// emulates the quota of browser storage.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    dir: PathBuf,
    max_value_bytes: Option<u64>,
}

impl FileKeyValueStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            max_value_bytes: None,
        }
    }

    /// Rejects values larger than `limit` bytes with a `Persistence` error.
    pub fn with_max_value_bytes(mut self, limit: Option<u64>) -> Self {
        self.max_value_bytes = limit;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn file_for(&self, key: &str) -> Result<AtomicFile> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(MedscanError::internal(format!(
                "invalid store key '{}'",
                key
            )));
        }
        Ok(AtomicFile::new(self.dir.join(format!("{key}.json"))))
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let file = self.file_for(key)?;
        tokio::task::spawn_blocking(move || file.load())
            .await
            .map_err(|e| MedscanError::internal(format!("Failed to join task: {}", e)))?
            .map_err(|e| MedscanError::io(format!("Failed to read '{}': {}", key, e)))
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        let file = self.file_for(key)?;

        if let Some(limit) = self.max_value_bytes {
            let size = value.len() as u64;
            if size > limit {
                tracing::warn!(key, size, limit, "Store quota exceeded");
                return Err(MedscanError::persistence(format!(
                    "quota exceeded writing '{}': {} bytes > {} bytes",
                    key, size, limit
                )));
            }
        }

        tokio::task::spawn_blocking(move || file.write(&value))
            .await
            .map_err(|e| MedscanError::internal(format!("Failed to join task: {}", e)))?
            .map_err(|e| MedscanError::persistence(format!("Failed to write '{}': {}", key, e)))
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let file = self.file_for(key)?;
        tokio::task::spawn_blocking(move || file.delete())
            .await
            .map_err(|e| MedscanError::internal(format!("Failed to join task: {}", e)))?
            .map_err(|e| MedscanError::persistence(format!("Failed to remove '{}': {}", key, e)))
    }
}
