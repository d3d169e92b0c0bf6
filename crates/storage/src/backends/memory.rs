//! In-memory storage backend.

use crate::error::{StorageError, StorageResult};
use crate::traits::{ObjectStore, key_segments};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::instrument;

/// Volatile object store keeping everything in a sorted map.
///
/// Writes replace whole values under a lock, so they are atomic for readers.
#[derive(Default)]
pub struct MemoryBackend {
    objects: RwLock<BTreeMap<String, Bytes>>,
}

impl MemoryBackend {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects.
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    /// Whether the store holds no objects.
    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

/// Normalize a prefix so `a/b` never matches `a/bc/...`.
fn dir_prefix(prefix: &str) -> StorageResult<String> {
    let segments = key_segments(prefix)?;
    Ok(format!("{}/", segments.join("/")))
}

#[async_trait]
impl ObjectStore for MemoryBackend {
    #[instrument(skip(self), fields(backend = "memory"))]
    async fn exists(&self, key: &str) -> StorageResult<bool> {
        key_segments(key)?;
        Ok(self.objects.read().await.contains_key(key))
    }

    #[instrument(skip(self), fields(backend = "memory"))]
    async fn get(&self, key: &str) -> StorageResult<Bytes> {
        key_segments(key)?;
        self.objects
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    #[instrument(skip(self, data), fields(backend = "memory", size = data.len()))]
    async fn put(&self, key: &str, data: Bytes) -> StorageResult<()> {
        key_segments(key)?;
        self.objects.write().await.insert(key.to_string(), data);
        Ok(())
    }

    #[instrument(skip(self), fields(backend = "memory"))]
    async fn delete(&self, key: &str) -> StorageResult<()> {
        key_segments(key)?;
        self.objects
            .write()
            .await
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    #[instrument(skip(self), fields(backend = "memory"))]
    async fn delete_prefix(&self, prefix: &str) -> StorageResult<()> {
        let dir = dir_prefix(prefix)?;
        let exact = dir.trim_end_matches('/').to_string();
        let mut objects = self.objects.write().await;
        objects.retain(|key, _| *key != exact && !key.starts_with(&dir));
        Ok(())
    }

    #[instrument(skip(self), fields(backend = "memory"))]
    async fn list(&self, prefix: &str) -> StorageResult<Vec<String>> {
        let dir = dir_prefix(prefix)?;
        let objects = self.objects.read().await;
        Ok(objects
            .range(dir.clone()..)
            .take_while(|(key, _)| key.starts_with(&dir))
            .map(|(key, _)| key.clone())
            .collect())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
