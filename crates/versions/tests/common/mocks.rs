use async_trait::async_trait;
use bytes::Bytes;
use docket_storage::{MemoryBackend, ObjectStore, StorageError, StorageResult};
use std::io;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Memory-backed store that fails mutations under chosen key prefixes.
///
/// Failures are reported as I/O errors, the way a full or read-only disk
/// would surface them.
#[allow(dead_code)]
#[derive(Default)]
pub struct FailingStore {
    inner: MemoryBackend,
    failing: Mutex<Vec<String>>,
    pub injected: AtomicUsize,
}

#[allow(dead_code)]
impl FailingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail `put`, `delete` and `delete_prefix` for keys starting with `prefix`.
    pub fn fail_writes_under(&self, prefix: &str) {
        self.failing.lock().unwrap().push(prefix.to_string());
    }

    /// Stop injecting failures.
    pub fn heal(&self) {
        self.failing.lock().unwrap().clear();
    }

    fn check(&self, key: &str) -> StorageResult<()> {
        let failing = self.failing.lock().unwrap();
        if failing.iter().any(|prefix| key.starts_with(prefix.as_str())) {
            self.injected.fetch_add(1, Ordering::SeqCst);
            return Err(StorageError::Io(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("injected failure for {key}"),
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for FailingStore {
    async fn exists(&self, key: &str) -> StorageResult<bool> {
        self.inner.exists(key).await
    }

    async fn get(&self, key: &str) -> StorageResult<Bytes> {
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, data: Bytes) -> StorageResult<()> {
        self.check(key)?;
        self.inner.put(key, data).await
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.check(key)?;
        self.inner.delete(key).await
    }

    async fn delete_prefix(&self, prefix: &str) -> StorageResult<()> {
        self.check(prefix)?;
        self.inner.delete_prefix(prefix).await
    }

    async fn list(&self, prefix: &str) -> StorageResult<Vec<String>> {
        self.inner.list(prefix).await
    }

    fn backend_name(&self) -> &'static str {
        "failing"
    }
}
