//! Storage trait definitions.

use crate::error::{StorageError, StorageResult};
use async_trait::async_trait;
use bytes::Bytes;

/// Key/value object store with `/`-separated hierarchical keys.
///
/// Keys are relative paths made of normal segments. Segments starting with
/// `.` are reserved for backend bookkeeping (temp files, trash) and are
/// rejected as keys and skipped by listings.
#[async_trait]
pub trait ObjectStore: Send + Sync + 'static {
    /// Check if an object exists.
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Get an object's content.
    async fn get(&self, key: &str) -> StorageResult<Bytes>;

    /// Put an object atomically, replacing any previous content.
    ///
    /// Readers observe either the previous object or the complete new one.
    async fn put(&self, key: &str, data: Bytes) -> StorageResult<()>;

    /// Delete an object. Returns `NotFound` if it does not exist.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Delete every object under `prefix`.
    ///
    /// Deleting a prefix with no objects is a no-op.
    async fn delete_prefix(&self, prefix: &str) -> StorageResult<()>;

    /// List object keys under `prefix`. A missing prefix yields an empty list.
    ///
    /// Keys are returned in backend order; callers sort if they need to.
    async fn list(&self, prefix: &str) -> StorageResult<Vec<String>>;

    /// Get the name of this storage backend.
    ///
    /// Returns a static string identifier for the backend type (e.g., "memory", "filesystem").
    /// Used for logging.
    fn backend_name(&self) -> &'static str;

    /// Verify storage backend availability.
    ///
    /// The default implementation returns Ok(()), suitable for backends that
    /// have nothing to verify.
    async fn health_check(&self) -> StorageResult<()> {
        Ok(())
    }
}

/// Validate a key (or prefix) and split it into segments.
///
/// A trailing `/` is allowed so prefixes can be written as directories.
pub fn key_segments(key: &str) -> StorageResult<Vec<&str>> {
    let trimmed = key.strip_suffix('/').unwrap_or(key);
    if trimmed.is_empty() {
        return Err(StorageError::InvalidKey("key cannot be empty".to_string()));
    }
    if trimmed.starts_with('/') || trimmed.contains('\\') {
        return Err(StorageError::InvalidKey(format!(
            "absolute or non-portable key not allowed: {key}"
        )));
    }

    let segments: Vec<&str> = trimmed.split('/').collect();
    for segment in &segments {
        if segment.is_empty() || segment.starts_with('.') || segment.contains('\0') {
            return Err(StorageError::InvalidKey(format!(
                "contains unsafe path segment: {key}"
            )));
        }
    }
    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_segments_accepts_nested_keys() {
        assert_eq!(
            key_segments("attachments/T1/v1/a.png").unwrap(),
            vec!["attachments", "T1", "v1", "a.png"]
        );
        assert_eq!(key_segments("feedback/T1/").unwrap(), vec!["feedback", "T1"]);
    }

    #[test]
    fn test_key_segments_rejects_traversal() {
        for key in [
            "",
            "/",
            "/etc/passwd",
            "../escape",
            "a/../b",
            "a/./b",
            "a//b",
            "a/.hidden",
            "a\\b",
        ] {
            assert!(key_segments(key).is_err(), "key should be rejected: {key:?}");
        }
    }
}
