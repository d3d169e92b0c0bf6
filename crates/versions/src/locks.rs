//! Per-key async locks.
//!
//! Each key gets its own lock on first use. The entry is evicted when the last
//! guard or waiter for that key goes away, so the map only holds keys that are
//! currently contended.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{
    Mutex, OwnedMutexGuard, OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock,
};

/// Registry of locks keyed by string.
pub struct LockMap<L> {
    locks: DashMap<String, Arc<L>>,
}

impl<L: Default> LockMap<L> {
    pub fn new() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }

    /// Number of keys with a live guard or waiter.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }

    fn handle(&self, key: &str) -> Arc<L> {
        self.locks.entry(key.to_string()).or_default().clone()
    }

    fn guard<G>(&self, key: &str, guard: G) -> KeyedGuard<'_, L, G> {
        KeyedGuard {
            guard: Some(guard),
            locks: &self.locks,
            key: key.to_string(),
        }
    }
}

impl<L: Default> Default for LockMap<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl LockMap<Mutex<()>> {
    /// Acquire the exclusive lock for `key`.
    pub async fn lock(&self, key: &str) -> KeyedGuard<'_, Mutex<()>, OwnedMutexGuard<()>> {
        let guard = self.handle(key).lock_owned().await;
        self.guard(key, guard)
    }
}

impl LockMap<RwLock<()>> {
    /// Acquire the shared side of the lock for `key`.
    pub async fn read(&self, key: &str) -> KeyedGuard<'_, RwLock<()>, OwnedRwLockReadGuard<()>> {
        let guard = self.handle(key).read_owned().await;
        self.guard(key, guard)
    }

    /// Acquire the exclusive side of the lock for `key`.
    pub async fn write(
        &self,
        key: &str,
    ) -> KeyedGuard<'_, RwLock<()>, OwnedRwLockWriteGuard<()>> {
        let guard = self.handle(key).write_owned().await;
        self.guard(key, guard)
    }
}

/// Guard for one key. Releases the lock, then evicts the key if unused.
pub struct KeyedGuard<'a, L, G> {
    guard: Option<G>,
    locks: &'a DashMap<String, Arc<L>>,
    key: String,
}

impl<L, G> Drop for KeyedGuard<'_, L, G> {
    fn drop(&mut self) {
        // The owned guard holds its own Arc; release it before counting.
        drop(self.guard.take());
        self.locks
            .remove_if(&self.key, |_, lock| Arc::strong_count(lock) == 1);
    }
}
