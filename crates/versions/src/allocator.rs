//! Per-ticket version number allocation.

use crate::error::{VersionError, VersionResult};
use crate::keys;
use crate::locks::LockMap;
use bytes::Bytes;
use docket_core::{TicketId, VersionId};
use docket_storage::{ObjectStore, StorageError, StorageResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Persisted high-water mark for a ticket.
#[derive(Debug, Serialize, Deserialize)]
struct CounterRecord {
    ticket_id: TicketId,
    last_version: u64,
}

/// Hands out `v1, v2, ...` per ticket.
///
/// The next number is one past the larger of the persisted counter and the
/// highest canonical version present among the ticket's attachments. The
/// counter is written before the label is returned, so a number is never
/// handed out twice, even after deleting the highest version or restarting.
/// A failure after the counter write leaves a gap.
pub struct VersionAllocator {
    store: Arc<dyn ObjectStore>,
    locks: LockMap<Mutex<()>>,
}

impl VersionAllocator {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self {
            store,
            locks: LockMap::new(),
        }
    }

    /// Reserve the next version label for a ticket.
    #[tracing::instrument(skip(self), fields(ticket_id = %ticket_id))]
    pub async fn allocate(&self, ticket_id: &TicketId) -> VersionResult<VersionId> {
        let _guard = self.locks.lock(ticket_id.as_str()).await;

        let allocation_error = |source: StorageError| VersionError::Allocation {
            ticket_id: ticket_id.clone(),
            source,
        };

        let persisted = self
            .read_counter(ticket_id)
            .await
            .map_err(allocation_error)?
            .unwrap_or(0);
        let observed = self
            .highest_stored(ticket_id)
            .await
            .map_err(allocation_error)?;

        let next = persisted
            .max(observed)
            .checked_add(1)
            .ok_or_else(|| {
                allocation_error(StorageError::Corrupt {
                    key: keys::counter(ticket_id),
                    reason: "version counter exhausted".to_string(),
                })
            })?;

        self.write_counter(ticket_id, next)
            .await
            .map_err(allocation_error)?;

        tracing::debug!(version = next, persisted, observed, "Allocated version");
        Ok(VersionId::from_ordinal(next)?)
    }

    /// The last allocated number, if the ticket has a counter.
    pub async fn current(&self, ticket_id: &TicketId) -> VersionResult<Option<u64>> {
        Ok(self.read_counter(ticket_id).await?)
    }

    /// Forget the ticket's counter so numbering restarts at `v1`.
    ///
    /// Missing counters are not an error.
    pub async fn reset(&self, ticket_id: &TicketId) -> VersionResult<()> {
        let _guard = self.locks.lock(ticket_id.as_str()).await;
        match self.store.delete(&keys::counter(ticket_id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn read_counter(&self, ticket_id: &TicketId) -> StorageResult<Option<u64>> {
        let key = keys::counter(ticket_id);
        let bytes = match self.store.get(&key).await {
            Ok(bytes) => bytes,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => return Err(e),
        };
        let record: CounterRecord =
            serde_json::from_slice(&bytes).map_err(|e| StorageError::Corrupt {
                key,
                reason: e.to_string(),
            })?;
        Ok(Some(record.last_version))
    }

    async fn write_counter(&self, ticket_id: &TicketId, last_version: u64) -> StorageResult<()> {
        let key = keys::counter(ticket_id);
        let record = CounterRecord {
            ticket_id: ticket_id.clone(),
            last_version,
        };
        let json = serde_json::to_vec(&record).map_err(|e| StorageError::Corrupt {
            key: key.clone(),
            reason: e.to_string(),
        })?;
        self.store.put(&key, Bytes::from(json)).await
    }

    async fn highest_stored(&self, ticket_id: &TicketId) -> StorageResult<u64> {
        let stored = self
            .store
            .list(&keys::ticket_attachments(ticket_id))
            .await?;
        Ok(stored
            .iter()
            .filter_map(|key| keys::parse_attachment(key))
            .filter_map(|(version, _)| version.ordinal())
            .max()
            .unwrap_or(0))
    }
}
