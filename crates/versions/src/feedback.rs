//! Append-only feedback records, one per (ticket, version).

use crate::error::{VersionError, VersionResult};
use crate::keys;
use crate::locks::LockMap;
use bytes::Bytes;
use docket_core::{FeedbackEntry, FeedbackRecord, TicketId, VersionId};
use docket_storage::{ObjectStore, StorageError};
use std::sync::Arc;
use time::OffsetDateTime;
use tokio::sync::Mutex;

/// Stores feedback records as JSON at `feedback/<ticket>/<version>.json`.
///
/// Appends are read-modify-write on the whole record and are serialized per
/// record, so concurrent appends to the same version never lose entries.
pub struct FeedbackStore {
    store: Arc<dyn ObjectStore>,
    locks: LockMap<Mutex<()>>,
}

impl FeedbackStore {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self {
            store,
            locks: LockMap::new(),
        }
    }

    /// Append an entry stamped with the current time.
    ///
    /// The version label does not have to match any stored attachments.
    #[tracing::instrument(skip(self, text), fields(ticket_id = %ticket_id, version = %version))]
    pub async fn append(
        &self,
        ticket_id: &TicketId,
        version: &VersionId,
        text: &str,
    ) -> VersionResult<FeedbackEntry> {
        let entry = FeedbackEntry::new(text, OffsetDateTime::now_utc())?;

        let key = keys::feedback_record(ticket_id, version);
        let _guard = self.locks.lock(&key).await;

        let mut record = self
            .load(&key)
            .await?
            .unwrap_or_else(|| FeedbackRecord::new(ticket_id.clone(), version.clone()));
        record.push(entry.clone());
        self.save(&key, &record).await?;

        tracing::debug!(entries = record.feedbacks.len(), "Appended feedback");
        Ok(entry)
    }

    /// The record for one version, if any feedback was submitted.
    pub async fn get(
        &self,
        ticket_id: &TicketId,
        version: &VersionId,
    ) -> VersionResult<Option<FeedbackRecord>> {
        self.load(&keys::feedback_record(ticket_id, version)).await
    }

    /// Every record of a ticket, sorted by version. Empty for unknown tickets.
    pub async fn list_by_ticket(&self, ticket_id: &TicketId) -> VersionResult<Vec<FeedbackRecord>> {
        let stored = self.store.list(&keys::ticket_feedback(ticket_id)).await?;

        let mut records = Vec::with_capacity(stored.len());
        for key in stored {
            if keys::parse_feedback_record(&key).is_none() {
                tracing::warn!(key = %key, "Skipping malformed feedback key");
                continue;
            }
            // A record deleted between list and load is simply gone.
            if let Some(record) = self.load(&key).await? {
                records.push(record);
            }
        }
        records.sort_by(|a, b| a.version.cmp(&b.version));
        Ok(records)
    }

    /// Remove the record for one version. Missing records are a no-op.
    #[tracing::instrument(skip(self), fields(ticket_id = %ticket_id, version = %version))]
    pub async fn delete_record(
        &self,
        ticket_id: &TicketId,
        version: &VersionId,
    ) -> VersionResult<()> {
        let key = keys::feedback_record(ticket_id, version);
        let _guard = self.locks.lock(&key).await;
        match self.store.delete(&key).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Remove every record of a ticket. Missing tickets are a no-op.
    #[tracing::instrument(skip(self), fields(ticket_id = %ticket_id))]
    pub async fn delete_ticket(&self, ticket_id: &TicketId) -> VersionResult<()> {
        self.store
            .delete_prefix(&keys::ticket_feedback(ticket_id))
            .await?;
        Ok(())
    }

    async fn load(&self, key: &str) -> VersionResult<Option<FeedbackRecord>> {
        let bytes = match self.store.get(key).await {
            Ok(bytes) => bytes,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let record = serde_json::from_slice(&bytes).map_err(|e| corrupt(key, e))?;
        Ok(Some(record))
    }

    async fn save(&self, key: &str, record: &FeedbackRecord) -> VersionResult<()> {
        let json = serde_json::to_vec_pretty(record).map_err(|e| corrupt(key, e))?;
        self.store.put(key, Bytes::from(json)).await?;
        Ok(())
    }
}

fn corrupt(key: &str, err: serde_json::Error) -> VersionError {
    VersionError::Storage(StorageError::Corrupt {
        key: key.to_string(),
        reason: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use docket_storage::MemoryBackend;

    fn t(id: &str) -> TicketId {
        TicketId::parse(id).unwrap()
    }

    fn v(label: &str) -> VersionId {
        VersionId::parse(label).unwrap()
    }

    #[tokio::test]
    async fn append_preserves_submission_order() {
        let feedback = FeedbackStore::new(Arc::new(MemoryBackend::new()));
        feedback.append(&t("T1"), &v("v1"), "fix spacing").await.unwrap();
        feedback.append(&t("T1"), &v("v1"), "looks good").await.unwrap();

        let record = feedback.get(&t("T1"), &v("v1")).await.unwrap().unwrap();
        let texts: Vec<&str> = record.feedbacks.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, ["fix spacing", "looks good"]);
        assert_eq!(record.ticket_id, t("T1"));
        assert_eq!(record.version, v("v1"));
    }

    #[tokio::test]
    async fn blank_text_writes_nothing() {
        let store = Arc::new(MemoryBackend::new());
        let feedback = FeedbackStore::new(store.clone());

        assert!(matches!(
            feedback.append(&t("T1"), &v("v1"), "   ").await,
            Err(VersionError::Validation(_))
        ));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn list_is_sorted_and_scoped_to_ticket() {
        let feedback = FeedbackStore::new(Arc::new(MemoryBackend::new()));
        feedback.append(&t("1"), &v("v10"), "ten").await.unwrap();
        feedback.append(&t("1"), &v("v2"), "two").await.unwrap();
        feedback.append(&t("10"), &v("v1"), "other ticket").await.unwrap();

        let versions: Vec<String> = feedback
            .list_by_ticket(&t("1"))
            .await
            .unwrap()
            .into_iter()
            .map(|record| record.version.to_string())
            .collect();
        assert_eq!(versions, ["v2", "v10"]);
        assert!(feedback.list_by_ticket(&t("none")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn corrupt_record_is_reported() {
        let store: Arc<dyn ObjectStore> = Arc::new(MemoryBackend::new());
        store
            .put("feedback/T1/v1.json", Bytes::from_static(b"{"))
            .await
            .unwrap();
        let feedback = FeedbackStore::new(store);

        assert!(matches!(
            feedback.list_by_ticket(&t("T1")).await,
            Err(VersionError::Storage(StorageError::Corrupt { .. }))
        ));
        // Appending must not silently replace a record it cannot read.
        assert!(feedback.append(&t("T1"), &v("v1"), "hi").await.is_err());
    }

    #[tokio::test]
    async fn deletes_are_idempotent() {
        let feedback = FeedbackStore::new(Arc::new(MemoryBackend::new()));
        feedback.append(&t("T1"), &v("v1"), "a").await.unwrap();
        feedback.append(&t("T1"), &v("v2"), "b").await.unwrap();

        feedback.delete_record(&t("T1"), &v("v1")).await.unwrap();
        feedback.delete_record(&t("T1"), &v("v1")).await.unwrap();
        assert!(feedback.get(&t("T1"), &v("v1")).await.unwrap().is_none());

        feedback.delete_ticket(&t("T1")).await.unwrap();
        feedback.delete_ticket(&t("T1")).await.unwrap();
        assert!(feedback.list_by_ticket(&t("T1")).await.unwrap().is_empty());
    }
}
