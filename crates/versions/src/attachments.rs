//! Uploaded file bytes, grouped by ticket and version.

use crate::error::{VersionError, VersionResult};
use crate::keys;
use bytes::Bytes;
use docket_core::{FileName, TicketId, VersionId};
use docket_storage::ObjectStore;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// One version and the files stored under it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredVersion {
    pub version: VersionId,
    /// File names in byte order.
    pub files: Vec<FileName>,
}

/// Stores attachments at `attachments/<ticket>/<version>/<file>`.
pub struct AttachmentStore {
    store: Arc<dyn ObjectStore>,
}

impl AttachmentStore {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Write a file into a version, replacing a file of the same name.
    #[tracing::instrument(skip(self, data), fields(ticket_id = %ticket_id, version = %version, size = data.len()))]
    pub async fn put(
        &self,
        ticket_id: &TicketId,
        version: &VersionId,
        name: &FileName,
        data: Bytes,
    ) -> VersionResult<()> {
        self.store
            .put(&keys::attachment(ticket_id, version, name), data)
            .await?;
        Ok(())
    }

    /// Read one stored file.
    pub async fn get(
        &self,
        ticket_id: &TicketId,
        version: &VersionId,
        name: &FileName,
    ) -> VersionResult<Bytes> {
        let key = keys::attachment(ticket_id, version, name);
        match self.store.get(&key).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.is_not_found() => Err(VersionError::NotFound(format!(
                "{ticket_id}/{version}/{name}"
            ))),
            Err(e) => Err(e.into()),
        }
    }

    /// All versions of a ticket in version order. Empty for unknown tickets.
    pub async fn list(&self, ticket_id: &TicketId) -> VersionResult<Vec<StoredVersion>> {
        let stored = self
            .store
            .list(&keys::ticket_attachments(ticket_id))
            .await?;

        let mut versions: BTreeMap<VersionId, BTreeSet<FileName>> = BTreeMap::new();
        for key in stored {
            match keys::parse_attachment(&key) {
                Some((version, name)) => {
                    versions.entry(version).or_default().insert(name);
                }
                None => tracing::warn!(key = %key, "Skipping malformed attachment key"),
            }
        }

        Ok(versions
            .into_iter()
            .map(|(version, files)| StoredVersion {
                version,
                files: files.into_iter().collect(),
            })
            .collect())
    }

    /// Remove a version and all of its files. Missing versions are a no-op.
    #[tracing::instrument(skip(self), fields(ticket_id = %ticket_id, version = %version))]
    pub async fn delete_version(
        &self,
        ticket_id: &TicketId,
        version: &VersionId,
    ) -> VersionResult<()> {
        self.store
            .delete_prefix(&keys::version_attachments(ticket_id, version))
            .await?;
        Ok(())
    }

    /// Remove every version of a ticket. Missing tickets are a no-op.
    #[tracing::instrument(skip(self), fields(ticket_id = %ticket_id))]
    pub async fn delete_ticket(&self, ticket_id: &TicketId) -> VersionResult<()> {
        self.store
            .delete_prefix(&keys::ticket_attachments(ticket_id))
            .await?;
        Ok(())
    }
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

    fn f(name: &str) -> FileName {
        FileName::parse(name).unwrap()
    }

    fn store() -> AttachmentStore {
        AttachmentStore::new(Arc::new(MemoryBackend::new()))
    }

    #[tokio::test]
    async fn list_orders_versions_numerically() {
        let attachments = store();
        let ticket = t("T1");
        for label in ["v10", "v2", "v1", "draft"] {
            attachments
                .put(&ticket, &v(label), &f("a.png"), Bytes::from_static(b"x"))
                .await
                .unwrap();
        }

        let labels: Vec<String> = attachments
            .list(&ticket)
            .await
            .unwrap()
            .into_iter()
            .map(|stored| stored.version.to_string())
            .collect();
        assert_eq!(labels, ["v1", "v2", "v10", "draft"]);
    }

    #[tokio::test]
    async fn same_name_overwrites_within_version() {
        let attachments = store();
        let (ticket, version, name) = (t("T1"), v("v1"), f("a.png"));
        attachments
            .put(&ticket, &version, &name, Bytes::from_static(b"old"))
            .await
            .unwrap();
        attachments
            .put(&ticket, &version, &name, Bytes::from_static(b"new"))
            .await
            .unwrap();
        attachments
            .put(&ticket, &version, &f("b.png"), Bytes::from_static(b"b"))
            .await
            .unwrap();

        let listed = attachments.list(&ticket).await.unwrap();
        assert_eq!(
            listed,
            vec![StoredVersion {
                version: version.clone(),
                files: vec![f("a.png"), f("b.png")],
            }]
        );
        assert_eq!(
            attachments.get(&ticket, &version, &name).await.unwrap(),
            Bytes::from_static(b"new")
        );
    }

    #[tokio::test]
    async fn unknown_ticket_lists_empty_and_get_is_not_found() {
        let attachments = store();
        assert!(attachments.list(&t("nobody")).await.unwrap().is_empty());
        assert!(matches!(
            attachments.get(&t("nobody"), &v("v1"), &f("a.png")).await,
            Err(VersionError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn deletes_are_idempotent_and_scoped() {
        let attachments = store();
        let data = Bytes::from_static(b"x");
        attachments
            .put(&t("T1"), &v("v1"), &f("a.png"), data.clone())
            .await
            .unwrap();
        attachments
            .put(&t("T1"), &v("v2"), &f("b.png"), data.clone())
            .await
            .unwrap();
        attachments
            .put(&t("T10"), &v("v1"), &f("c.png"), data)
            .await
            .unwrap();

        attachments.delete_version(&t("T1"), &v("v1")).await.unwrap();
        attachments.delete_version(&t("T1"), &v("v1")).await.unwrap();
        let remaining = attachments.list(&t("T1")).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].version, v("v2"));

        attachments.delete_ticket(&t("T1")).await.unwrap();
        attachments.delete_ticket(&t("T1")).await.unwrap();
        assert!(attachments.list(&t("T1")).await.unwrap().is_empty());
        assert_eq!(attachments.list(&t("T10")).await.unwrap().len(), 1);
    }
}
