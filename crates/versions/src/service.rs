//! Ticket-facing operations over the allocator and both stores.

use crate::allocator::VersionAllocator;
use crate::attachments::{AttachmentStore, StoredVersion};
use crate::error::{DeleteStage, VersionError, VersionResult};
use crate::feedback::FeedbackStore;
use crate::locks::LockMap;
use bytes::Bytes;
use docket_core::{FeedbackEntry, FeedbackRecord, FileName, TicketId, VersionId};
use docket_storage::ObjectStore;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Path prefix under which stored files are served.
pub const UPLOADS_PATH: &str = "/uploads";

/// Unreserved URL characters stay readable; everything else is escaped.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// A stored file and the path it is served from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StoredFile {
    pub name: FileName,
    pub url: String,
}

/// One version with its files and feedback merged.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VersionView {
    pub version: VersionId,
    pub files: Vec<StoredFile>,
    pub feedbacks: Vec<FeedbackEntry>,
}

/// The file written by an upload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UploadedFile {
    pub name: FileName,
    pub url: String,
    pub size: u64,
}

/// Result of an upload: the version it created and the stored file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UploadReceipt {
    pub version: VersionId,
    pub file: UploadedFile,
}

/// Versioned attachments and feedback for tickets.
///
/// Uploads, feedback, and version deletes hold a ticket's gate shared;
/// ticket deletion holds it exclusively so it never interleaves with writes
/// into the same ticket.
pub struct VersionedAttachmentService {
    allocator: VersionAllocator,
    attachments: AttachmentStore,
    feedback: FeedbackStore,
    gates: LockMap<RwLock<()>>,
}

impl VersionedAttachmentService {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self {
            allocator: VersionAllocator::new(store.clone()),
            attachments: AttachmentStore::new(store.clone()),
            feedback: FeedbackStore::new(store),
            gates: LockMap::new(),
        }
    }

    /// Store a file under a freshly allocated version.
    ///
    /// Every call creates a new version, even for the same file name.
    #[tracing::instrument(skip(self, data), fields(ticket_id = %ticket_id, file = %name))]
    pub async fn upload_file(
        &self,
        ticket_id: &TicketId,
        name: &FileName,
        data: Bytes,
    ) -> VersionResult<UploadReceipt> {
        let _gate = self.gates.read(ticket_id.as_str()).await;

        let version = self.allocator.allocate(ticket_id).await?;
        let size = data.len() as u64;
        self.attachments.put(ticket_id, &version, name, data).await?;

        tracing::info!(version = %version, size, "Stored upload");
        let url = file_url(ticket_id, &version, name);
        Ok(UploadReceipt {
            version,
            file: UploadedFile {
                name: name.clone(),
                url,
                size,
            },
        })
    }

    /// Every version of a ticket with files and feedback, in version order.
    ///
    /// Versions that only have feedback are listed with no files.
    pub async fn list_versions_with_feedback(
        &self,
        ticket_id: &TicketId,
    ) -> VersionResult<Vec<VersionView>> {
        let stored = self.attachments.list(ticket_id).await?;
        let records = self.feedback.list_by_ticket(ticket_id).await?;

        let mut merged: BTreeMap<VersionId, VersionView> = BTreeMap::new();
        for StoredVersion { version, files } in stored {
            let files = files
                .into_iter()
                .map(|name| StoredFile {
                    url: file_url(ticket_id, &version, &name),
                    name,
                })
                .collect();
            merged.insert(
                version.clone(),
                VersionView {
                    version,
                    files,
                    feedbacks: Vec::new(),
                },
            );
        }
        for FeedbackRecord {
            version, feedbacks, ..
        } in records
        {
            merged
                .entry(version.clone())
                .or_insert_with(|| VersionView {
                    version,
                    files: Vec::new(),
                    feedbacks: Vec::new(),
                })
                .feedbacks = feedbacks;
        }

        Ok(merged.into_values().collect())
    }

    /// Attachments only, grouped by version.
    pub async fn list_files(&self, ticket_id: &TicketId) -> VersionResult<Vec<StoredVersion>> {
        self.attachments.list(ticket_id).await
    }

    /// Feedback records only, sorted by version.
    pub async fn list_feedback(&self, ticket_id: &TicketId) -> VersionResult<Vec<FeedbackRecord>> {
        self.feedback.list_by_ticket(ticket_id).await
    }

    /// Append feedback to any version label, stored or not.
    pub async fn submit_feedback(
        &self,
        ticket_id: &TicketId,
        version: &VersionId,
        text: &str,
    ) -> VersionResult<FeedbackEntry> {
        let _gate = self.gates.read(ticket_id.as_str()).await;
        self.feedback.append(ticket_id, version, text).await
    }

    /// Bytes of one stored file.
    pub async fn read_file(
        &self,
        ticket_id: &TicketId,
        version: &VersionId,
        name: &FileName,
    ) -> VersionResult<Bytes> {
        self.attachments.get(ticket_id, version, name).await
    }

    /// Remove a version's files and its feedback record.
    ///
    /// Both removals are attempted. If either fails the first failure is
    /// returned as [`VersionError::PartialDelete`]; the other side is not
    /// restored, and repeating the call is safe.
    #[tracing::instrument(skip(self), fields(ticket_id = %ticket_id, version = %version))]
    pub async fn delete_version(
        &self,
        ticket_id: &TicketId,
        version: &VersionId,
    ) -> VersionResult<()> {
        let _gate = self.gates.read(ticket_id.as_str()).await;

        let steps = [
            (
                DeleteStage::Attachments,
                self.attachments.delete_version(ticket_id, version).await,
            ),
            (
                DeleteStage::Feedback,
                self.feedback.delete_record(ticket_id, version).await,
            ),
        ];
        first_failure(steps)?;

        tracing::info!("Deleted version");
        Ok(())
    }

    /// Remove every version, all feedback, and the version counter.
    #[tracing::instrument(skip(self), fields(ticket_id = %ticket_id))]
    pub async fn delete_ticket(&self, ticket_id: &TicketId) -> VersionResult<()> {
        let _gate = self.gates.write(ticket_id.as_str()).await;

        let steps = [
            (
                DeleteStage::Attachments,
                self.attachments.delete_ticket(ticket_id).await,
            ),
            (
                DeleteStage::Feedback,
                self.feedback.delete_ticket(ticket_id).await,
            ),
            (DeleteStage::Counter, self.allocator.reset(ticket_id).await),
        ];
        first_failure(steps)?;

        tracing::info!("Deleted ticket attachments and feedback");
        Ok(())
    }
}

/// Log every failed step and return the first one.
fn first_failure<const N: usize>(
    steps: [(DeleteStage, VersionResult<()>); N],
) -> VersionResult<()> {
    let mut first = None;
    for (stage, result) in steps {
        if let Err(e) = result {
            tracing::error!(stage = %stage, error = %e, "Delete step failed");
            first.get_or_insert(VersionError::partial(stage, e));
        }
    }
    match first {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Serving path for a stored file, each segment percent-encoded.
pub fn file_url(ticket_id: &TicketId, version: &VersionId, name: &FileName) -> String {
    format!(
        "{UPLOADS_PATH}/{}/{}/{}",
        utf8_percent_encode(ticket_id.as_str(), PATH_SEGMENT),
        utf8_percent_encode(version.as_str(), PATH_SEGMENT),
        utf8_percent_encode(name.as_str(), PATH_SEGMENT),
    )
}
