//! Versioned ticket attachments and feedback for docket.
//!
//! This crate provides:
//! - Monotonic per-ticket version allocation that survives restarts
//! - Attachment storage grouped by ticket and version
//! - Append-only feedback records per (ticket, version)
//! - [`VersionedAttachmentService`], which composes the three with per-ticket
//!   locking and partial-failure reporting for deletes

pub mod allocator;
pub mod attachments;
pub mod error;
pub mod feedback;
pub mod keys;
pub mod locks;
pub mod service;

pub use allocator::VersionAllocator;
pub use attachments::{AttachmentStore, StoredVersion};
pub use error::{DeleteStage, VersionError, VersionResult};
pub use feedback::FeedbackStore;
pub use locks::{KeyedGuard, LockMap};
pub use service::{
    StoredFile, UPLOADS_PATH, UploadReceipt, UploadedFile, VersionView,
    VersionedAttachmentService, file_url,
};
