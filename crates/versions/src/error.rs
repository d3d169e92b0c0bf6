//! Error types for versioned attachments and feedback.

use docket_core::TicketId;
use docket_storage::StorageError;
use std::fmt;
use thiserror::Error;

/// Sub-step of a composite delete.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeleteStage {
    Attachments,
    Feedback,
    Counter,
}

impl fmt::Display for DeleteStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Attachments => "attachments",
            Self::Feedback => "feedback",
            Self::Counter => "version counter",
        };
        f.write_str(name)
    }
}

/// Errors from the attachment, feedback, and allocation stores.
#[derive(Debug, Error)]
pub enum VersionError {
    #[error("validation error: {0}")]
    Validation(#[from] docket_core::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("cannot allocate a version for ticket {ticket_id}: {source}")]
    Allocation {
        ticket_id: TicketId,
        #[source]
        source: StorageError,
    },

    /// A composite delete where at least one sub-step failed. Sub-steps that
    /// succeeded are not rolled back; retrying the delete is safe.
    #[error("delete incomplete, {stage} removal failed: {source}")]
    PartialDelete {
        stage: DeleteStage,
        #[source]
        source: Box<VersionError>,
    },
}

impl VersionError {
    pub(crate) fn partial(stage: DeleteStage, source: VersionError) -> Self {
        Self::PartialDelete {
            stage,
            source: Box::new(source),
        }
    }
}

/// Result type for version store operations.
pub type VersionResult<T> = std::result::Result<T, VersionError>;
