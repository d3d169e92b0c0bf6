//! Feedback entries and per-version feedback records.

use crate::ticket::{TicketId, VersionId};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Maximum feedback text length in bytes.
pub const MAX_FEEDBACK_LEN: usize = 16 * 1024;

/// A single piece of feedback on a version.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackEntry {
    /// Feedback text as submitted.
    pub text: String,
    /// Server-assigned creation time.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl FeedbackEntry {
    /// Create an entry, rejecting blank or oversized text.
    pub fn new(text: impl Into<String>, created_at: OffsetDateTime) -> crate::Result<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(crate::Error::InvalidFeedback(
                "feedback text cannot be empty".to_string(),
            ));
        }
        if text.len() > MAX_FEEDBACK_LEN {
            return Err(crate::Error::InvalidFeedback(format!(
                "feedback text must be at most {MAX_FEEDBACK_LEN} bytes, got {}",
                text.len()
            )));
        }
        Ok(Self { text, created_at })
    }
}

/// All feedback for one (ticket, version) pair, in submission order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub ticket_id: TicketId,
    pub version: VersionId,
    #[serde(default)]
    pub feedbacks: Vec<FeedbackEntry>,
}

impl FeedbackRecord {
    /// Create an empty record.
    pub fn new(ticket_id: TicketId, version: VersionId) -> Self {
        Self {
            ticket_id,
            version,
            feedbacks: Vec::new(),
        }
    }

    /// Append an entry at the end of the record.
    pub fn push(&mut self, entry: FeedbackEntry) {
        self.feedbacks.push(entry);
    }
}
