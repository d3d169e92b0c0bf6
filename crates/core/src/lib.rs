//! Core domain types for the docket ticket attachment service.
//!
//! This crate defines the data model shared by the other crates:
//! - Ticket and version identifiers and their ordering
//! - Attachment file name rules
//! - Feedback entries and per-version feedback records
//! - The member roster and assignment heuristic
//! - Application configuration

pub mod config;
pub mod error;
pub mod feedback;
pub mod member;
pub mod ticket;

pub use error::{Error, Result};
pub use feedback::{FeedbackEntry, FeedbackRecord};
pub use member::{Member, assign_member, default_roster, skill_for_title};
pub use ticket::{FileName, TicketId, VersionId};

/// Maximum length of a ticket identifier.
pub const MAX_TICKET_ID_LEN: usize = 128;

/// Maximum length of a version label.
pub const MAX_VERSION_LEN: usize = 64;

/// Maximum length of an attachment file name in bytes.
pub const MAX_FILE_NAME_LEN: usize = 255;
