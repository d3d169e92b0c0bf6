//! Storage key layout.
//!
//! ```text
//! attachments/<ticket>/<version>/<file>
//! feedback/<ticket>/<version>.json
//! counters/<ticket>.json
//! ```

use docket_core::{FileName, TicketId, VersionId};

const ATTACHMENTS: &str = "attachments";
const FEEDBACK: &str = "feedback";
const COUNTERS: &str = "counters";
const RECORD_SUFFIX: &str = ".json";

pub fn ticket_attachments(ticket_id: &TicketId) -> String {
    format!("{ATTACHMENTS}/{ticket_id}/")
}

pub fn version_attachments(ticket_id: &TicketId, version: &VersionId) -> String {
    format!("{ATTACHMENTS}/{ticket_id}/{version}/")
}

pub fn attachment(ticket_id: &TicketId, version: &VersionId, name: &FileName) -> String {
    format!("{ATTACHMENTS}/{ticket_id}/{version}/{name}")
}

pub fn ticket_feedback(ticket_id: &TicketId) -> String {
    format!("{FEEDBACK}/{ticket_id}/")
}

pub fn feedback_record(ticket_id: &TicketId, version: &VersionId) -> String {
    format!("{FEEDBACK}/{ticket_id}/{version}{RECORD_SUFFIX}")
}

pub fn counter(ticket_id: &TicketId) -> String {
    format!("{COUNTERS}/{ticket_id}{RECORD_SUFFIX}")
}

/// Split `attachments/<ticket>/<version>/<file>` into version and file name.
///
/// Returns `None` for anything that does not follow the layout.
pub fn parse_attachment(key: &str) -> Option<(VersionId, FileName)> {
    let mut parts = key.split('/');
    let (Some(ATTACHMENTS), Some(_ticket), Some(version), Some(name), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return None;
    };
    Some((VersionId::parse(version).ok()?, FileName::parse(name).ok()?))
}

/// Extract the version label from `feedback/<ticket>/<version>.json`.
pub fn parse_feedback_record(key: &str) -> Option<VersionId> {
    let mut parts = key.split('/');
    let (Some(FEEDBACK), Some(_ticket), Some(file), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return None;
    };
    VersionId::parse(file.strip_suffix(RECORD_SUFFIX)?).ok()
}
