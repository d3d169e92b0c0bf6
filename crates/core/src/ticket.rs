//! Ticket, version, and attachment name types.
//!
//! All three are used as storage key segments, so parsing enforces that a
//! value can never introduce a path separator, a parent reference, or a
//! hidden (dot-prefixed) entry.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Identifier of a ticket, supplied by the ticket registry.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TicketId(String);

impl TicketId {
    /// Parse a ticket identifier.
    pub fn parse(id: impl Into<String>) -> crate::Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(crate::Error::InvalidTicketId(
                "ticket id cannot be empty".to_string(),
            ));
        }
        if id.len() > crate::MAX_TICKET_ID_LEN {
            return Err(crate::Error::InvalidTicketId(format!(
                "ticket id must be at most {} chars, got {}",
                crate::MAX_TICKET_ID_LEN,
                id.len()
            )));
        }
        for c in id.chars() {
            if !matches!(c, 'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_') {
                return Err(crate::Error::InvalidTicketId(format!(
                    "invalid character in ticket id: {c:?}"
                )));
            }
        }
        Ok(Self(id))
    }

    /// Get the identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<u64> for TicketId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl TryFrom<String> for TicketId {
    type Error = crate::Error;

    fn try_from(value: String) -> crate::Result<Self> {
        Self::parse(value)
    }
}

impl From<TicketId> for String {
    fn from(id: TicketId) -> Self {
        id.0
    }
}

impl fmt::Debug for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TicketId({self})")
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A version label within a ticket.
///
/// Allocated versions are always canonical (`v<N>`, N >= 1). Feedback may
/// reference any other label that is a safe key segment. Canonical labels
/// sort by their number, so `v2` comes before `v10`; other labels sort after
/// every canonical one, lexically.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VersionId(String);

impl VersionId {
    /// Parse a version label.
    pub fn parse(label: impl Into<String>) -> crate::Result<Self> {
        let label = label.into();
        if label.is_empty() {
            return Err(crate::Error::InvalidVersion(
                "version cannot be empty".to_string(),
            ));
        }
        if label.len() > crate::MAX_VERSION_LEN {
            return Err(crate::Error::InvalidVersion(format!(
                "version must be at most {} chars, got {}",
                crate::MAX_VERSION_LEN,
                label.len()
            )));
        }
        if label.starts_with('.') {
            return Err(crate::Error::InvalidVersion(format!(
                "version cannot start with '.': {label}"
            )));
        }
        for c in label.chars() {
            if !matches!(c, 'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' | '.') {
                return Err(crate::Error::InvalidVersion(format!(
                    "invalid character in version: {c:?}"
                )));
            }
        }
        Ok(Self(label))
    }

    /// Build the canonical label for an allocated version number.
    pub fn from_ordinal(ordinal: u64) -> crate::Result<Self> {
        if ordinal == 0 {
            return Err(crate::Error::InvalidVersion(
                "version numbers start at 1".to_string(),
            ));
        }
        Ok(Self(format!("v{ordinal}")))
    }

    /// The version number if this label is canonical (`v<N>`).
    pub fn ordinal(&self) -> Option<u64> {
        let digits = self.0.strip_prefix('v')?;
        if digits.is_empty()
            || digits.starts_with('0')
            || !digits.bytes().all(|b| b.is_ascii_digit())
        {
            return None;
        }
        digits.parse().ok()
    }

    /// Get the label string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Ord for VersionId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.ordinal(), other.ordinal()) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for VersionId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl TryFrom<String> for VersionId {
    type Error = crate::Error;

    fn try_from(value: String) -> crate::Result<Self> {
        Self::parse(value)
    }
}

impl From<VersionId> for String {
    fn from(version: VersionId) -> Self {
        version.0
    }
}

impl fmt::Debug for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VersionId({self})")
    }
}

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Original name of an uploaded file.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FileName(String);

impl FileName {
    /// Parse an attachment file name.
    pub fn parse(name: impl Into<String>) -> crate::Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(crate::Error::InvalidFileName(
                "file name cannot be empty".to_string(),
            ));
        }
        if name.len() > crate::MAX_FILE_NAME_LEN {
            return Err(crate::Error::InvalidFileName(format!(
                "file name must be at most {} bytes, got {}",
                crate::MAX_FILE_NAME_LEN,
                name.len()
            )));
        }
        if name.starts_with('.') {
            return Err(crate::Error::InvalidFileName(format!(
                "file name cannot start with '.': {name}"
            )));
        }
        if let Some(c) = name
            .chars()
            .find(|c| matches!(c, '/' | '\\') || c.is_control())
        {
            return Err(crate::Error::InvalidFileName(format!(
                "invalid character in file name: {c:?}"
            )));
        }
        Ok(Self(name))
    }

    /// Get the name string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for FileName {
    type Error = crate::Error;

    fn try_from(value: String) -> crate::Result<Self> {
        Self::parse(value)
    }
}

impl From<FileName> for String {
    fn from(name: FileName) -> Self {
        name.0
    }
}

impl fmt::Debug for FileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FileName({self})")
    }
}

impl fmt::Display for FileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticket_id_accepts_numbers_and_slugs() {
        assert!(TicketId::parse("1").is_ok());
        assert!(TicketId::parse("T1").is_ok());
        assert!(TicketId::parse("design-review_2").is_ok());
        assert_eq!(TicketId::from(42).as_str(), "42");
    }

    #[test]
    fn ticket_id_rejects_path_like_values() {
        assert!(TicketId::parse("").is_err());
        assert!(TicketId::parse("..").is_err());
        assert!(TicketId::parse("a/b").is_err());
        assert!(TicketId::parse("a.b").is_err());
        assert!(TicketId::parse("x".repeat(129)).is_err());
    }

    #[test]
    fn version_ordinal_only_for_canonical_labels() {
        assert_eq!(VersionId::parse("v1").unwrap().ordinal(), Some(1));
        assert_eq!(VersionId::parse("v10").unwrap().ordinal(), Some(10));
        assert_eq!(VersionId::parse("v0").unwrap().ordinal(), None);
        assert_eq!(VersionId::parse("v01").unwrap().ordinal(), None);
        assert_eq!(VersionId::parse("v").unwrap().ordinal(), None);
        assert_eq!(VersionId::parse("final").unwrap().ordinal(), None);
        assert_eq!(VersionId::parse("v2b").unwrap().ordinal(), None);
    }

    #[test]
    fn version_rejects_unsafe_labels() {
        assert!(VersionId::parse("").is_err());
        assert!(VersionId::parse(".hidden").is_err());
        assert!(VersionId::parse("..").is_err());
        assert!(VersionId::parse("v1/../v2").is_err());
        assert!(VersionId::parse("v 1").is_err());
    }

    #[test]
    fn version_from_ordinal_round_trips() {
        let version = VersionId::from_ordinal(7).unwrap();
        assert_eq!(version.as_str(), "v7");
        assert_eq!(version.ordinal(), Some(7));
        assert!(VersionId::from_ordinal(0).is_err());
    }

    #[test]
    fn versions_sort_numerically_then_lexically() {
        let mut versions: Vec<VersionId> = ["v10", "draft", "v2", "v1", "alpha"]
            .into_iter()
            .map(|v| VersionId::parse(v).unwrap())
            .collect();
        versions.sort();
        let labels: Vec<&str> = versions.iter().map(VersionId::as_str).collect();
        assert_eq!(labels, vec!["v1", "v2", "v10", "alpha", "draft"]);
    }

    #[test]
    fn file_name_rules() {
        assert!(FileName::parse("a.png").is_ok());
        assert!(FileName::parse("mock up (final).pdf").is_ok());
        assert!(FileName::parse("").is_err());
        assert!(FileName::parse(".env").is_err());
        assert!(FileName::parse("../a.png").is_err());
        assert!(FileName::parse("dir/a.png").is_err());
        assert!(FileName::parse("dir\\a.png").is_err());
        assert!(FileName::parse("a\0b").is_err());
    }

    #[test]
    fn deserialize_validates() {
        let ok: VersionId = serde_json::from_str("\"v3\"").unwrap();
        assert_eq!(ok.ordinal(), Some(3));
        assert!(serde_json::from_str::<VersionId>("\"../v3\"").is_err());
        assert!(serde_json::from_str::<TicketId>("\"\"").is_err());
    }
}
