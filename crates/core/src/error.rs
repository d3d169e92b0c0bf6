//! Error types for the core domain.

use thiserror::Error;

/// Core domain error type.
///
/// Every variant describes input that was rejected before anything was
/// written, so callers can map the whole enum to a client error.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid ticket id: {0}")]
    InvalidTicketId(String),

    #[error("invalid version: {0}")]
    InvalidVersion(String),

    #[error("invalid file name: {0}")]
    InvalidFileName(String),

    #[error("invalid feedback: {0}")]
    InvalidFeedback(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;
