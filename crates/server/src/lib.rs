//! HTTP API server for docket.
//!
//! This crate provides:
//! - Ticket lifecycle endpoints over a volatile in-memory registry
//! - Versioned file uploads and listings
//! - Feedback submission and listing per version
//! - Static serving of stored files

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod tickets;

pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
pub use tickets::{Ticket, TicketRegistry, TicketStatus};
