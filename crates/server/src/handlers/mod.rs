//! HTTP request handlers.

pub mod attachments;
pub mod feedback;
pub mod files;
pub mod health;
pub mod tickets;

pub use attachments::*;
pub use feedback::*;
pub use files::*;
pub use health::*;
pub use tickets::*;
