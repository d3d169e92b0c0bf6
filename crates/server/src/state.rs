//! Application state shared across handlers.

use crate::tickets::TicketRegistry;
use docket_core::config::AppConfig;
use docket_storage::ObjectStore;
use docket_versions::VersionedAttachmentService;
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Storage backend.
    pub storage: Arc<dyn ObjectStore>,
    /// Versioned attachments and feedback.
    pub versions: Arc<VersionedAttachmentService>,
    /// Volatile ticket list.
    pub tickets: Arc<TicketRegistry>,
}

impl AppState {
    /// Create a new application state over an initialized store.
    pub fn new(config: AppConfig, storage: Arc<dyn ObjectStore>) -> Self {
        let versions = Arc::new(VersionedAttachmentService::new(storage.clone()));
        Self {
            config: Arc::new(config),
            storage,
            versions,
            tickets: Arc::new(TicketRegistry::new()),
        }
    }
}
