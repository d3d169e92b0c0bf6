//! Route configuration.

use crate::handlers;
use crate::state::AppState;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, patch, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/v1/health", get(handlers::health_check))
        .route("/v1/members", get(handlers::list_members))
        // Ticket lifecycle (volatile registry)
        .route(
            "/v1/tickets",
            post(handlers::create_ticket).get(handlers::list_tickets),
        )
        .route("/v1/tickets/{id}", delete(handlers::delete_ticket))
        .route("/v1/tickets/{id}/close", patch(handlers::close_ticket))
        // Versioned attachments and feedback
        .route("/v1/tickets/{id}/upload", post(handlers::upload_file))
        .route("/v1/tickets/{id}/files", get(handlers::list_files))
        .route("/v1/tickets/{id}/versions", get(handlers::list_versions))
        .route(
            "/v1/tickets/{id}/versions/{version}",
            delete(handlers::delete_version),
        )
        .route("/v1/tickets/{id}/feedback", post(handlers::submit_feedback))
        .route("/v1/tickets/{id}/feedbacks", get(handlers::list_feedback));

    let file_routes = Router::new().route(
        "/uploads/{ticket}/{version}/{filename}",
        get(handlers::get_file),
    );

    let mut router = Router::new()
        .merge(api_routes)
        .merge(file_routes)
        .layer(DefaultBodyLimit::max(state.config.server.max_upload_bytes));

    if state.config.server.cors {
        router = router.layer(CorsLayer::permissive());
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}
