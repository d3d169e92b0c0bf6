//! Feedback endpoints.

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::Json;
use axum::extract::{Path, State};
use bytes::Bytes;
use docket_core::{FeedbackEntry, TicketId, VersionId};
use serde::{Deserialize, Serialize};

/// Submit feedback request.
#[derive(Debug, Deserialize)]
pub struct SubmitFeedbackRequest {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub feedback: String,
}

/// Submit feedback response.
#[derive(Debug, Serialize)]
pub struct SubmitFeedbackResponse {
    pub version: VersionId,
    pub entry: FeedbackEntry,
}

/// One entry of `GET /v1/tickets/{id}/feedbacks`.
#[derive(Debug, Serialize)]
pub struct VersionFeedback {
    pub version: VersionId,
    pub feedbacks: Vec<FeedbackEntry>,
}

/// POST /v1/tickets/{id}/feedback
///
/// The version does not need to have any stored files.
#[tracing::instrument(skip(state, body))]
pub async fn submit_feedback(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<SubmitFeedbackResponse>> {
    let ticket_id = TicketId::parse(id)?;
    let req: SubmitFeedbackRequest = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("invalid JSON: {e}")))?;

    if req.version.trim().is_empty() || req.feedback.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "version and feedback are required".to_string(),
        ));
    }
    let version = VersionId::parse(req.version.trim())?;

    let entry = state
        .versions
        .submit_feedback(&ticket_id, &version, &req.feedback)
        .await?;
    Ok(Json(SubmitFeedbackResponse { version, entry }))
}

/// GET /v1/tickets/{id}/feedbacks
pub async fn list_feedback(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<VersionFeedback>>> {
    let ticket_id = TicketId::parse(id)?;
    let records = state.versions.list_feedback(&ticket_id).await?;
    Ok(Json(
        records
            .into_iter()
            .map(|record| VersionFeedback {
                version: record.version,
                feedbacks: record.feedbacks,
            })
            .collect(),
    ))
}
