//! Upload, listing, and version deletion endpoints.
//!
//! These routes are keyed by the raw ticket id and do not consult the ticket
//! registry, since stored attachments survive restarts and the registry does
//! not.

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::Json;
use axum::extract::{Multipart, Path, State};
use docket_core::{FileName, TicketId, VersionId};
use docket_versions::{StoredVersion, UploadReceipt, VersionView};
use serde::Serialize;

/// Multipart field carrying the uploaded file.
pub const FILE_FIELD: &str = "file";

/// One entry of `GET /v1/tickets/{id}/files`.
#[derive(Debug, Serialize)]
pub struct VersionFiles {
    pub version: VersionId,
    pub files: Vec<FileName>,
}

impl From<StoredVersion> for VersionFiles {
    fn from(stored: StoredVersion) -> Self {
        Self {
            version: stored.version,
            files: stored.files,
        }
    }
}

/// Version deletion response.
#[derive(Debug, Serialize)]
pub struct DeleteVersionResponse {
    pub ticket_id: TicketId,
    pub version: VersionId,
    pub deleted: bool,
}

/// POST /v1/tickets/{id}/upload
///
/// Each request stores one file under a new version.
#[tracing::instrument(skip(state, multipart))]
pub async fn upload_file(
    State(state): State<AppState>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadReceipt>> {
    let ticket_id = TicketId::parse(id)?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("invalid multipart body: {e}")))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let name = field
            .file_name()
            .ok_or_else(|| ApiError::BadRequest("file field has no file name".to_string()))?;
        let name = FileName::parse(name)?;
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("failed to read file: {e}")))?;

        let receipt = state.versions.upload_file(&ticket_id, &name, data).await?;
        return Ok(Json(receipt));
    }

    Err(ApiError::BadRequest(format!(
        "missing multipart field: {FILE_FIELD}"
    )))
}

/// GET /v1/tickets/{id}/files
pub async fn list_files(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<VersionFiles>>> {
    let ticket_id = TicketId::parse(id)?;
    let stored = state.versions.list_files(&ticket_id).await?;
    Ok(Json(stored.into_iter().map(VersionFiles::from).collect()))
}

/// GET /v1/tickets/{id}/versions
pub async fn list_versions(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<VersionView>>> {
    let ticket_id = TicketId::parse(id)?;
    let views = state
        .versions
        .list_versions_with_feedback(&ticket_id)
        .await?;
    Ok(Json(views))
}

/// DELETE /v1/tickets/{id}/versions/{version}
///
/// Deleting a version that does not exist succeeds.
#[tracing::instrument(skip(state))]
pub async fn delete_version(
    State(state): State<AppState>,
    Path((id, version)): Path<(String, String)>,
) -> ApiResult<Json<DeleteVersionResponse>> {
    let ticket_id = TicketId::parse(id)?;
    let version = VersionId::parse(version)?;

    state.versions.delete_version(&ticket_id, &version).await?;

    Ok(Json(DeleteVersionResponse {
        ticket_id,
        version,
        deleted: true,
    }))
}
