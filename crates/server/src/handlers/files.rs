//! Stored file download.

use crate::error::ApiResult;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use axum::response::IntoResponse;
use docket_core::{FileName, TicketId, VersionId};

/// GET /uploads/{ticket}/{version}/{filename}
pub async fn get_file(
    State(state): State<AppState>,
    Path((ticket, version, filename)): Path<(String, String, String)>,
) -> ApiResult<impl IntoResponse> {
    let ticket_id = TicketId::parse(ticket)?;
    let version = VersionId::parse(version)?;
    let name = FileName::parse(filename)?;

    let data = state.versions.read_file(&ticket_id, &version, &name).await?;

    Ok((
        [
            (CONTENT_TYPE, content_type(name.as_str()).to_string()),
            (CONTENT_LENGTH, data.len().to_string()),
        ],
        data,
    ))
}

/// Content type from the file extension, for the types tickets usually carry.
fn content_type(name: &str) -> &'static str {
    let extension = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "pdf" => "application/pdf",
        "txt" | "md" | "log" => "text/plain; charset=utf-8",
        "json" => "application/json",
        "zip" => "application/zip",
        _ => "application/octet-stream",
    }
}
