//! Ticket lifecycle endpoints.

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::tickets::{NewTicket, Ticket};
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use bytes::Bytes;
use docket_core::{Member, assign_member, skill_for_title};
use serde::Deserialize;

/// Create ticket request.
#[derive(Debug, Deserialize)]
pub struct CreateTicketRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub deadline: Option<String>,
    /// Explicit assignee. Without one, a member is picked by skill.
    #[serde(default)]
    pub member_id: Option<u64>,
}

/// POST /v1/tickets
#[tracing::instrument(skip(state, body))]
pub async fn create_ticket(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<Ticket>)> {
    let req: CreateTicketRequest = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("invalid JSON: {e}")))?;

    let title = req.title.trim();
    if title.is_empty() {
        return Err(ApiError::BadRequest("title is required".to_string()));
    }

    let assigned_to = resolve_assignee(&state.config.members, title, req.member_id)?;

    let ticket = state
        .tickets
        .create(NewTicket {
            title: title.to_string(),
            description: req.description,
            deadline: req.deadline.filter(|d| !d.trim().is_empty()),
            assigned_to,
        })
        .await;

    tracing::info!(
        ticket_id = ticket.id,
        assignee = ticket.assigned_to.as_ref().map(|m| m.name.as_str()),
        "Ticket created"
    );
    Ok((StatusCode::CREATED, Json(ticket)))
}

fn resolve_assignee(
    roster: &[Member],
    title: &str,
    member_id: Option<u64>,
) -> ApiResult<Option<Member>> {
    match member_id {
        Some(id) => roster
            .iter()
            .find(|m| m.id == id)
            .cloned()
            .map(Some)
            .ok_or_else(|| ApiError::BadRequest(format!("unknown member: {id}"))),
        None => {
            let skill = skill_for_title(title);
            Ok(assign_member(roster, skill, &mut rand::thread_rng()).cloned())
        }
    }
}

/// GET /v1/tickets
pub async fn list_tickets(State(state): State<AppState>) -> Json<Vec<Ticket>> {
    Json(state.tickets.list().await)
}

/// PATCH /v1/tickets/{id}/close
pub async fn close_ticket(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Ticket>> {
    let id = parse_ticket_number(&id)?;
    let ticket = state
        .tickets
        .close(id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("ticket {id}")))?;
    Ok(Json(ticket))
}

/// DELETE /v1/tickets/{id}
///
/// Removes the ticket's attachments and feedback before dropping it from the
/// registry, so a failed cascade can be retried.
#[tracing::instrument(skip(state))]
pub async fn delete_ticket(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Ticket>> {
    let id = parse_ticket_number(&id)?;
    let ticket = state
        .tickets
        .get(id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("ticket {id}")))?;

    state.versions.delete_ticket(&ticket.storage_id()).await?;

    let removed = state
        .tickets
        .remove(id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("ticket {id}")))?;
    tracing::info!(ticket_id = id, "Ticket deleted");
    Ok(Json(removed))
}

fn parse_ticket_number(id: &str) -> ApiResult<u64> {
    id.parse()
        .map_err(|_| ApiError::BadRequest(format!("ticket id must be a number: {id}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use docket_core::default_roster;

    #[test]
    fn explicit_member_wins() {
        let roster = default_roster();
        let member = resolve_assignee(&roster, "Build API", Some(1)).unwrap().unwrap();
        assert_eq!(member.name, "Alice");
    }

    #[test]
    fn unknown_member_is_rejected() {
        assert!(matches!(
            resolve_assignee(&default_roster(), "x", Some(42)),
            Err(ApiError::BadRequest(_))
        ));
    }

    #[test]
    fn api_titles_go_to_backend() {
        let roster = default_roster();
        for _ in 0..20 {
            let member = resolve_assignee(&roster, "Fix the API", None).unwrap().unwrap();
            assert!(member.has_skill("backend"));
        }
    }

    #[test]
    fn no_candidate_leaves_ticket_unassigned() {
        let roster = vec![Member {
            id: 7,
            name: "Dana".to_string(),
            skills: vec!["database".to_string()],
        }];
        assert_eq!(resolve_assignee(&roster, "Landing page", None).unwrap(), None);
    }
}
