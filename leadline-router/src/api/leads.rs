//! Lead ingestion and status endpoints
//!
//! Ingestion invokes the assignment engine and broadcasts `lead-assigned`
//! on success. Status transitions never re-invoke the engine.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use leadline_common::api::ApiResponse;
use leadline_common::events::LeadEvent;
use leadline_common::models::{LeadInput, LeadStatus, LeadWithCaller};
use leadline_common::Error;
use serde::Deserialize;
use tracing::{error, info};
use uuid::Uuid;

use crate::assignment::AssignError;
use crate::AppState;

/// POST /api/leads
///
/// Ingest a new lead: run the assignment engine, persist the bound lead,
/// respond 201 with the caller reference resolved, and push the same
/// payload to live-update subscribers.
pub async fn ingest_lead(
    State(state): State<AppState>,
    Json(input): Json<LeadInput>,
) -> Result<(StatusCode, Json<ApiResponse<LeadWithCaller>>), LeadApiError> {
    let lead = state.engine.assign(&input).await?;

    info!(
        lead = %lead.lead.id,
        caller = ?lead.lead.assigned_caller_id,
        "lead '{}' assigned",
        lead.lead.name
    );
    state.events.broadcast(LeadEvent::assigned(lead.clone()));

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(lead))))
}

/// GET /api/leads
pub async fn list_leads(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<LeadWithCaller>>>, LeadApiError> {
    let leads = state.leads.list_with_callers().await?;
    Ok(Json(ApiResponse::ok_list(leads)))
}

/// GET /api/leads/active
pub async fn list_active_leads(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<LeadWithCaller>>>, LeadApiError> {
    let leads = state.leads.list_active().await?;
    Ok(Json(ApiResponse::ok_list(leads)))
}

/// PATCH /api/leads/:id/status request body
#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: LeadStatus,
}

/// PATCH /api/leads/:id/status
///
/// Emits `lead-status-changed`, plus `lead-completed` when the new status
/// is `completed`. Counter bookkeeping is untouched.
pub async fn update_lead_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<StatusUpdateRequest>,
) -> Result<Json<ApiResponse<LeadWithCaller>>, LeadApiError> {
    let lead = state.leads.update_status(id, body.status).await?;

    state
        .events
        .broadcast(LeadEvent::status_changed(id, body.status));
    if body.status == LeadStatus::Completed {
        state.events.broadcast(LeadEvent::completed(id));
    }

    Ok(Json(ApiResponse::ok(lead)))
}

/// DELETE /api/leads/:id
pub async fn delete_lead(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, LeadApiError> {
    state.leads.delete(id).await?;
    state.events.broadcast(LeadEvent::deleted(id));

    Ok(Json(ApiResponse {
        success: true,
        data: None,
        count: None,
        message: None,
    }))
}

/// Lead API errors
#[derive(Debug)]
pub enum LeadApiError {
    Assign(AssignError),
    Store(Error),
}

impl From<AssignError> for LeadApiError {
    fn from(e: AssignError) -> Self {
        Self::Assign(e)
    }
}

impl From<Error> for LeadApiError {
    fn from(e: Error) -> Self {
        Self::Store(e)
    }
}

impl IntoResponse for LeadApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            LeadApiError::Assign(AssignError::NoEligibleCaller) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "no eligible caller available for this lead".to_string(),
            ),
            LeadApiError::Assign(e @ AssignError::CapacityExceeded { .. }) => {
                (StatusCode::CONFLICT, e.to_string())
            }
            LeadApiError::Assign(AssignError::Validation(msg)) => (StatusCode::BAD_REQUEST, msg),
            LeadApiError::Assign(e @ AssignError::Persistence { .. }) => {
                error!("assignment persistence failure: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
            LeadApiError::Store(Error::NotFound(what)) => {
                (StatusCode::NOT_FOUND, format!("Not found: {}", what))
            }
            LeadApiError::Store(Error::InvalidInput(msg)) => (StatusCode::BAD_REQUEST, msg),
            LeadApiError::Store(e) => {
                error!("lead store failure: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        };

        let body = Json(ApiResponse::<()>::error(message));
        (status, body).into_response()
    }
}
