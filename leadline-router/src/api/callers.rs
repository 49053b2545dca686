//! Caller administration endpoints
//!
//! Create/edit/list/delete callers. This surface never mutates
//! `todayAssignedCount` or `lastAssignedAt`; those belong to the
//! reconciler and the assignment transaction.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use leadline_common::api::ApiResponse;
use leadline_common::models::{Caller, CallerInput};
use leadline_common::Error;
use tracing::info;
use uuid::Uuid;

use crate::AppState;

/// GET /api/callers
pub async fn list_callers(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Caller>>>, CallerApiError> {
    let callers = state.registry.list().await?;
    Ok(Json(ApiResponse::ok_list(callers)))
}

/// POST /api/callers
pub async fn create_caller(
    State(state): State<AppState>,
    Json(input): Json<CallerInput>,
) -> Result<(StatusCode, Json<ApiResponse<Caller>>), CallerApiError> {
    let caller = state.registry.create(&input).await?;
    info!("Created caller '{}' ({})", caller.name, caller.id);
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(caller))))
}

/// PUT /api/callers/:id
pub async fn update_caller(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<CallerInput>,
) -> Result<Json<ApiResponse<Caller>>, CallerApiError> {
    let caller = state.registry.update(id, &input).await?;
    Ok(Json(ApiResponse::ok(caller)))
}

/// DELETE /api/callers/:id
pub async fn delete_caller(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, CallerApiError> {
    state.registry.delete(id).await?;
    info!("Deleted caller {}", id);
    Ok(Json(ApiResponse {
        success: true,
        data: None,
        count: None,
        message: None,
    }))
}

/// Caller API errors
#[derive(Debug)]
pub struct CallerApiError(Error);

impl From<Error> for CallerApiError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for CallerApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(ApiResponse::<()>::error(self.0.to_string()));
        (status, body).into_response()
    }
}
