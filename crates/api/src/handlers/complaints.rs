//! Handlers for the `/complaints` resource.
//!
//! Every handler resolves the bearer token into an explicit actor and hands
//! it to [`engine::lifecycle`]; role and ownership rules live there.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use hostelcare_core::types::DbId;
use hostelcare_db::models::complaint::{
    AppliedTransition, Complaint, ComplaintListParams, CreateComplaint,
};
use hostelcare_db::models::assignment::ComplaintAssignment;
use hostelcare_db::models::status_log::StatusLogEntry;

use crate::engine::lifecycle::{self, StatusSummary, TransitionRequest};
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ----- POST /complaints -----

pub async fn create_complaint(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreateComplaint>,
) -> AppResult<(StatusCode, Json<DataResponse<Complaint>>)> {
    let complaint = lifecycle::create_complaint(&state.pool, &auth.actor(), &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: complaint })))
}

// ----- GET /complaints -----

pub async fn list_complaints(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<ComplaintListParams>,
) -> AppResult<Json<DataResponse<Vec<Complaint>>>> {
    let complaints = lifecycle::list_complaints(&state.pool, &auth.actor(), &params).await?;
    Ok(Json(DataResponse { data: complaints }))
}

// ----- GET /complaints/summary -----

pub async fn status_summary(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<StatusSummary>>> {
    let summary = lifecycle::status_summary(&state.pool, &auth.actor()).await?;
    Ok(Json(DataResponse { data: summary }))
}

// ----- GET /complaints/{id} -----

pub async fn get_complaint(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Complaint>>> {
    let complaint = lifecycle::get_complaint(&state.pool, &auth.actor(), id).await?;
    Ok(Json(DataResponse { data: complaint }))
}

// ----- POST /complaints/{id}/transitions -----

pub async fn apply_transition(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(request): Json<TransitionRequest>,
) -> AppResult<Json<DataResponse<AppliedTransition>>> {
    let applied = lifecycle::apply_transition(&state.pool, &auth.actor(), id, &request).await?;
    Ok(Json(DataResponse { data: applied }))
}

// ----- GET /complaints/{id}/history -----

pub async fn get_history(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<StatusLogEntry>>>> {
    let entries = lifecycle::get_history(&state.pool, &auth.actor(), id).await?;
    Ok(Json(DataResponse { data: entries }))
}

// ----- GET /complaints/{id}/assignments -----

pub async fn get_assignments(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<ComplaintAssignment>>>> {
    let assignments = lifecycle::get_assignments(&state.pool, &auth.actor(), id).await?;
    Ok(Json(DataResponse { data: assignments }))
}
