//! Handlers for `/complaints/{id}/feedback`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use hostelcare_core::types::DbId;
use hostelcare_db::models::feedback::{Feedback, SubmitFeedback};

use crate::engine::feedback;
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ----- POST /complaints/{id}/feedback -----

pub async fn submit_feedback(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(complaint_id): Path<DbId>,
    Json(input): Json<SubmitFeedback>,
) -> AppResult<(StatusCode, Json<DataResponse<Feedback>>)> {
    let created =
        feedback::submit_feedback(&state.pool, &auth.actor(), complaint_id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: created })))
}

// ----- GET /complaints/{id}/feedback -----

/// `data` is `null` until the owner has left feedback.
pub async fn get_feedback(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(complaint_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Option<Feedback>>>> {
    let found = feedback::get_feedback(&state.pool, &auth.actor(), complaint_id).await?;
    Ok(Json(DataResponse { data: found }))
}
