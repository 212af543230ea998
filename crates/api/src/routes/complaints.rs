//! Route definitions for the `/complaints` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{complaints, feedback};
use crate::state::AppState;

/// Routes mounted at `/complaints`. All require authentication.
///
/// ```text
/// GET    /                   -> list_complaints (?status, owner_id, assigned_staff_id, limit, offset)
/// POST   /                   -> create_complaint
/// GET    /summary            -> status_summary
/// GET    /{id}               -> get_complaint
/// POST   /{id}/transitions   -> apply_transition
/// GET    /{id}/history       -> get_history
/// GET    /{id}/assignments   -> get_assignments
/// POST   /{id}/feedback      -> submit_feedback
/// GET    /{id}/feedback      -> get_feedback
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(complaints::list_complaints).post(complaints::create_complaint),
        )
        .route("/summary", get(complaints::status_summary))
        .route("/{id}", get(complaints::get_complaint))
        .route("/{id}/transitions", post(complaints::apply_transition))
        .route("/{id}/history", get(complaints::get_history))
        .route("/{id}/assignments", get(complaints::get_assignments))
        .route(
            "/{id}/feedback",
            get(feedback::get_feedback).post(feedback::submit_feedback),
        )
}
