//! Complaint feedback model and DTOs.

use hostelcare_core::complaint::ComplaintStatus;
use hostelcare_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from `complaint_feedback`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Feedback {
    pub id: DbId,
    pub complaint_id: DbId,
    pub student_id: DbId,
    pub overall: i16,
    pub timeliness: i16,
    pub effectiveness: i16,
    pub ease_of_use: i16,
    pub comment: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Request body for submitting feedback. Ratings are optional and wide here
/// so that a missing or out-of-range one is reported as a field validation
/// failure.
#[derive(Debug, Deserialize)]
pub struct SubmitFeedback {
    pub overall: Option<i64>,
    pub timeliness: Option<i64>,
    pub effectiveness: Option<i64>,
    pub ease_of_use: Option<i64>,
    pub comment: Option<String>,
}

/// Validated insert for [`FeedbackRepo::create_for_resolved`](crate::repositories::FeedbackRepo::create_for_resolved).
#[derive(Debug, Clone)]
pub struct CreateFeedback {
    pub complaint_id: DbId,
    pub student_id: DbId,
    pub overall: i16,
    pub timeliness: i16,
    pub effectiveness: i16,
    pub ease_of_use: i16,
    pub comment: Option<String>,
}

/// Outcome of a feedback insert.
#[derive(Debug)]
pub enum FeedbackInsert {
    Created(Feedback),
    ComplaintMissing,
    NotResolved(ComplaintStatus),
    AlreadySubmitted,
}
