//! Complaint entity model and DTOs.

use hostelcare_core::complaint::{not_blank, Attachment, ComplaintStatus};
use hostelcare_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use validator::Validate;

use super::assignment::{ComplaintAssignment, NewAssignment};
use super::status_log::StatusLogEntry;

/// A row from the `complaints` table.
///
/// `status`, `staff_in_charge`, `version` and `updated_at` change only
/// through [`ComplaintRepo::apply_transition`](crate::repositories::ComplaintRepo::apply_transition).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Complaint {
    pub id: DbId,
    pub owner_id: DbId,
    pub title: String,
    pub category: String,
    pub sub_category: Option<String>,
    pub description: String,
    pub hostel: String,
    pub room_number: String,
    pub attachments: Json<Vec<Attachment>>,
    #[sqlx(try_from = "String")]
    pub status: ComplaintStatus,
    pub staff_in_charge: Option<DbId>,
    /// Incremented on every applied transition; the optimistic-concurrency token.
    pub version: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for submitting a new complaint.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateComplaint {
    #[validate(length(min = 1, max = 200), custom(function = "not_blank"))]
    pub title: String,
    #[validate(length(min = 1, max = 100), custom(function = "not_blank"))]
    pub category: String,
    #[validate(length(max = 100))]
    pub sub_category: Option<String>,
    #[validate(length(min = 1, max = 10000), custom(function = "not_blank"))]
    pub description: String,
    #[validate(length(min = 1, max = 100), custom(function = "not_blank"))]
    pub hostel: String,
    #[validate(length(min = 1, max = 50), custom(function = "not_blank"))]
    pub room_number: String,
    #[serde(default)]
    #[validate(length(max = 10))]
    pub attachments: Vec<Attachment>,
    /// Status the complaint starts in. Absent means `new`. Kept as text so
    /// an unknown literal is reported against this field.
    pub initial_status: Option<String>,
    /// Required when `initial_status` is `pending`.
    pub staff_in_charge: Option<DbId>,
    pub actions_to_be_taken: Option<String>,
}

/// Explicit creation-time state passed to [`ComplaintRepo::create`](crate::repositories::ComplaintRepo::create).
#[derive(Debug, Clone)]
pub enum InitialState {
    New,
    /// Created already assigned; writes the assignment and a `pending` log entry.
    Assigned(NewAssignment),
}

impl InitialState {
    pub fn status(&self) -> ComplaintStatus {
        match self {
            InitialState::New => ComplaintStatus::New,
            InitialState::Assigned(_) => ComplaintStatus::Pending,
        }
    }
}

/// Query parameters for `GET /complaints`.
#[derive(Debug, Deserialize)]
pub struct ComplaintListParams {
    pub status: Option<String>,
    pub owner_id: Option<DbId>,
    pub assigned_staff_id: Option<DbId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Equality filters for listing; every `Some` field must match.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComplaintFilter {
    pub status: Option<ComplaintStatus>,
    pub owner_id: Option<DbId>,
    pub assigned_staff_id: Option<DbId>,
}

/// Number of complaints in one status.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StatusCount {
    #[sqlx(try_from = "String")]
    pub status: ComplaintStatus,
    pub count: i64,
}

/// A validated status change, guarded by the version and status the caller read.
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub complaint_id: DbId,
    pub expected_version: i32,
    pub expected_status: ComplaintStatus,
    pub to: ComplaintStatus,
    pub actor_id: DbId,
    pub comment: Option<String>,
    pub assignment: Option<NewAssignment>,
}

/// Everything written by one successful transition.
#[derive(Debug, Clone, Serialize)]
pub struct AppliedTransition {
    pub complaint: Complaint,
    pub log_entry: StatusLogEntry,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignment: Option<ComplaintAssignment>,
}
