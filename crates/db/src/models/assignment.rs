//! Staff assignment records, written alongside the `new -> pending` transition.

use hostelcare_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from `complaint_assignments`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ComplaintAssignment {
    pub id: DbId,
    pub complaint_id: DbId,
    pub staff_id: DbId,
    pub assigned_by: DbId,
    pub actions_to_be_taken: Option<String>,
    pub created_at: Timestamp,
}

/// Assignment details carried by a transition or creation.
#[derive(Debug, Clone)]
pub struct NewAssignment {
    pub staff_id: DbId,
    pub assigned_by: DbId,
    pub actions_to_be_taken: Option<String>,
}
