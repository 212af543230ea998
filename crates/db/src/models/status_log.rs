//! Status history model. Rows are append-only (no `updated_at`).

use hostelcare_core::complaint::ComplaintStatus;
use hostelcare_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from `complaint_status_logs`: the status a complaint moved to,
/// who moved it, and when.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StatusLogEntry {
    pub id: DbId,
    pub complaint_id: DbId,
    #[sqlx(try_from = "String")]
    pub status: ComplaintStatus,
    pub comment: Option<String>,
    pub actor_id: DbId,
    pub created_at: Timestamp,
}
