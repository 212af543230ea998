//! Repository for the append-only `complaint_status_logs` table.
//!
//! Rows are only ever inserted, by [`ComplaintRepo`](super::ComplaintRepo),
//! inside the transaction that changes the complaint.

use hostelcare_core::types::DbId;
use sqlx::PgPool;

use crate::models::status_log::StatusLogEntry;

/// Column list for `complaint_status_logs` queries.
pub(crate) const LOG_COLUMNS: &str = "id, complaint_id, status, comment, actor_id, created_at";

/// Read access to complaint history.
pub struct StatusLogRepo;

impl StatusLogRepo {
    /// All entries for a complaint, oldest first.
    pub async fn list_for_complaint(
        pool: &PgPool,
        complaint_id: DbId,
    ) -> Result<Vec<StatusLogEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {LOG_COLUMNS} FROM complaint_status_logs \
             WHERE complaint_id = $1 \
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, StatusLogEntry>(&query)
            .bind(complaint_id)
            .fetch_all(pool)
            .await
    }

    /// The most recent entry for a complaint, if any.
    pub async fn latest_for_complaint(
        pool: &PgPool,
        complaint_id: DbId,
    ) -> Result<Option<StatusLogEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {LOG_COLUMNS} FROM complaint_status_logs \
             WHERE complaint_id = $1 \
             ORDER BY created_at DESC, id DESC \
             LIMIT 1"
        );
        sqlx::query_as::<_, StatusLogEntry>(&query)
            .bind(complaint_id)
            .fetch_optional(pool)
            .await
    }
}
