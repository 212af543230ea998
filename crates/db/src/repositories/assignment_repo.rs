//! Repository for the `complaint_assignments` table.

use hostelcare_core::types::DbId;
use sqlx::PgPool;

use crate::models::assignment::ComplaintAssignment;

/// Column list for `complaint_assignments` queries.
pub(crate) const ASSIGNMENT_COLUMNS: &str =
    "id, complaint_id, staff_id, assigned_by, actions_to_be_taken, created_at";

/// Read access to assignment records.
pub struct AssignmentRepo;

impl AssignmentRepo {
    /// Assignments for a complaint, oldest first.
    pub async fn list_for_complaint(
        pool: &PgPool,
        complaint_id: DbId,
    ) -> Result<Vec<ComplaintAssignment>, sqlx::Error> {
        let query = format!(
            "SELECT {ASSIGNMENT_COLUMNS} FROM complaint_assignments \
             WHERE complaint_id = $1 \
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, ComplaintAssignment>(&query)
            .bind(complaint_id)
            .fetch_all(pool)
            .await
    }
}
