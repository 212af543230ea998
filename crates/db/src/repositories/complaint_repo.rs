//! Repository for the `complaints` table.
//!
//! Status changes never go through a plain `UPDATE`: [`ComplaintRepo::apply_transition`]
//! guards the write on the version and status the caller read, and appends
//! the matching `complaint_status_logs` row in the same transaction.

use hostelcare_core::types::DbId;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::assignment::{ComplaintAssignment, NewAssignment};
use crate::models::complaint::{
    AppliedTransition, Complaint, ComplaintFilter, CreateComplaint, InitialState, StatusChange,
    StatusCount,
};
use crate::models::status_log::StatusLogEntry;
use crate::repositories::assignment_repo::ASSIGNMENT_COLUMNS;
use crate::repositories::status_log_repo::LOG_COLUMNS;

/// Column list for `complaints` queries.
const COLUMNS: &str = "\
    id, owner_id, title, category, sub_category, description, hostel, \
    room_number, attachments, status, staff_in_charge, version, \
    created_at, updated_at";

/// Provides persistence for complaint records.
pub struct ComplaintRepo;

impl ComplaintRepo {
    /// Insert a new complaint in the given initial state.
    ///
    /// For [`InitialState::Assigned`] the assignment row and a `pending`
    /// log entry are written in the same transaction.
    pub async fn create(
        pool: &PgPool,
        owner_id: DbId,
        input: &CreateComplaint,
        initial: &InitialState,
    ) -> Result<Complaint, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let staff_in_charge = match initial {
            InitialState::New => None,
            InitialState::Assigned(a) => Some(a.staff_id),
        };

        let query = format!(
            "INSERT INTO complaints \
                (owner_id, title, category, sub_category, description, hostel, \
                 room_number, attachments, status, staff_in_charge) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {COLUMNS}"
        );
        let complaint = sqlx::query_as::<_, Complaint>(&query)
            .bind(owner_id)
            .bind(input.title.trim())
            .bind(input.category.trim())
            .bind(input.sub_category.as_deref().map(str::trim))
            .bind(&input.description)
            .bind(input.hostel.trim())
            .bind(input.room_number.trim())
            .bind(Json(&input.attachments))
            .bind(initial.status().as_str())
            .bind(staff_in_charge)
            .fetch_one(&mut *tx)
            .await?;

        if let InitialState::Assigned(assignment) = initial {
            insert_log_entry(&mut tx, &complaint, assignment.assigned_by, None).await?;
            insert_assignment(&mut tx, complaint.id, assignment).await?;
        }

        tx.commit().await?;
        Ok(complaint)
    }

    /// Find a complaint by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Complaint>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM complaints WHERE id = $1");
        sqlx::query_as::<_, Complaint>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List complaints matching every filter that is set.
    ///
    /// Results are ordered newest-first, ties broken by descending ID.
    pub async fn list_filtered(
        pool: &PgPool,
        filter: &ComplaintFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Complaint>, sqlx::Error> {
        let (where_clause, param_idx) = build_where(filter);

        let query = format!(
            "SELECT {COLUMNS} FROM complaints {where_clause} \
             ORDER BY created_at DESC, id DESC \
             LIMIT ${param_idx} OFFSET ${}",
            param_idx + 1
        );

        let mut q = sqlx::query_as::<_, Complaint>(&query);

        if let Some(s) = filter.status {
            q = q.bind(s.as_str());
        }
        if let Some(owner) = filter.owner_id {
            q = q.bind(owner);
        }
        if let Some(staff) = filter.assigned_staff_id {
            q = q.bind(staff);
        }
        q = q.bind(limit).bind(offset);

        q.fetch_all(pool).await
    }

    /// Count complaints per status among those matching `filter`.
    ///
    /// Statuses with no complaints are absent from the result.
    pub async fn count_by_status(
        pool: &PgPool,
        filter: &ComplaintFilter,
    ) -> Result<Vec<StatusCount>, sqlx::Error> {
        let (where_clause, _) = build_where(filter);
        let query = format!(
            "SELECT status, COUNT(*) AS count FROM complaints {where_clause} \
             GROUP BY status ORDER BY status"
        );

        let mut q = sqlx::query_as::<_, StatusCount>(&query);
        if let Some(s) = filter.status {
            q = q.bind(s.as_str());
        }
        if let Some(owner) = filter.owner_id {
            q = q.bind(owner);
        }
        if let Some(staff) = filter.assigned_staff_id {
            q = q.bind(staff);
        }
        q.fetch_all(pool).await
    }

    /// Apply a validated status change.
    ///
    /// The update only matches while the row still carries
    /// `change.expected_version` and `change.expected_status`; concurrent
    /// writers block on the row lock and re-evaluate that predicate after
    /// the first commits. Returns `Ok(None)` when the predicate no longer
    /// holds (or the row is gone); nothing is written in that case.
    ///
    /// `updated_at` never moves backwards, so log entries for one complaint
    /// have non-decreasing `created_at` in insertion order.
    pub async fn apply_transition(
        pool: &PgPool,
        change: &StatusChange,
    ) -> Result<Option<AppliedTransition>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE complaints SET \
                status = $1, \
                staff_in_charge = COALESCE($2, staff_in_charge), \
                version = version + 1, \
                updated_at = GREATEST(clock_timestamp(), updated_at) \
             WHERE id = $3 AND version = $4 AND status = $5 \
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Complaint>(&query)
            .bind(change.to.as_str())
            .bind(change.assignment.as_ref().map(|a| a.staff_id))
            .bind(change.complaint_id)
            .bind(change.expected_version)
            .bind(change.expected_status.as_str())
            .fetch_optional(&mut *tx)
            .await?;

        let Some(complaint) = updated else {
            tracing::debug!(
                complaint_id = change.complaint_id,
                expected_version = change.expected_version,
                expected_status = %change.expected_status,
                "Transition precondition no longer holds",
            );
            tx.rollback().await?;
            return Ok(None);
        };

        let log_entry = insert_log_entry(
            &mut tx,
            &complaint,
            change.actor_id,
            change.comment.as_deref(),
        )
        .await?;

        let assignment = match &change.assignment {
            Some(a) => Some(insert_assignment(&mut tx, complaint.id, a).await?),
            None => None,
        };

        tx.commit().await?;

        Ok(Some(AppliedTransition {
            complaint,
            log_entry,
            assignment,
        }))
    }
}

/// Build the `WHERE` clause for a filter. Returns the clause and the next
/// free bind-parameter index.
fn build_where(filter: &ComplaintFilter) -> (String, usize) {
    let mut conditions: Vec<String> = Vec::new();
    let mut param_idx: usize = 1;

    if filter.status.is_some() {
        conditions.push(format!("status = ${param_idx}"));
        param_idx += 1;
    }
    if filter.owner_id.is_some() {
        conditions.push(format!("owner_id = ${param_idx}"));
        param_idx += 1;
    }
    if filter.assigned_staff_id.is_some() {
        conditions.push(format!("staff_in_charge = ${param_idx}"));
        param_idx += 1;
    }

    let clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };
    (clause, param_idx)
}

/// Append a history row mirroring the complaint's (already written) status,
/// stamped with its `updated_at`.
async fn insert_log_entry(
    tx: &mut Transaction<'_, Postgres>,
    complaint: &Complaint,
    actor_id: DbId,
    comment: Option<&str>,
) -> Result<StatusLogEntry, sqlx::Error> {
    let query = format!(
        "INSERT INTO complaint_status_logs (complaint_id, status, comment, actor_id, created_at) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING {LOG_COLUMNS}"
    );
    sqlx::query_as::<_, StatusLogEntry>(&query)
        .bind(complaint.id)
        .bind(complaint.status.as_str())
        .bind(comment.map(str::trim).filter(|c| !c.is_empty()))
        .bind(actor_id)
        .bind(complaint.updated_at)
        .fetch_one(&mut **tx)
        .await
}

async fn insert_assignment(
    tx: &mut Transaction<'_, Postgres>,
    complaint_id: DbId,
    assignment: &NewAssignment,
) -> Result<ComplaintAssignment, sqlx::Error> {
    let query = format!(
        "INSERT INTO complaint_assignments \
            (complaint_id, staff_id, assigned_by, actions_to_be_taken) \
         VALUES ($1, $2, $3, $4) \
         RETURNING {ASSIGNMENT_COLUMNS}"
    );
    sqlx::query_as::<_, ComplaintAssignment>(&query)
        .bind(complaint_id)
        .bind(assignment.staff_id)
        .bind(assignment.assigned_by)
        .bind(&assignment.actions_to_be_taken)
        .fetch_one(&mut **tx)
        .await
}
