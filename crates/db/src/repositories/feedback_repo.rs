//! Repository for the `complaint_feedback` table.

use hostelcare_core::complaint::ComplaintStatus;
use hostelcare_core::types::DbId;
use sqlx::PgPool;

use crate::models::feedback::{CreateFeedback, Feedback, FeedbackInsert};

/// Column list for `complaint_feedback` queries.
const COLUMNS: &str = "\
    id, complaint_id, student_id, overall, timeliness, effectiveness, \
    ease_of_use, comment, created_at, updated_at";

/// Provides create and read operations for feedback. There is no update or delete.
pub struct FeedbackRepo;

impl FeedbackRepo {
    /// Insert feedback if the complaint is currently resolved and has none yet.
    ///
    /// The complaint row is share-locked for the duration, so a concurrent
    /// reopen cannot slip in between the status check and the insert.
    pub async fn create_for_resolved(
        pool: &PgPool,
        input: &CreateFeedback,
    ) -> Result<FeedbackInsert, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let row: Option<(String,)> =
            sqlx::query_as("SELECT status FROM complaints WHERE id = $1 FOR SHARE")
                .bind(input.complaint_id)
                .fetch_optional(&mut *tx)
                .await?;

        let Some((status,)) = row else {
            return Ok(FeedbackInsert::ComplaintMissing);
        };
        let status =
            ComplaintStatus::parse(&status).map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
        if status != ComplaintStatus::Resolved {
            return Ok(FeedbackInsert::NotResolved(status));
        }

        let query = format!(
            "INSERT INTO complaint_feedback \
                (complaint_id, student_id, overall, timeliness, effectiveness, ease_of_use, comment) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT (complaint_id) DO NOTHING \
             RETURNING {COLUMNS}"
        );
        let created = sqlx::query_as::<_, Feedback>(&query)
            .bind(input.complaint_id)
            .bind(input.student_id)
            .bind(input.overall)
            .bind(input.timeliness)
            .bind(input.effectiveness)
            .bind(input.ease_of_use)
            .bind(&input.comment)
            .fetch_optional(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(match created {
            Some(feedback) => FeedbackInsert::Created(feedback),
            None => FeedbackInsert::AlreadySubmitted,
        })
    }

    /// Find the feedback for a complaint.
    pub async fn find_by_complaint(
        pool: &PgPool,
        complaint_id: DbId,
    ) -> Result<Option<Feedback>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM complaint_feedback WHERE complaint_id = $1");
        sqlx::query_as::<_, Feedback>(&query)
            .bind(complaint_id)
            .fetch_optional(pool)
            .await
    }
}
