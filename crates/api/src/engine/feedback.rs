//! Post-resolution feedback.

use hostelcare_core::error::CoreError;
use hostelcare_core::feedback::{ensure_resolved, validate_feedback, Ratings};
use hostelcare_core::lifecycle::Actor;
use hostelcare_core::types::DbId;
use hostelcare_db::models::feedback::{CreateFeedback, Feedback, FeedbackInsert, SubmitFeedback};
use hostelcare_db::repositories::FeedbackRepo;
use sqlx::PgPool;

use super::lifecycle::get_complaint;
use crate::error::AppResult;

/// Record the owner's feedback on a resolved complaint.
///
/// Fails with [`CoreError::NotResolved`] unless the complaint is resolved,
/// [`CoreError::ValidationFailed`] for a missing or out-of-range rating, and
/// [`CoreError::AlreadySubmitted`] on any second submission. The resolved
/// check is repeated under a row lock at insert time.
pub async fn submit_feedback(
    pool: &PgPool,
    actor: &Actor,
    complaint_id: DbId,
    input: &SubmitFeedback,
) -> AppResult<Feedback> {
    let complaint = get_complaint(pool, actor, complaint_id).await?;
    if complaint.owner_id != actor.id {
        return Err(CoreError::Forbidden(
            "Only the student who submitted the complaint can give feedback".into(),
        )
        .into());
    }

    ensure_resolved(complaint_id, complaint.status)?;

    let ratings = Ratings {
        overall: input.overall,
        timeliness: input.timeliness,
        effectiveness: input.effectiveness,
        ease_of_use: input.ease_of_use,
    };
    let comment = input
        .comment
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());
    let valid = validate_feedback(&ratings, comment)?;

    let insert = CreateFeedback {
        complaint_id,
        student_id: actor.id,
        overall: valid.overall,
        timeliness: valid.timeliness,
        effectiveness: valid.effectiveness,
        ease_of_use: valid.ease_of_use,
        comment: comment.map(str::to_string),
    };

    let feedback = match FeedbackRepo::create_for_resolved(pool, &insert).await? {
        FeedbackInsert::Created(feedback) => feedback,
        FeedbackInsert::ComplaintMissing => {
            return Err(CoreError::NotFound {
                entity: "Complaint",
                id: complaint_id,
            }
            .into())
        }
        FeedbackInsert::NotResolved(status) => {
            return Err(CoreError::NotResolved {
                complaint_id,
                status,
            }
            .into())
        }
        FeedbackInsert::AlreadySubmitted => {
            return Err(CoreError::AlreadySubmitted { complaint_id }.into())
        }
    };

    tracing::info!(
        complaint_id,
        feedback_id = feedback.id,
        student_id = actor.id,
        overall = feedback.overall,
        "Feedback submitted",
    );

    Ok(feedback)
}

/// The feedback left on a complaint, if any.
pub async fn get_feedback(
    pool: &PgPool,
    actor: &Actor,
    complaint_id: DbId,
) -> AppResult<Option<Feedback>> {
    get_complaint(pool, actor, complaint_id).await?;
    let feedback = FeedbackRepo::find_by_complaint(pool, complaint_id).await?;
    Ok(feedback)
}
