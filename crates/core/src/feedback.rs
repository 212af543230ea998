//! Post-resolution feedback validation.
//!
//! A student rates a resolved complaint on four 1–5 scales and may leave a
//! comment. At most one feedback row exists per complaint.

use crate::complaint::ComplaintStatus;
use crate::error::CoreError;
use crate::types::DbId;

pub const MIN_RATING: i16 = 1;
pub const MAX_RATING: i16 = 5;

/// Maximum length for the optional feedback comment.
pub const MAX_FEEDBACK_COMMENT_LENGTH: usize = 5_000;

/// The four rating scales, as received from the client. Missing values are
/// `None`. Values are wide so that anything out of range reaches validation.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ratings {
    pub overall: Option<i64>,
    pub timeliness: Option<i64>,
    pub effectiveness: Option<i64>,
    pub ease_of_use: Option<i64>,
}

/// Ratings after validation, all within `MIN_RATING..=MAX_RATING`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidRatings {
    pub overall: i16,
    pub timeliness: i16,
    pub effectiveness: i16,
    pub ease_of_use: i16,
}

fn validate_rating(field: &str, value: Option<i64>) -> Result<i16, CoreError> {
    let v = value.ok_or_else(|| CoreError::validation_failed(field, "Rating is required"))?;
    i16::try_from(v)
        .ok()
        .filter(|r| (MIN_RATING..=MAX_RATING).contains(r))
        .ok_or_else(|| {
            CoreError::validation_failed(
                field,
                format!("Rating must be between {MIN_RATING} and {MAX_RATING} (got {v})"),
            )
        })
}

/// Validate that every rating is present and in range, and the comment fits.
pub fn validate_feedback(
    ratings: &Ratings,
    comment: Option<&str>,
) -> Result<ValidRatings, CoreError> {
    let valid = ValidRatings {
        overall: validate_rating("overall", ratings.overall)?,
        timeliness: validate_rating("timeliness", ratings.timeliness)?,
        effectiveness: validate_rating("effectiveness", ratings.effectiveness)?,
        ease_of_use: validate_rating("ease_of_use", ratings.ease_of_use)?,
    };

    if let Some(c) = comment {
        if c.chars().count() > MAX_FEEDBACK_COMMENT_LENGTH {
            return Err(CoreError::validation_failed(
                "comment",
                format!("Must not exceed {MAX_FEEDBACK_COMMENT_LENGTH} characters"),
            ));
        }
    }

    Ok(valid)
}

/// Feedback may only be given once the complaint is resolved.
pub fn ensure_resolved(complaint_id: DbId, status: ComplaintStatus) -> Result<(), CoreError> {
    if status == ComplaintStatus::Resolved {
        Ok(())
    } else {
        Err(CoreError::NotResolved {
            complaint_id,
            status,
        })
    }
}
