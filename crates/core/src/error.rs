use crate::complaint::ComplaintStatus;
use crate::roles::ActorRole;
use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// A required field is missing or out of range.
    #[error("Validation failed for '{field}': {message}")]
    ValidationFailed { field: String, message: String },

    /// The requested status is not reachable from the current one.
    #[error("Cannot transition complaint from '{from}' to '{to}'")]
    InvalidTransition {
        from: ComplaintStatus,
        to: ComplaintStatus,
    },

    /// The actor's role may not perform this edge (or this complaint is not theirs to move).
    #[error("Role '{role}' is not permitted to move this complaint from '{from}' to '{to}'")]
    UnauthorizedActor {
        role: ActorRole,
        from: ComplaintStatus,
        to: ComplaintStatus,
    },

    /// The recorded status changed between read and write.
    #[error("Complaint {complaint_id} was modified concurrently (expected status '{expected}'); refresh and retry")]
    ConcurrentModification {
        complaint_id: DbId,
        expected: ComplaintStatus,
    },

    #[error("Complaint {complaint_id} is not resolved (current status '{status}')")]
    NotResolved {
        complaint_id: DbId,
        status: ComplaintStatus,
    },

    #[error("Feedback has already been submitted for complaint {complaint_id}")]
    AlreadySubmitted { complaint_id: DbId },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for a [`CoreError::ValidationFailed`] naming `field`.
    pub fn validation_failed(field: &str, message: impl Into<String>) -> Self {
        CoreError::ValidationFailed {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Reports the first failing field (alphabetically, so the result is stable).
impl From<validator::ValidationErrors> for CoreError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let field_errors = errors.field_errors();
        let mut fields: Vec<_> = field_errors.iter().collect();
        fields.sort_by(|a, b| a.0.cmp(b.0));

        match fields.first() {
            Some((field, errs)) => {
                let message = errs
                    .first()
                    .map(|e| match &e.message {
                        Some(m) => m.to_string(),
                        None => format!("{field} is invalid ({})", e.code),
                    })
                    .unwrap_or_else(|| format!("{field} is invalid"));
                CoreError::ValidationFailed {
                    field: field.to_string(),
                    message,
                }
            }
            None => CoreError::Validation(errors.to_string()),
        }
    }
}
