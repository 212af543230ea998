//! Complaint creation, transitions and role-scoped reads.

use hostelcare_core::complaint::{validate_attachments, ComplaintStatus};
use hostelcare_core::error::CoreError;
use hostelcare_core::lifecycle::{
    plan_transition, Actor, ComplaintSnapshot, TransitionInput, TransitionKind,
};
use hostelcare_core::roles::ActorRole;
use hostelcare_core::search::{clamp_limit, clamp_offset};
use hostelcare_core::types::DbId;
use hostelcare_db::models::assignment::{ComplaintAssignment, NewAssignment};
use hostelcare_db::models::complaint::{
    AppliedTransition, Complaint, ComplaintFilter, ComplaintListParams, CreateComplaint,
    InitialState, StatusChange,
};
use hostelcare_db::models::status_log::StatusLogEntry;
use hostelcare_db::repositories::{AssignmentRepo, ComplaintRepo, StatusLogRepo, UserRepo};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use validator::Validate;

use super::can_view;
use crate::error::{AppError, AppResult};

const DEFAULT_LIST_LIMIT: i64 = 50;
const MAX_LIST_LIMIT: i64 = 200;

/// Body of `POST /complaints/{id}/transitions`.
///
/// Statuses arrive as text so an unknown literal is reported as a field
/// validation failure rather than a body parse error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransitionRequest {
    pub status: String,
    pub comment: Option<String>,
    pub staff_in_charge: Option<DbId>,
    pub actions_to_be_taken: Option<String>,
    /// The status the caller last saw. A mismatch fails before any write.
    pub expected_status: Option<String>,
}

/// Per-status complaint counts within the caller's scope.
#[derive(Debug, Clone, Serialize)]
pub struct StatusSummary {
    pub new: i64,
    pub pending: i64,
    pub in_progress: i64,
    pub resolved: i64,
    pub total: i64,
}

fn parse_status(field: &str, value: &str) -> Result<ComplaintStatus, CoreError> {
    ComplaintStatus::parse(value).map_err(|e| match e {
        CoreError::Validation(msg) => CoreError::validation_failed(field, msg),
        other => other,
    })
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Complaint",
        id,
    })
}

/// `staff_id` must reference an active user holding the `staff` role.
async fn ensure_assignable_staff(pool: &PgPool, staff_id: DbId) -> AppResult<()> {
    let invalid = || {
        AppError::Core(CoreError::validation_failed(
            "staff_in_charge",
            format!("User {staff_id} is not an active staff member"),
        ))
    };

    match UserRepo::find_by_id(pool, staff_id).await? {
        Some(user) if user.is_assignable_staff() => Ok(()),
        _ => Err(invalid()),
    }
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// Create a complaint owned by `actor`.
///
/// Students and admins may submit. The starting state is explicit: `new`
/// unless `initial_status` is `pending`, which is treated as the assign edge
/// and so requires an admin and a `staff_in_charge`.
pub async fn create_complaint(
    pool: &PgPool,
    actor: &Actor,
    input: &CreateComplaint,
) -> AppResult<Complaint> {
    if actor.role == ActorRole::Staff {
        return Err(AppError::Core(CoreError::Forbidden(
            "Staff members cannot submit complaints".into(),
        )));
    }

    input.validate().map_err(CoreError::from)?;
    validate_attachments(&input.attachments)?;

    let initial_status = input
        .initial_status
        .as_deref()
        .map(|s| parse_status("initial_status", s))
        .transpose()?
        .unwrap_or(ComplaintStatus::New);

    let initial = match initial_status {
        ComplaintStatus::New => {
            if input.staff_in_charge.is_some() {
                return Err(CoreError::validation_failed(
                    "staff_in_charge",
                    "Staff can only be set on a complaint created as pending",
                )
                .into());
            }
            if input.actions_to_be_taken.is_some() {
                return Err(CoreError::validation_failed(
                    "actions_to_be_taken",
                    "Actions to be taken can only be set on a complaint created as pending",
                )
                .into());
            }
            InitialState::New
        }
        ComplaintStatus::Pending => {
            let snapshot = ComplaintSnapshot {
                status: ComplaintStatus::New,
                staff_in_charge: None,
            };
            let transition_input = TransitionInput {
                comment: None,
                staff_in_charge: input.staff_in_charge,
                actions_to_be_taken: input.actions_to_be_taken.as_deref(),
            };
            plan_transition(actor, &snapshot, ComplaintStatus::Pending, &transition_input)?;

            let staff_id = input.staff_in_charge.ok_or_else(|| {
                CoreError::validation_failed("staff_in_charge", "A staff member is required")
            })?;
            ensure_assignable_staff(pool, staff_id).await?;

            InitialState::Assigned(NewAssignment {
                staff_id,
                assigned_by: actor.id,
                actions_to_be_taken: input.actions_to_be_taken.clone(),
            })
        }
        other => {
            return Err(CoreError::validation_failed(
                "initial_status",
                format!("A complaint cannot be created as '{other}'"),
            )
            .into());
        }
    };

    let complaint = ComplaintRepo::create(pool, actor.id, input, &initial).await?;

    tracing::info!(
        complaint_id = complaint.id,
        owner_id = complaint.owner_id,
        status = %complaint.status,
        staff_in_charge = ?complaint.staff_in_charge,
        "Complaint created",
    );

    Ok(complaint)
}

/// Move a complaint to `request.status`.
///
/// The current record is read, the edge is validated for `actor`, then the
/// write is conditional on the version and status that were read. A
/// concurrent writer that got there first makes this call fail with
/// [`CoreError::ConcurrentModification`]; nothing is retried.
pub async fn apply_transition(
    pool: &PgPool,
    actor: &Actor,
    complaint_id: DbId,
    request: &TransitionRequest,
) -> AppResult<AppliedTransition> {
    let to = parse_status("status", &request.status)?;
    let expected = request
        .expected_status
        .as_deref()
        .map(|s| parse_status("expected_status", s))
        .transpose()?;

    let complaint = ComplaintRepo::find_by_id(pool, complaint_id)
        .await?
        .ok_or_else(|| not_found(complaint_id))?;
    let from = complaint.status;

    if let Some(expected) = expected {
        if expected != from {
            return Err(CoreError::ConcurrentModification {
                complaint_id,
                expected,
            }
            .into());
        }
    }

    let snapshot = ComplaintSnapshot {
        status: from,
        staff_in_charge: complaint.staff_in_charge,
    };
    let input = TransitionInput {
        comment: request.comment.as_deref(),
        staff_in_charge: request.staff_in_charge,
        actions_to_be_taken: request.actions_to_be_taken.as_deref(),
    };
    let kind = plan_transition(actor, &snapshot, to, &input)?;

    let assignment = match (kind, request.staff_in_charge) {
        (TransitionKind::Assign, Some(staff_id)) => {
            ensure_assignable_staff(pool, staff_id).await?;
            Some(NewAssignment {
                staff_id,
                assigned_by: actor.id,
                actions_to_be_taken: request.actions_to_be_taken.clone(),
            })
        }
        _ => None,
    };

    let change = StatusChange {
        complaint_id,
        expected_version: complaint.version,
        expected_status: from,
        to,
        actor_id: actor.id,
        comment: request.comment.clone(),
        assignment,
    };

    let applied = ComplaintRepo::apply_transition(pool, &change)
        .await?
        .ok_or(CoreError::ConcurrentModification {
            complaint_id,
            expected: from,
        })?;

    tracing::info!(
        complaint_id,
        from = %from,
        to = %to,
        kind = ?kind,
        actor_id = actor.id,
        role = %actor.role,
        log_entry_id = applied.log_entry.id,
        "Complaint transition applied",
    );

    Ok(applied)
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// Build the effective filter for `actor`.
///
/// Students are pinned to their own complaints and staff to their
/// assignments; asking for someone else's is forbidden. Admins filter freely.
fn scoped_filter(actor: &Actor, params: &ComplaintListParams) -> AppResult<ComplaintFilter> {
    let status = params
        .status
        .as_deref()
        .map(|s| parse_status("status", s))
        .transpose()?;

    let mut filter = ComplaintFilter {
        status,
        owner_id: params.owner_id,
        assigned_staff_id: params.assigned_staff_id,
    };

    match actor.role {
        ActorRole::Admin => {}
        ActorRole::Student => {
            if params.owner_id.is_some_and(|id| id != actor.id) {
                return Err(CoreError::Forbidden(
                    "Students can only list their own complaints".into(),
                )
                .into());
            }
            filter.owner_id = Some(actor.id);
        }
        ActorRole::Staff => {
            if params.assigned_staff_id.is_some_and(|id| id != actor.id) {
                return Err(CoreError::Forbidden(
                    "Staff can only list complaints assigned to them".into(),
                )
                .into());
            }
            filter.assigned_staff_id = Some(actor.id);
        }
    }

    Ok(filter)
}

/// List complaints matching every given filter, newest first, within the
/// actor's scope.
pub async fn list_complaints(
    pool: &PgPool,
    actor: &Actor,
    params: &ComplaintListParams,
) -> AppResult<Vec<Complaint>> {
    let filter = scoped_filter(actor, params)?;
    let limit = clamp_limit(params.limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT);
    let offset = clamp_offset(params.offset);

    let complaints = ComplaintRepo::list_filtered(pool, &filter, limit, offset).await?;
    Ok(complaints)
}

/// Fetch one complaint the actor is allowed to see.
pub async fn get_complaint(pool: &PgPool, actor: &Actor, id: DbId) -> AppResult<Complaint> {
    let complaint = ComplaintRepo::find_by_id(pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    if !can_view(actor, &complaint) {
        return Err(CoreError::Forbidden(format!("You do not have access to complaint {id}")).into());
    }
    Ok(complaint)
}

/// The complaint's status history, oldest first.
pub async fn get_history(
    pool: &PgPool,
    actor: &Actor,
    complaint_id: DbId,
) -> AppResult<Vec<StatusLogEntry>> {
    get_complaint(pool, actor, complaint_id).await?;
    let entries = StatusLogRepo::list_for_complaint(pool, complaint_id).await?;
    Ok(entries)
}

/// Staff assignment records for a complaint, oldest first.
pub async fn get_assignments(
    pool: &PgPool,
    actor: &Actor,
    complaint_id: DbId,
) -> AppResult<Vec<ComplaintAssignment>> {
    get_complaint(pool, actor, complaint_id).await?;
    let assignments = AssignmentRepo::list_for_complaint(pool, complaint_id).await?;
    Ok(assignments)
}

/// Count complaints per status within the actor's scope. Every status is
/// present, with zero where nothing matches.
pub async fn status_summary(pool: &PgPool, actor: &Actor) -> AppResult<StatusSummary> {
    let params = ComplaintListParams {
        status: None,
        owner_id: None,
        assigned_staff_id: None,
        limit: None,
        offset: None,
    };
    let filter = scoped_filter(actor, &params)?;
    let counts = ComplaintRepo::count_by_status(pool, &filter).await?;

    let mut summary = StatusSummary {
        new: 0,
        pending: 0,
        in_progress: 0,
        resolved: 0,
        total: 0,
    };
    for row in counts {
        let slot = match row.status {
            ComplaintStatus::New => &mut summary.new,
            ComplaintStatus::Pending => &mut summary.pending,
            ComplaintStatus::InProgress => &mut summary.in_progress,
            ComplaintStatus::Resolved => &mut summary.resolved,
        };
        *slot = row.count;
        summary.total += row.count;
    }
    Ok(summary)
}
