//! Complaint lifecycle state machine.
//!
//! Transition rules:
//! - `new`         -> `pending`      (admin assigns staff; `staff_in_charge` required)
//! - `pending`     -> `in_progress`  (assigned staff starts work)
//! - `in_progress` -> `resolved`     (assigned staff or admin; comment required)
//! - `resolved`    -> `in_progress`  (assigned staff or admin reopens)
//! - any status    -> same status    (save progress; comment required)
//!
//! Every check here is pure. The engine in the API crate reads the current
//! record, calls [`plan_transition`], then performs the conditional write.

use serde::Serialize;

use crate::complaint::ComplaintStatus;
use crate::error::CoreError;
use crate::roles::ActorRole;
use crate::types::DbId;

/// Maximum length of a transition comment.
pub const MAX_COMMENT_LENGTH: usize = 2_000;

/// Maximum length of the "actions to be taken" note recorded at assignment.
pub const MAX_ACTIONS_LENGTH: usize = 2_000;

/// The authenticated identity performing an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: DbId,
    pub role: ActorRole,
}

impl Actor {
    pub fn new(id: DbId, role: ActorRole) -> Self {
        Self { id, role }
    }
}

/// The parts of a complaint that gate a transition.
#[derive(Debug, Clone, Copy)]
pub struct ComplaintSnapshot {
    pub status: ComplaintStatus,
    pub staff_in_charge: Option<DbId>,
}

/// Caller-supplied fields accompanying a transition request.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransitionInput<'a> {
    pub comment: Option<&'a str>,
    pub staff_in_charge: Option<DbId>,
    pub actions_to_be_taken: Option<&'a str>,
}

/// The named edges of the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    Assign,
    StartWork,
    Resolve,
    Reopen,
    SaveProgress,
}

impl TransitionKind {
    /// Roles allowed to perform this edge.
    pub fn allowed_roles(self) -> &'static [ActorRole] {
        match self {
            Self::Assign => &[ActorRole::Admin],
            Self::StartWork => &[ActorRole::Staff],
            Self::Resolve | Self::Reopen | Self::SaveProgress => {
                &[ActorRole::Staff, ActorRole::Admin]
            }
        }
    }

    pub fn permits(self, role: ActorRole) -> bool {
        self.allowed_roles().contains(&role)
    }

    /// Whether a comment must accompany this edge.
    pub fn requires_comment(self) -> bool {
        matches!(self, Self::Resolve | Self::SaveProgress)
    }

    /// `false` only for save-progress, which keeps the status unchanged.
    pub fn changes_status(self) -> bool {
        !matches!(self, Self::SaveProgress)
    }
}

/// Look up the edge from `from` to `to`, if one exists.
pub fn edge(from: ComplaintStatus, to: ComplaintStatus) -> Option<TransitionKind> {
    use ComplaintStatus::*;

    match (from, to) {
        (a, b) if a == b => Some(TransitionKind::SaveProgress),
        (New, Pending) => Some(TransitionKind::Assign),
        (Pending, InProgress) => Some(TransitionKind::StartWork),
        (InProgress, Resolved) => Some(TransitionKind::Resolve),
        (Resolved, InProgress) => Some(TransitionKind::Reopen),
        _ => None,
    }
}

/// Statuses reachable from `from` by a status-changing edge.
pub fn valid_targets(from: ComplaintStatus) -> Vec<ComplaintStatus> {
    ComplaintStatus::ALL
        .into_iter()
        .filter(|&to| to != from && edge(from, to).is_some())
        .collect()
}

/// Validate a requested transition.
///
/// Checks run in order: the edge must exist ([`CoreError::InvalidTransition`]),
/// the actor must be allowed to take it ([`CoreError::UnauthorizedActor`]),
/// and edge-specific fields must be present ([`CoreError::ValidationFailed`]).
/// Staff may only move complaints assigned to them.
pub fn plan_transition(
    actor: &Actor,
    complaint: &ComplaintSnapshot,
    to: ComplaintStatus,
    input: &TransitionInput<'_>,
) -> Result<TransitionKind, CoreError> {
    let from = complaint.status;

    let kind = edge(from, to).ok_or(CoreError::InvalidTransition { from, to })?;

    let unauthorized = CoreError::UnauthorizedActor {
        role: actor.role,
        from,
        to,
    };
    if !kind.permits(actor.role) {
        return Err(unauthorized);
    }
    if actor.role == ActorRole::Staff && complaint.staff_in_charge != Some(actor.id) {
        return Err(unauthorized);
    }

    if kind == TransitionKind::Assign {
        if input.staff_in_charge.is_none() {
            return Err(CoreError::validation_failed(
                "staff_in_charge",
                "A staff member must be selected when assigning a complaint",
            ));
        }
    } else if input.staff_in_charge.is_some() {
        return Err(CoreError::validation_failed(
            "staff_in_charge",
            "Staff can only be set when assigning a new complaint",
        ));
    } else if input.actions_to_be_taken.is_some() {
        return Err(CoreError::validation_failed(
            "actions_to_be_taken",
            "Actions to be taken can only be set when assigning a new complaint",
        ));
    }

    if let Some(actions) = input.actions_to_be_taken {
        if actions.chars().count() > MAX_ACTIONS_LENGTH {
            return Err(CoreError::validation_failed(
                "actions_to_be_taken",
                format!("Must not exceed {MAX_ACTIONS_LENGTH} characters"),
            ));
        }
    }

    validate_comment(input.comment, kind)?;

    Ok(kind)
}

fn validate_comment(comment: Option<&str>, kind: TransitionKind) -> Result<(), CoreError> {
    let trimmed = comment.map(str::trim).unwrap_or_default();

    if kind.requires_comment() && trimmed.is_empty() {
        let message = match kind {
            TransitionKind::Resolve => "A comment describing the resolution is required",
            _ => "A comment is required to save progress",
        };
        return Err(CoreError::validation_failed("comment", message));
    }
    if trimmed.chars().count() > MAX_COMMENT_LENGTH {
        return Err(CoreError::validation_failed(
            "comment",
            format!("Must not exceed {MAX_COMMENT_LENGTH} characters"),
        ));
    }
    Ok(())
}

/// Whether `statuses`, read oldest first, is a walk on the transition
/// graph starting from the implicit `new` state.
pub fn is_valid_walk(statuses: &[ComplaintStatus]) -> bool {
    let mut current = ComplaintStatus::New;
    for &next in statuses {
        if edge(current, next).is_none() {
            return false;
        }
        current = next;
    }
    true
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
