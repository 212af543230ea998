//! Complaint lifecycle engine and feedback subsystem.
//!
//! Every operation takes an explicit [`Actor`](hostelcare_core::lifecycle::Actor)
//! resolved by the handler from the bearer token; nothing here reads
//! request or ambient state. Each write is a single database transaction,
//! so a dropped request future never leaves a partial transition behind.

pub mod feedback;
pub mod lifecycle;

use hostelcare_core::lifecycle::Actor;
use hostelcare_core::roles::ActorRole;
use hostelcare_db::models::complaint::Complaint;

/// Whether `actor` may read `complaint`: students their own, staff those
/// assigned to them, admins everything.
pub fn can_view(actor: &Actor, complaint: &Complaint) -> bool {
    match actor.role {
        ActorRole::Admin => true,
        ActorRole::Student => complaint.owner_id == actor.id,
        ActorRole::Staff => complaint.staff_in_charge == Some(actor.id),
    }
}
