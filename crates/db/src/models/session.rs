//! Sign-in sessions.

use hostelcare_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A live or ended sign-in session. The refresh token hash is never read back.
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub id: DbId,
    pub user_id: DbId,
    pub expires_at: Timestamp,
    pub last_active_at: Timestamp,
    pub revoked_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// Rules deciding when a session stops being usable.
#[derive(Debug, Clone, Copy)]
pub struct SessionPolicy {
    /// Minutes without an authenticated request after which the session ends.
    pub idle_timeout_mins: i32,
}
