//! Repository for the `user_sessions` table.
//!
//! A session is usable while it is not revoked, its refresh token has not
//! expired, and it has seen an authenticated request within the idle
//! timeout. Every predicate below repeats that condition so the check and
//! the write happen in one statement.

use hostelcare_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::session::{Session, SessionPolicy};

const COLUMNS: &str = "id, user_id, expires_at, last_active_at, revoked_at, created_at";

/// `$n` is the idle timeout in minutes.
fn usable(idle_param: usize) -> String {
    format!(
        "revoked_at IS NULL
         AND expires_at > NOW()
         AND last_active_at > NOW() - make_interval(mins => ${idle_param})"
    )
}

pub struct SessionRepo;

impl SessionRepo {
    /// Open a session for a user who just proved their password.
    pub async fn open(
        pool: &PgPool,
        user_id: DbId,
        refresh_token_hash: &str,
        expires_at: Timestamp,
    ) -> Result<Session, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_sessions (user_id, refresh_token_hash, expires_at)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(user_id)
            .bind(refresh_token_hash)
            .bind(expires_at)
            .fetch_one(pool)
            .await
    }

    /// Record activity on a session.
    ///
    /// Returns `false` when the session has ended, in which case the access
    /// token that named it must be refused.
    pub async fn touch(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
        policy: SessionPolicy,
    ) -> Result<bool, sqlx::Error> {
        let query = format!(
            "UPDATE user_sessions SET last_active_at = NOW()
             WHERE id = $1 AND user_id = $2 AND {}",
            usable(3)
        );
        let result = sqlx::query(&query)
            .bind(id)
            .bind(user_id)
            .bind(policy.idle_timeout_mins)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Swap the refresh token of the usable session holding `current_hash`.
    ///
    /// The old hash stops matching as soon as this commits, so of two
    /// concurrent refreshes with the same token only one gets a row back.
    pub async fn rotate(
        pool: &PgPool,
        current_hash: &str,
        next_hash: &str,
        expires_at: Timestamp,
        policy: SessionPolicy,
    ) -> Result<Option<Session>, sqlx::Error> {
        let query = format!(
            "UPDATE user_sessions SET
                refresh_token_hash = $2,
                expires_at = $3,
                last_active_at = NOW()
             WHERE refresh_token_hash = $1 AND {}
             RETURNING {COLUMNS}",
            usable(4)
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(current_hash)
            .bind(next_hash)
            .bind(expires_at)
            .bind(policy.idle_timeout_mins)
            .fetch_optional(pool)
            .await
    }

    /// End every open session of a user. Returns how many were ended.
    pub async fn revoke_all_for_user(pool: &PgPool, user_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE user_sessions SET revoked_at = NOW()
             WHERE user_id = $1 AND revoked_at IS NULL",
        )
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
