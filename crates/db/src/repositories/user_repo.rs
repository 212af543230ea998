//! Repository for the `users` table.
//!
//! Rows are always read joined to `roles`, so callers get the role as an
//! [`ActorRole`] and never handle role ids.

use hostelcare_core::roles::ActorRole;
use hostelcare_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::user::{CreateUser, UpdateUser, User};

/// Columns of `users u JOIN roles r`, with the role name decoded as `role`.
const COLUMNS: &str = "u.id, u.username, u.email, u.password_hash, u.full_name, \
                        r.name AS role, u.is_active, u.last_login_at, u.failed_login_count, \
                        u.locked_until, u.created_at, u.updated_at";

/// Source relation for reads; `u` may be the table or a CTE over it.
const JOINED: &str = "JOIN roles r ON r.id = u.role_id";

pub struct UserRepo;

impl UserRepo {
    /// Insert a new account under the named role.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "WITH u AS (
                INSERT INTO users (username, email, password_hash, full_name, role_id)
                SELECT $1, $2, $3, $4, id FROM roles WHERE name = $5
                RETURNING *
             )
             SELECT {COLUMNS} FROM u {JOINED}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.username)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(&input.full_name)
            .bind(input.role.as_str())
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users u {JOINED} WHERE u.id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by username (case-sensitive).
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users u {JOINED} WHERE u.username = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    /// Newest accounts first, optionally only those holding `role`. The admin
    /// UI lists `staff` this way to pick someone to assign.
    pub async fn list(pool: &PgPool, role: Option<ActorRole>) -> Result<Vec<User>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM users u {JOINED}
             WHERE ($1::TEXT IS NULL OR r.name = $1)
             ORDER BY u.created_at DESC, u.id DESC"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(role.map(ActorRole::as_str))
            .fetch_all(pool)
            .await
    }

    /// Apply the `Some` fields of `input`. Returns `None` if no such user.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateUser,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "WITH u AS (
                UPDATE users SET
                    username = COALESCE($2, username),
                    email = COALESCE($3, email),
                    full_name = COALESCE($4, full_name),
                    role_id = COALESCE((SELECT id FROM roles WHERE name = $5), role_id),
                    is_active = COALESCE($6, is_active)
                WHERE id = $1
                RETURNING *
             )
             SELECT {COLUMNS} FROM u {JOINED}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(&input.username)
            .bind(&input.email)
            .bind(&input.full_name)
            .bind(input.role.map(ActorRole::as_str))
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Soft-deactivate. Returns `true` if an active account was switched off.
    pub async fn deactivate(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE users SET is_active = false WHERE id = $1 AND is_active = true")
                .bind(id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count a failed password attempt, locking the account until
    /// `lock_until` once the count reaches `max_attempts`.
    ///
    /// Returns `true` if the account is locked after this attempt.
    pub async fn record_failed_login(
        pool: &PgPool,
        id: DbId,
        max_attempts: i32,
        lock_until: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        let locked: (bool,) = sqlx::query_as(
            "UPDATE users SET
                failed_login_count = failed_login_count + 1,
                locked_until = CASE
                    WHEN failed_login_count + 1 >= $2 THEN $3
                    ELSE locked_until
                END
             WHERE id = $1
             RETURNING failed_login_count >= $2",
        )
        .bind(id)
        .bind(max_attempts)
        .bind(lock_until)
        .fetch_one(pool)
        .await?;
        Ok(locked.0)
    }

    /// Clear the lock-out bookkeeping and stamp `last_login_at`.
    pub async fn record_successful_login(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE users SET
                failed_login_count = 0,
                locked_until = NULL,
                last_login_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Replace the password hash. Returns `true` if the user exists.
    pub async fn update_password(
        pool: &PgPool,
        id: DbId,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
