//! Startup provisioning of the first admin account.

use hostelcare_core::error::CoreError;
use hostelcare_core::roles::ActorRole;
use hostelcare_db::models::user::CreateUser;
use hostelcare_db::repositories::UserRepo;
use hostelcare_db::DbPool;

use crate::auth::password::{hash_password, validate_password_strength, MIN_PASSWORD_LENGTH};
use crate::config::BootstrapAdmin;
use crate::error::{AppError, AppResult};

/// Create the configured admin if no user with that username exists.
///
/// Returns `true` when an account was created. An existing user is left
/// untouched, whatever its role or password.
pub async fn ensure_admin(pool: &DbPool, admin: &BootstrapAdmin) -> AppResult<bool> {
    if UserRepo::find_by_username(pool, &admin.username)
        .await?
        .is_some()
    {
        return Ok(false);
    }

    validate_password_strength(&admin.password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| CoreError::validation_failed("BOOTSTRAP_ADMIN_PASSWORD", msg))?;

    let password_hash = hash_password(&admin.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        pool,
        &CreateUser {
            username: admin.username.clone(),
            email: admin.email.clone(),
            password_hash,
            full_name: None,
            role: ActorRole::Admin,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, username = %user.username, "Bootstrap admin created");
    Ok(true)
}
