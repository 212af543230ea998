//! Bearer-token extractors for Axum handlers.
//!
//! Per-complaint checks (ownership, assignment, transition edges) live in
//! the engine. These only establish who is calling.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use hostelcare_core::error::CoreError;
use hostelcare_core::lifecycle::Actor;
use hostelcare_core::roles::ActorRole;
use hostelcare_core::types::DbId;
use hostelcare_db::repositories::SessionRepo;

use crate::auth::jwt::decode_access_token;
use crate::error::AppError;
use crate::state::AppState;

/// The caller behind a valid access token whose session is still live.
///
/// Extracting it counts as activity on the session, so a signed-in student
/// stays signed in for as long as they keep using the app.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: DbId,
    pub role: ActorRole,
    pub session_id: DbId,
}

impl AuthUser {
    /// The explicit actor passed to engine operations.
    pub fn actor(&self) -> Actor {
        Actor::new(self.user_id, self.role)
    }
}

fn unauthorized(message: &str) -> AppError {
    AppError::Core(CoreError::Unauthorized(message.into()))
}

fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| unauthorized("Missing Authorization header"))?;

    header
        .strip_prefix("Bearer ")
        .ok_or_else(|| unauthorized("Invalid Authorization format. Expected: Bearer <token>"))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jwt = &state.config.jwt;
        let claims = decode_access_token(bearer_token(parts)?, jwt)
            .map_err(|_| unauthorized("Invalid or expired token"))?;

        let live =
            SessionRepo::touch(&state.pool, claims.sid, claims.sub, jwt.session_policy()).await?;
        if !live {
            tracing::debug!(user_id = claims.sub, session_id = claims.sid, "Session has ended");
            return Err(unauthorized("Session has ended. Please sign in again."));
        }

        Ok(AuthUser {
            user_id: claims.sub,
            role: claims.role,
            session_id: claims.sid,
        })
    }
}

/// An [`AuthUser`] holding the `admin` role. Anyone else gets 403.
pub struct AdminUser(pub AuthUser);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ActorRole::Admin {
            return Err(AppError::Core(CoreError::Forbidden(
                "Admin role required".into(),
            )));
        }
        Ok(AdminUser(user))
    }
}
