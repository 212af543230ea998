pub mod admin;
pub mod auth;
pub mod complaints;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                                   self-register a student (public)
/// /auth/login                                      login (public)
/// /auth/refresh                                    refresh (public)
/// /auth/logout                                     logout (requires auth)
/// /auth/me                                         current profile (requires auth)
///
/// /admin/users                                     list (?role=), create (admin only)
/// /admin/users/{id}                                get, update, deactivate
/// /admin/users/{id}/reset-password                 reset password
///
/// /complaints                                      list (scoped), create
/// /complaints/summary                              per-status counts (scoped)
/// /complaints/{id}                                 get
/// /complaints/{id}/transitions                     apply a status transition (POST)
/// /complaints/{id}/history                         status log, oldest first
/// /complaints/{id}/assignments                     staff assignment records
/// /complaints/{id}/feedback                        submit (POST), get
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/admin", admin::router())
        .nest("/complaints", complaints::router())
}
