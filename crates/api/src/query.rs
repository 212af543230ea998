//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// Query parameters for `GET /admin/users` (`?role=staff`).
#[derive(Debug, Deserialize)]
pub struct RoleFilterParams {
    pub role: Option<String>,
}
