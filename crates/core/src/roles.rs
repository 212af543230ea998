//! Well-known role names and the typed actor role.
//!
//! The constants must match the seed data in
//! `20261001000001_create_roles_and_users.sql`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_STAFF: &str = "staff";
pub const ROLE_STUDENT: &str = "student";

/// All valid role names.
pub const VALID_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_STAFF, ROLE_STUDENT];

/// The role an authenticated actor holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    Student,
    Staff,
    Admin,
}

impl ActorRole {
    /// Resolve a role name as stored in the `roles` table.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            ROLE_ADMIN => Some(Self::Admin),
            ROLE_STAFF => Some(Self::Staff),
            ROLE_STUDENT => Some(Self::Student),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => ROLE_ADMIN,
            Self::Staff => ROLE_STAFF,
            Self::Student => ROLE_STUDENT,
        }
    }
}

impl fmt::Display for ActorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for ActorRole {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_name(&value).ok_or_else(|| {
            CoreError::Validation(format!(
                "Unknown role '{value}'. Must be one of: {}",
                VALID_ROLES.join(", ")
            ))
        })
    }
}
