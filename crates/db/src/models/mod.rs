//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Deserialize` DTOs for the requests that create or change it

pub mod assignment;
pub mod complaint;
pub mod feedback;
pub mod session;
pub mod status_log;
pub mod user;
