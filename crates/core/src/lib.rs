//! Domain rules for HostelCare complaint tracking.
//!
//! Everything in this crate is pure: no database, no HTTP. The DB and API
//! crates build on these types and validation functions.

pub mod complaint;
pub mod error;
pub mod feedback;
pub mod lifecycle;
pub mod roles;
pub mod search;
pub mod types;
