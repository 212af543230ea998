//! Request extractors that turn a bearer token into an explicit actor.
//!
//! - [`auth::AuthUser`] -- any signed-in user with a live session.
//! - [`auth::AdminUser`] -- the same, holding the `admin` role.

pub mod auth;
