//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod assignment_repo;
pub mod complaint_repo;
pub mod feedback_repo;
pub mod session_repo;
pub mod status_log_repo;
pub mod user_repo;

pub use assignment_repo::AssignmentRepo;
pub use complaint_repo::ComplaintRepo;
pub use feedback_repo::FeedbackRepo;
pub use session_repo::SessionRepo;
pub use status_log_repo::StatusLogRepo;
pub use user_repo::UserRepo;
