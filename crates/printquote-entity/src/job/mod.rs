//! Print job domain entities.

pub mod model;
pub mod status;
pub mod submission;

pub use model::Job;
pub use status::JobStatus;
pub use submission::JobSubmission;
