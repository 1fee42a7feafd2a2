//! # printquote-service
//!
//! Job lifecycle services for PrintQuote. Each service receives its store,
//! broker and policy at construction time via `Arc` references, so API
//! handlers and workers share one set of backends.

pub mod admission;
pub mod query;
pub mod tracker;

pub use admission::{JobAdmission, UploadFields};
pub use query::{StatusQuery, StatusView};
pub use tracker::StatusTracker;
