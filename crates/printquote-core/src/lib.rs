//! # printquote-core
//!
//! Core crate for PrintQuote. Contains the configuration schema, typed
//! job identifiers, the seam traits implemented by the store, broker and
//! blob storage backends, and the unified error system.
//!
//! This crate has **no** internal dependencies on other PrintQuote crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
