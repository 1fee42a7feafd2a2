//! Convenience result type alias for PrintQuote.

use crate::error::AppError;

/// A specialized `Result` type for PrintQuote operations.
pub type AppResult<T> = Result<T, AppError>;
