//! # printquote-api
//!
//! HTTP API layer for PrintQuote built on Axum.
//!
//! Provides quote submission (JSON and multipart upload), status polling,
//! health endpoints, read-only serving of locally stored uploads, request
//! logging, CORS and error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, run_server};
pub use error::ApiError;
pub use state::AppState;
