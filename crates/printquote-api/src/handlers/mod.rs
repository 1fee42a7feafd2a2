//! HTTP request handlers.

pub mod health;
pub mod quote;
pub mod status;
pub mod upload;
