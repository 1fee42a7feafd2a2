//! Core type definitions used across the PrintQuote workspace.

pub mod id;

pub use id::JobId;
