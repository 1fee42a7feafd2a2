//! Blob storage provider implementations.

#[cfg(feature = "http")]
pub mod http;
#[cfg(feature = "local")]
pub mod local;
