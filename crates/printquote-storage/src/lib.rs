//! # printquote-storage
//!
//! Blob storage collaborators for the upload ingestion path. An uploaded
//! model is stored and a download URL is handed back, which admission
//! then treats like any client-supplied URL.

pub mod manager;
pub mod providers;

pub use manager::build_blob_storage;
