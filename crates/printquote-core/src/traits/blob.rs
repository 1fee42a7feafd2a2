//! Blob storage trait used by the upload ingestion path.

use async_trait::async_trait;
use bytes::Bytes;

use crate::result::AppResult;

/// Trait for blob storage collaborators that turn an uploaded file into a
/// URL the workers can download.
#[async_trait]
pub trait BlobStorage: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "local", "http").
    fn provider_type(&self) -> &str;

    /// Store a file and return its download URL.
    async fn put(&self, filename: &str, data: Bytes) -> AppResult<String>;

    /// Check whether the provider is healthy and reachable.
    async fn health_check(&self) -> AppResult<bool>;
}
