//! Remote blob storage reached over HTTP multipart upload.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use tracing::{debug, warn};

use printquote_core::config::blob::HttpBlobConfig;
use printquote_core::error::{AppError, ErrorKind};
use printquote_core::result::AppResult;
use printquote_core::traits::BlobStorage;

use crate::manager::sanitize_filename;

/// Blob storage that forwards uploads to an external service.
///
/// The service receives a multipart form with a single `file` field and
/// answers with JSON holding `download_url` (or `url`).
#[derive(Debug, Clone)]
pub struct HttpBlobStorage {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpBlobStorage {
    /// Create the provider.
    pub fn new(config: &HttpBlobConfig) -> AppResult<Self> {
        if config.endpoint.is_empty() {
            return Err(AppError::configuration(
                "blob.http.endpoint must be set for the http blob provider",
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Configuration, "Failed to build HTTP client", e)
            })?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }
}

/// Pull the download URL out of the storage service reply.
fn extract_download_url(body: &serde_json::Value) -> Option<String> {
    ["download_url", "url"]
        .iter()
        .find_map(|field| body.get(*field).and_then(|v| v.as_str()))
        .filter(|url| !url.is_empty())
        .map(str::to_string)
}

#[async_trait]
impl BlobStorage for HttpBlobStorage {
    fn provider_type(&self) -> &str {
        "http"
    }

    async fn put(&self, filename: &str, data: Bytes) -> AppResult<String> {
        let size = data.len();
        let part = Part::bytes(data.to_vec()).file_name(sanitize_filename(filename));
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Storage, "Blob upload failed", e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, endpoint = %self.endpoint, "Blob storage rejected upload");
            return Err(AppError::storage(format!(
                "Blob storage answered {status}"
            )));
        }

        let body: serde_json::Value = response.json().await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Blob storage reply is not JSON", e)
        })?;

        let url = extract_download_url(&body)
            .ok_or_else(|| AppError::storage("Blob storage reply carries no download URL"))?;
        debug!(bytes = size, url = %url, "Forwarded upload to blob storage");
        Ok(url)
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_prefers_download_url() {
        let body = serde_json::json!({"download_url": "https://a/x.stl", "url": "https://b"});
        assert_eq!(extract_download_url(&body).as_deref(), Some("https://a/x.stl"));
    }

    #[test]
    fn test_extract_falls_back_to_url() {
        let body = serde_json::json!({"url": "https://b/y.stl"});
        assert_eq!(extract_download_url(&body).as_deref(), Some("https://b/y.stl"));
        assert_eq!(extract_download_url(&serde_json::json!({"url": ""})), None);
    }

    #[test]
    fn test_new_requires_endpoint() {
        assert!(HttpBlobStorage::new(&HttpBlobConfig::default()).is_err());
    }
}
