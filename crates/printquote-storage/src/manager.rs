//! Blob storage selection from configuration.

use std::sync::Arc;

use tracing::info;

use printquote_core::config::blob::BlobConfig;
use printquote_core::error::AppError;
use printquote_core::result::AppResult;
use printquote_core::traits::BlobStorage;

/// Build the configured blob storage provider.
pub async fn build_blob_storage(config: &BlobConfig) -> AppResult<Arc<dyn BlobStorage>> {
    match config.provider.as_str() {
        #[cfg(feature = "local")]
        "local" => {
            info!(root = %config.local.root, "Initializing local blob storage");
            let provider = crate::providers::local::LocalBlobStorage::new(
                &config.local.root,
                &config.local.public_base_url,
            )
            .await?;
            Ok(Arc::new(provider))
        }
        #[cfg(feature = "http")]
        "http" => {
            info!(endpoint = %config.http.endpoint, "Initializing HTTP blob storage");
            let provider = crate::providers::http::HttpBlobStorage::new(&config.http)?;
            Ok(Arc::new(provider))
        }
        other => Err(AppError::configuration(format!(
            "Unknown blob provider: '{other}'. Supported: local, http"
        ))),
    }
}

/// Reduce a client-supplied filename to a safe single path component.
///
/// Keeps ASCII alphanumerics, `.`, `-` and `_`; everything else becomes `_`.
pub(crate) fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim_start_matches('.');
    if trimmed.is_empty() {
        "upload.stl".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_directories() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\models\\part one.STL"), "part_one.STL");
    }

    #[test]
    fn test_sanitize_never_returns_empty() {
        assert_eq!(sanitize_filename(".."), "upload.stl");
        assert_eq!(sanitize_filename(""), "upload.stl");
    }

    #[tokio::test]
    async fn test_unknown_provider_rejected() {
        let config = BlobConfig {
            provider: "ftp".to_string(),
            ..BlobConfig::default()
        };
        assert!(build_blob_storage(&config).await.is_err());
    }
}
