//! Input download.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use printquote_core::error::AppError;
use printquote_core::result::AppResult;
use printquote_entity::failure::FailureKind;

use crate::error::StageError;

/// Extension used when the URL path has none.
pub const DEFAULT_EXTENSION: &str = "stl";

/// Retrieves a job's input file into its workspace.
#[async_trait]
pub trait Fetcher: Send + Sync + fmt::Debug + 'static {
    /// Download `url` to `<dir>/<stem>.<ext>` and return the path.
    async fn fetch(&self, url: &str, dir: &Path, stem: &str) -> Result<PathBuf, StageError>;
}

/// Extension of the URL's path, ignoring query and fragment.
pub fn extension_from_url(url: &str) -> String {
    let path = match reqwest::Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url.split(['?', '#']).next().unwrap_or_default().to_string(),
    };
    let name = path.rsplit('/').next().unwrap_or_default();
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => ext.to_ascii_lowercase(),
        _ => DEFAULT_EXTENSION.to_string(),
    }
}

/// Downloads over HTTP(S) following redirects.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Create a fetcher with an overall per-request timeout.
    pub fn new(timeout: Duration) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| {
                AppError::configuration(format!("Failed to build download client: {e}"))
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, dir: &Path, stem: &str) -> Result<PathBuf, StageError> {
        let download_failed = |detail: String| {
            StageError::with_detail(FailureKind::Download, "Failed to download input file", detail)
        };

        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| download_failed(format!("request to {url} failed: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            return Err(download_failed(format!("{url} answered {status}")));
        }

        let dest = dir.join(format!("{stem}.{}", extension_from_url(url)));
        let mut file = tokio::fs::File::create(&dest)
            .await
            .map_err(|e| download_failed(format!("cannot create {}: {e}", dest.display())))?;
        let mut written: u64 = 0;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| download_failed(format!("reading body of {url} failed: {e}")))?
        {
            file.write_all(&chunk)
                .await
                .map_err(|e| download_failed(format!("writing {} failed: {e}", dest.display())))?;
            written += chunk.len() as u64;
        }
        file.flush()
            .await
            .map_err(|e| download_failed(format!("writing {} failed: {e}", dest.display())))?;

        if written == 0 {
            return Err(StageError::new(FailureKind::Download, "Downloaded file is empty"));
        }
        tracing::info!(url, bytes = written, path = %dest.display(), "Downloaded input file");
        Ok(dest)
    }
}
