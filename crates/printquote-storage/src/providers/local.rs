//! Local directory blob storage, served back over HTTP under a public base URL.

use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tracing::debug;
use uuid::Uuid;

use printquote_core::error::{AppError, ErrorKind};
use printquote_core::result::AppResult;
use printquote_core::traits::BlobStorage;

use crate::manager::sanitize_filename;

/// Local directory blob storage.
#[derive(Debug, Clone)]
pub struct LocalBlobStorage {
    /// Directory all blobs are written to.
    root: PathBuf,
    /// URL prefix under which `root` is reachable, without trailing slash.
    public_base_url: String,
}

impl LocalBlobStorage {
    /// Create the provider, creating `root` if needed.
    pub async fn new(root_path: &str, public_base_url: &str) -> AppResult<Self> {
        let root = PathBuf::from(root_path);
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create blob root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self {
            root,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Directory blobs are written to.
    pub fn root(&self) -> &PathBuf {
        &self.root
    }
}

#[async_trait]
impl BlobStorage for LocalBlobStorage {
    fn provider_type(&self) -> &str {
        "local"
    }

    async fn put(&self, filename: &str, data: Bytes) -> AppResult<String> {
        if data.is_empty() {
            return Err(AppError::validation("Uploaded file is empty"));
        }

        let stored_name = format!("{}-{}", Uuid::new_v4(), sanitize_filename(filename));
        let full_path = self.root.join(&stored_name);

        fs::write(&full_path, &data).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to write blob: {stored_name}"),
                e,
            )
        })?;

        debug!(blob = %stored_name, bytes = data.len(), "Stored upload");
        Ok(format!("{}/{stored_name}", self.public_base_url))
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(self.root.is_dir())
    }
}
