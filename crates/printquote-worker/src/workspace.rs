//! Per-job ephemeral directory removed when dropped.

use std::path::{Path, PathBuf};

use printquote_core::types::JobId;

/// Scratch directory owned by one job on one worker.
///
/// The directory and everything in it is deleted when the value is dropped,
/// on every exit path of the pipeline.
#[derive(Debug)]
pub struct JobWorkspace {
    path: PathBuf,
}

impl JobWorkspace {
    /// Create `<root>/<job id>`.
    pub async fn create(root: &Path, id: JobId) -> std::io::Result<Self> {
        let path = root.join(id.to_string());
        tokio::fs::create_dir_all(&path).await?;
        tracing::debug!(job_id = %id, path = %path.display(), "Created job workspace");
        Ok(Self { path })
    }

    /// The directory path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for JobWorkspace {
    fn drop(&mut self) {
        match std::fs::remove_dir_all(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "Removed job workspace"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "Failed to remove job workspace"
            ),
        }
    }
}
