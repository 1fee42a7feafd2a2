//! Response bodies not owned by the service layer.

use serde::{Deserialize, Serialize};

use printquote_core::types::JobId;

/// Body of an accepted submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueuedResponse {
    /// Identifier to poll.
    pub job_id: JobId,
    /// Next-step hint for the client.
    pub message: String,
}

impl QueuedResponse {
    /// Response for a freshly admitted job.
    pub fn new(job_id: JobId) -> Self {
        Self {
            job_id,
            message: format!("Job queued successfully. Poll /status/{job_id} for results."),
        }
    }
}

/// Reachability of one backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendHealth {
    /// Backend kind, e.g. `redis`.
    pub provider: String,
    /// Whether the backend answered.
    pub healthy: bool,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `healthy` or `unhealthy`.
    pub status: String,
    /// Service name.
    pub service: String,
    /// Status/result store.
    pub store: BackendHealth,
    /// Queue broker.
    pub queue: BackendHealth,
}

/// Body of `GET /`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootResponse {
    /// Service banner.
    pub message: String,
    /// Crate version.
    pub version: String,
}
