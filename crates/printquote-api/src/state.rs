//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Duration;

use printquote_core::config::AppConfig;
use printquote_core::traits::BlobStorage;
use printquote_service::{JobAdmission, StatusQuery, StatusTracker};
use printquote_store::StoreManager;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Status/result store and queue broker
    pub stores: StoreManager,
    /// Blob storage for uploads
    pub blobs: Arc<dyn BlobStorage>,
    /// Job admission service
    pub admission: Arc<JobAdmission>,
    /// Status query service
    pub query: Arc<StatusQuery>,
}

impl AppState {
    /// Wire the services over already-built backends.
    pub fn new(config: AppConfig, stores: StoreManager, blobs: Arc<dyn BlobStorage>) -> Self {
        let tracker = StatusTracker::new(
            stores.store(),
            Duration::from_secs(config.store.job_ttl_seconds),
        );
        let admission = JobAdmission::new(
            stores.broker(),
            tracker.clone(),
            config.queue.name.clone(),
            config.submission.clone(),
        );
        Self {
            config: Arc::new(config),
            stores,
            blobs,
            admission: Arc::new(admission),
            query: Arc::new(StatusQuery::new(tracker)),
        }
    }
}
