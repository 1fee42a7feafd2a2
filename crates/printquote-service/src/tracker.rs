//! Monotonic status transitions over the key-value store.
//!
//! Every write is either set-if-absent or a compare-and-swap against the
//! expected predecessor, so a terminal status is never overwritten and a
//! status never moves backwards, whatever order concurrent writers land in.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use printquote_core::error::AppError;
use printquote_core::result::AppResult;
use printquote_core::traits::KeyValueStore;
use printquote_core::types::JobId;
use printquote_entity::failure::FailureReason;
use printquote_entity::job::JobStatus;
use printquote_entity::quote::QuoteResult;
use printquote_store::keys;

/// Reads and writes job status, result and failure records.
#[derive(Debug, Clone)]
pub struct StatusTracker {
    store: Arc<dyn KeyValueStore>,
    ttl: Duration,
}

impl StatusTracker {
    /// Create a tracker writing records with the given lifetime.
    pub fn new(store: Arc<dyn KeyValueStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Record lifetime applied at creation.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Create the `queued` record. Returns false if a record already exists,
    /// which happens when a worker claimed the job first.
    pub async fn mark_queued(&self, id: JobId) -> AppResult<bool> {
        self.store
            .set_nx(&keys::status(id), JobStatus::Queued.as_str(), self.ttl)
            .await
    }

    /// Move a freshly dequeued job to `processing`.
    ///
    /// Returns false when the job is already processing or finished, in
    /// which case the caller must not run it.
    pub async fn mark_processing(&self, id: JobId) -> AppResult<bool> {
        let key = keys::status(id);
        if self.swap(&key, JobStatus::Queued, JobStatus::Processing).await? {
            return Ok(true);
        }
        // Admission pushes before writing `queued`, so the record may not exist yet.
        if self
            .store
            .set_nx(&key, JobStatus::Processing.as_str(), self.ttl)
            .await?
        {
            debug!(job_id = %id, "Created processing status ahead of admission write");
            return Ok(true);
        }
        // Admission's write landed between the two calls.
        self.swap(&key, JobStatus::Queued, JobStatus::Processing).await
    }

    /// Store the result, then move `processing` to `completed`.
    ///
    /// The result expires together with the status record. If the
    /// transition is refused the result is removed again so a result never
    /// exists without a `completed` status. An existing result record is
    /// left untouched.
    pub async fn complete(&self, id: JobId, result: &QuoteResult) -> AppResult<bool> {
        let result_key = keys::result(id);
        let payload = serde_json::to_string(result)?;
        let ttl = self.remaining_ttl(id).await?;
        if !self.store.set_nx(&result_key, &payload, ttl).await? {
            warn!(job_id = %id, "Result record already exists, completion refused");
            return Ok(false);
        }

        let moved = self
            .swap(&keys::status(id), JobStatus::Processing, JobStatus::Completed)
            .await;
        match moved {
            Ok(true) => Ok(true),
            Ok(false) => {
                warn!(job_id = %id, "Completion refused, removing result record");
                self.store.delete(&result_key).await?;
                Ok(false)
            }
            Err(e) => {
                if let Err(cleanup) = self.store.delete(&result_key).await {
                    warn!(job_id = %id, error = %cleanup, "Failed to remove orphaned result record");
                }
                Err(e)
            }
        }
    }

    /// Store the failure reason, then move `processing` to `failed`.
    ///
    /// The first recorded reason wins. Like a result, the reason expires
    /// together with the status record.
    pub async fn fail(&self, id: JobId, reason: &FailureReason) -> AppResult<bool> {
        let failure_key = keys::failure(id);
        let payload = serde_json::to_string(reason)?;
        let ttl = self.remaining_ttl(id).await?;
        let created = self.store.set_nx(&failure_key, &payload, ttl).await?;

        let moved = self
            .swap(&keys::status(id), JobStatus::Processing, JobStatus::Failed)
            .await?;
        if !moved && created {
            warn!(job_id = %id, "Failure transition refused, removing failure record");
            self.store.delete(&failure_key).await?;
        }
        Ok(moved)
    }

    /// Current status, `None` for unknown or expired jobs.
    pub async fn status(&self, id: JobId) -> AppResult<Option<JobStatus>> {
        match self.store.get(&keys::status(id)).await? {
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|e: String| AppError::internal(format!("Corrupt status record: {e}"))),
            None => Ok(None),
        }
    }

    /// Result record of a completed job.
    pub async fn result(&self, id: JobId) -> AppResult<Option<QuoteResult>> {
        self.read_json(&keys::result(id)).await
    }

    /// Failure reason of a failed job.
    pub async fn failure(&self, id: JobId) -> AppResult<Option<FailureReason>> {
        self.read_json(&keys::failure(id)).await
    }

    /// Lifetime left on the status record, the full TTL if it has none.
    async fn remaining_ttl(&self, id: JobId) -> AppResult<Duration> {
        Ok(self
            .store
            .remaining_ttl(&keys::status(id))
            .await?
            .unwrap_or(self.ttl))
    }

    async fn swap(&self, key: &str, from: JobStatus, to: JobStatus) -> AppResult<bool> {
        debug_assert!(from.can_transition_to(to));
        let moved = self
            .store
            .compare_and_swap(key, from.as_str(), to.as_str())
            .await?;
        if moved {
            debug!(key, from = %from, to = %to, "Status transition");
        }
        Ok(moved)
    }

    async fn read_json<T: serde::de::DeserializeOwned>(&self, key: &str) -> AppResult<Option<T>> {
        match self.store.get(key).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use printquote_entity::failure::FailureKind;
    use printquote_store::memory::MemoryKeyValueStore;

    fn tracker() -> StatusTracker {
        StatusTracker::new(
            Arc::new(MemoryKeyValueStore::new()),
            Duration::from_secs(60),
        )
    }

    #[tokio::test]
    async fn test_full_lifecycle_to_failed() {
        let tracker = tracker();
        let id = JobId::new();
        assert!(tracker.mark_queued(id).await.unwrap());
        assert!(tracker.mark_processing(id).await.unwrap());
        let reason = FailureReason::new(FailureKind::Slicing, "boom");
        assert!(tracker.fail(id, &reason).await.unwrap());

        assert_eq!(tracker.status(id).await.unwrap(), Some(JobStatus::Failed));
        assert_eq!(tracker.failure(id).await.unwrap(), Some(reason));
        assert!(tracker.result(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_processing_created_when_admission_write_is_late() {
        let tracker = tracker();
        let id = JobId::new();
        assert!(tracker.mark_processing(id).await.unwrap());
        // The late admission write must not regress the status.
        assert!(!tracker.mark_queued(id).await.unwrap());
        assert_eq!(tracker.status(id).await.unwrap(), Some(JobStatus::Processing));
    }

    #[tokio::test]
    async fn test_second_claim_is_refused() {
        let tracker = tracker();
        let id = JobId::new();
        tracker.mark_queued(id).await.unwrap();
        assert!(tracker.mark_processing(id).await.unwrap());
        assert!(!tracker.mark_processing(id).await.unwrap());
    }

    #[tokio::test]
    async fn test_terminal_status_is_never_overwritten() {
        let tracker = tracker();
        let id = JobId::new();
        tracker.mark_queued(id).await.unwrap();
        tracker.mark_processing(id).await.unwrap();
        let reason = FailureReason::new(FailureKind::Timeout, "too slow");
        assert!(tracker.fail(id, &reason).await.unwrap());

        let again = FailureReason::new(FailureKind::Internal, "late");
        assert!(!tracker.fail(id, &again).await.unwrap());
        assert!(!tracker.mark_processing(id).await.unwrap());
        assert_eq!(tracker.status(id).await.unwrap(), Some(JobStatus::Failed));
        assert_eq!(tracker.failure(id).await.unwrap(), Some(reason));
    }

    #[tokio::test]
    async fn test_refused_failure_removes_its_record() {
        let tracker = tracker();
        let id = JobId::new();
        tracker.mark_queued(id).await.unwrap();
        let reason = FailureReason::new(FailureKind::Internal, "never claimed");
        assert!(!tracker.fail(id, &reason).await.unwrap());
        assert_eq!(tracker.status(id).await.unwrap(), Some(JobStatus::Queued));
        assert!(tracker.failure(id).await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_result_expires_with_status() {
        let store = Arc::new(MemoryKeyValueStore::new());
        let tracker = StatusTracker::new(store.clone(), Duration::from_secs(60));
        let id = JobId::new();
        tracker.mark_queued(id).await.unwrap();
        tracker.mark_processing(id).await.unwrap();

        tokio::time::advance(Duration::from_secs(40)).await;
        let reason = FailureReason::new(FailureKind::Slicing, "boom");
        assert!(tracker.fail(id, &reason).await.unwrap());
        assert_eq!(
            store.remaining_ttl(&keys::failure(id)).await.unwrap(),
            Some(Duration::from_secs(20))
        );

        tokio::time::advance(Duration::from_secs(21)).await;
        assert_eq!(tracker.status(id).await.unwrap(), None);
        assert!(tracker.failure(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unknown_job_has_no_status() {
        assert_eq!(tracker().status(JobId::new()).await.unwrap(), None);
    }
}
