//! Client-facing status lookups.

use serde::{Deserialize, Serialize};

use printquote_core::error::AppError;
use printquote_core::result::AppResult;
use printquote_core::types::JobId;
use printquote_entity::failure::FailureReason;
use printquote_entity::job::JobStatus;
use printquote_entity::quote::QuoteResult;

use crate::tracker::StatusTracker;

/// What a polling client sees for one job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusView {
    /// Current status.
    pub status: JobStatus,
    /// Quotation, only for completed jobs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<QuoteResult>,
    /// Failure classification, only for failed jobs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<FailureReason>,
}

/// Composes status and result lookups.
///
/// The status record decides everything: a result is only read for a
/// `completed` status and ignored otherwise.
#[derive(Debug, Clone)]
pub struct StatusQuery {
    tracker: StatusTracker,
}

impl StatusQuery {
    /// Create a query service over the tracker's store.
    pub fn new(tracker: StatusTracker) -> Self {
        Self { tracker }
    }

    /// Look up a job. Unknown and expired ids are both `NotFound`.
    pub async fn get(&self, id: JobId) -> AppResult<StatusView> {
        let status = self
            .tracker
            .status(id)
            .await?
            .ok_or_else(|| AppError::not_found("Job not found"))?;

        let view = match status {
            JobStatus::Completed => StatusView {
                status,
                data: self.tracker.result(id).await?,
                error: None,
            },
            JobStatus::Failed => StatusView {
                status,
                data: None,
                error: self.tracker.failure(id).await?,
            },
            JobStatus::Queued | JobStatus::Processing => StatusView {
                status,
                data: None,
                error: None,
            },
        };
        Ok(view)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::Utc;
    use printquote_core::error::ErrorKind;
    use printquote_core::traits::KeyValueStore;
    use printquote_entity::failure::FailureKind;
    use printquote_entity::quote::{Complexity, Material, PricingBreakdown};
    use printquote_store::memory::MemoryKeyValueStore;

    use super::*;

    fn sample_result() -> QuoteResult {
        QuoteResult {
            total_cost: 9.9,
            print_time: "1h 2m 3s".to_string(),
            material: Material::new("PLA"),
            complexity: Complexity::Medium,
            layer_height: 0.2,
            infill_percentage: 15,
            print_time_seconds: 3723,
            filament_grams: 2.98,
            support_material: false,
            estimated_delivery: "2-3 business days".to_string(),
            pricing: PricingBreakdown {
                print_time_hours: 1.03,
                base_rate_per_hour: 3.0,
                base_cost: 3.09,
                complexity_multiplier: 1.0,
                cost_after_complexity: 3.09,
                material_multiplier: 0.8,
                cost_after_material: 2.47,
                rush_order: false,
                rush_multiplier: 1.0,
                cost_before_rounding: 2.47,
                total: 4.9,
            },
            generated_at: Utc::now(),
        }
    }

    fn setup() -> (StatusQuery, StatusTracker, MemoryKeyValueStore) {
        let store = MemoryKeyValueStore::new();
        let tracker = StatusTracker::new(Arc::new(store.clone()), Duration::from_secs(60));
        (StatusQuery::new(tracker.clone()), tracker, store)
    }

    #[tokio::test]
    async fn test_unknown_job_is_not_found() {
        let (query, _, _) = setup();
        let err = query.get(JobId::new()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_completed_job_carries_data() {
        let (query, tracker, _) = setup();
        let id = JobId::new();
        tracker.mark_queued(id).await.unwrap();
        tracker.mark_processing(id).await.unwrap();
        tracker.complete(id, &sample_result()).await.unwrap();

        let view = query.get(id).await.unwrap();
        assert_eq!(view.status, JobStatus::Completed);
        assert_eq!(view.data.unwrap().material.as_str(), "PLA");
        assert!(view.error.is_none());
    }

    #[tokio::test]
    async fn test_failed_job_has_no_data() {
        let (query, tracker, _) = setup();
        let id = JobId::new();
        tracker.mark_queued(id).await.unwrap();
        tracker.mark_processing(id).await.unwrap();
        tracker
            .fail(id, &FailureReason::new(FailureKind::MeshInvalid, "not watertight"))
            .await
            .unwrap();

        let view = query.get(id).await.unwrap();
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["status"], "failed");
        assert!(json.get("data").is_none());
        assert_eq!(json["error"]["kind"], "mesh_invalid");
    }

    #[tokio::test]
    async fn test_status_is_authoritative_over_stray_result() {
        let (query, _, store) = setup();
        let id = JobId::new();
        store
            .set(&format!("status:{id}"), "processing", Duration::from_secs(60))
            .await
            .unwrap();
        store
            .set(
                &format!("result:{id}"),
                &serde_json::to_string(&sample_result()).unwrap(),
                Duration::from_secs(60),
            )
            .await
            .unwrap();

        let view = query.get(id).await.unwrap();
        assert_eq!(view.status, JobStatus::Processing);
        assert!(view.data.is_none());
    }
}
