//! Job admission: validate a submission, enqueue it, record `queued`.

use std::sync::Arc;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use validator::{Validate, ValidationErrors};

use printquote_core::config::submission::SubmissionConfig;
use printquote_core::error::AppError;
use printquote_core::result::AppResult;
use printquote_core::traits::{BlobStorage, QueueBroker};
use printquote_core::types::JobId;
use printquote_entity::job::{Job, JobSubmission};
use printquote_entity::quote::Material;

use crate::tracker::StatusTracker;

/// Form fields accompanying an uploaded model.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadFields {
    /// Material name.
    pub material: Option<String>,
    /// Infill percentage (required).
    pub infill: Option<i64>,
    /// Layer height in millimetres.
    pub layer_height: Option<f64>,
    /// Rush order flag.
    pub rush: Option<bool>,
}

impl UploadFields {
    fn into_submission(self, download_url: Option<String>) -> JobSubmission {
        JobSubmission {
            download_url,
            material: self.material,
            layer_height: self.layer_height,
            infill: self.infill,
            rush: self.rush,
        }
    }
}

/// Admits jobs onto the queue.
///
/// A rejected submission leaves no trace: nothing is pushed and no status
/// is written. An accepted one is pushed first and only then marked
/// `queued`, so a worker never sees a status for a job that is not queued.
#[derive(Debug, Clone)]
pub struct JobAdmission {
    broker: Arc<dyn QueueBroker>,
    tracker: StatusTracker,
    queue: String,
    policy: SubmissionConfig,
}

impl JobAdmission {
    /// Create an admission service pushing onto `queue`.
    pub fn new(
        broker: Arc<dyn QueueBroker>,
        tracker: StatusTracker,
        queue: impl Into<String>,
        policy: SubmissionConfig,
    ) -> Self {
        Self {
            broker,
            tracker,
            queue: queue.into(),
            policy,
        }
    }

    /// Validate a submission and apply defaults.
    pub fn build_job(&self, submission: &JobSubmission) -> AppResult<Job> {
        check_fields(submission, false)?;
        let download_url = submission
            .download_url
            .clone()
            .ok_or_else(|| AppError::validation("download_url is required"))?;
        self.resolve(submission, download_url)
    }

    /// Admit a submission and return the new job id.
    ///
    /// An error after the push (the `queued` record could not be written)
    /// does not withdraw the job: it stays on the queue and a worker will
    /// still run it, creating its status record when it claims it.
    pub async fn admit(&self, submission: JobSubmission) -> AppResult<JobId> {
        let job = self.build_job(&submission)?;
        self.enqueue(job).await
    }

    /// Store an uploaded model, then admit a job that downloads it.
    ///
    /// Fields are checked before the upload so a bad request stores nothing.
    pub async fn admit_upload(
        &self,
        blobs: &dyn BlobStorage,
        filename: &str,
        data: Bytes,
        fields: UploadFields,
    ) -> AppResult<JobId> {
        let draft = fields.into_submission(None);
        check_fields(&draft, true)?;
        // Surface policy errors (material, layer height) before storing.
        self.resolve(&draft, String::new())?;

        let download_url = blobs.put(filename, data).await.map_err(|e| {
            error!(filename, error = %e, "Upload to blob storage failed");
            AppError::storage(format!("File storage failed: {}", e.message))
        })?;
        info!(filename, %download_url, "Stored uploaded model");

        self.admit(JobSubmission {
            download_url: Some(download_url),
            ..draft
        })
        .await
    }

    async fn enqueue(&self, job: Job) -> AppResult<JobId> {
        let payload = job.to_payload()?;
        self.broker
            .push(&self.queue, &payload)
            .await
            .map_err(|e| {
                error!(job_id = %job.id, queue = %self.queue, error = %e, "Failed to enqueue job");
                AppError::enqueue(format!("Failed to enqueue job: {}", e.message))
            })?;

        match self.tracker.mark_queued(job.id).await {
            Ok(true) => {}
            Ok(false) => warn!(job_id = %job.id, "Worker claimed job before queued status was written"),
            Err(e) => {
                error!(
                    job_id = %job.id,
                    error = %e,
                    "Queued status could not be written; the job stays enqueued and will still run"
                );
                return Err(e);
            }
        }

        info!(
            job_id = %job.id,
            queue = %self.queue,
            material = %job.material,
            infill = job.infill,
            rush = job.rush,
            "Job admitted"
        );
        Ok(job.id)
    }

    fn resolve(&self, submission: &JobSubmission, download_url: String) -> AppResult<Job> {
        let material = submission
            .material
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(Material::new)
            .unwrap_or_else(|| Material::new(&self.policy.default_material));
        if !self
            .policy
            .allowed_materials
            .iter()
            .any(|m| m.eq_ignore_ascii_case(material.as_str()))
        {
            return Err(AppError::validation(format!(
                "Unsupported material '{material}'. Allowed: {}",
                self.policy.allowed_materials.join(", ")
            )));
        }

        let layer_height = submission
            .layer_height
            .unwrap_or(self.policy.default_layer_height);
        if !layer_height.is_finite()
            || layer_height < self.policy.min_layer_height
            || layer_height > self.policy.max_layer_height
        {
            return Err(AppError::validation(format!(
                "layer_height must be between {} and {}",
                self.policy.min_layer_height, self.policy.max_layer_height
            )));
        }

        let infill = submission
            .infill
            .and_then(|v| u8::try_from(v).ok())
            .filter(|v| *v <= 100)
            .ok_or_else(|| AppError::validation("infill must be between 0 and 100"))?;

        Ok(Job {
            id: JobId::new(),
            download_url,
            material,
            layer_height,
            infill,
            rush: submission.rush.unwrap_or(false),
        })
    }
}

fn check_fields(submission: &JobSubmission, skip_url: bool) -> AppResult<()> {
    match submission.validate() {
        Ok(()) => Ok(()),
        Err(errors) => match describe(&errors, skip_url) {
            Some(message) => Err(AppError::validation(message)),
            None => Ok(()),
        },
    }
}

/// One message per failed field, sorted by field name.
fn describe(errors: &ValidationErrors, skip_url: bool) -> Option<String> {
    let mut fields: Vec<(String, Vec<String>)> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let field = field.to_string();
            let messages = errs
                .iter()
                .map(|e| match &e.message {
                    Some(message) => message.to_string(),
                    None => format!("{field} is invalid"),
                })
                .collect();
            (field, messages)
        })
        .filter(|(field, _)| !(skip_url && field == "download_url"))
        .collect();
    if fields.is_empty() {
        return None;
    }
    fields.sort();
    Some(
        fields
            .into_iter()
            .flat_map(|(_, messages)| messages)
            .collect::<Vec<_>>()
            .join("; "),
    )
}
