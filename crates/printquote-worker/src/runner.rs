//! Worker runner: the serial consume-and-process loop.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use printquote_core::config::AppConfig;
use printquote_core::result::AppResult;
use printquote_core::traits::QueueBroker;
use printquote_entity::failure::{FailureKind, FailureReason};
use printquote_entity::job::Job;
use printquote_entity::quote::QuoteResult;
use printquote_service::StatusTracker;

use crate::error::StageError;
use crate::fetch::Fetcher;
use crate::pipeline::QuotePipeline;
use crate::workspace::JobWorkspace;

/// Delay before polling again after the broker errored.
const BROKER_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Loop parameters shared by all runners of a process.
#[derive(Debug, Clone)]
pub struct RunnerSettings {
    /// Queue to consume.
    pub queue: String,
    /// Longest single blocking pop.
    pub pop_timeout: Duration,
    /// Deadline for one job, download included.
    pub job_timeout: Duration,
    /// Parent of per-job workspaces.
    pub temp_dir: PathBuf,
}

impl RunnerSettings {
    /// Settings from the application configuration.
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            queue: config.queue.name.clone(),
            pop_timeout: Duration::from_secs(config.queue.pop_timeout_seconds),
            job_timeout: Duration::from_secs(config.worker.job_timeout_seconds),
            temp_dir: PathBuf::from(&config.worker.temp_dir),
        }
    }
}

/// How a dequeued payload ended.
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    /// Result stored and status `completed`.
    Completed,
    /// Status `failed` with the given classification.
    Failed(FailureKind),
    /// Not processed: unreadable payload or job already claimed.
    Skipped,
}

/// One serial worker instance.
#[derive(Debug, Clone)]
pub struct WorkerRunner {
    worker_id: String,
    broker: Arc<dyn QueueBroker>,
    tracker: StatusTracker,
    fetcher: Arc<dyn Fetcher>,
    pipeline: Arc<QuotePipeline>,
    settings: RunnerSettings,
}

impl WorkerRunner {
    /// Create a runner from its collaborators.
    pub fn new(
        worker_id: impl Into<String>,
        broker: Arc<dyn QueueBroker>,
        tracker: StatusTracker,
        fetcher: Arc<dyn Fetcher>,
        pipeline: Arc<QuotePipeline>,
        settings: RunnerSettings,
    ) -> Self {
        Self {
            worker_id: worker_id.into(),
            broker,
            tracker,
            fetcher,
            pipeline,
            settings,
        }
    }

    /// Identifier used in logs.
    pub fn worker_id(&self) -> &str {
        &self.worker_id
    }

    /// Consume jobs until `cancel` turns true.
    ///
    /// A job in flight when shutdown is requested is finished (or hits its
    /// deadline) first; the loop only checks for shutdown between pops.
    pub async fn run(&self, mut cancel: watch::Receiver<bool>) {
        tracing::info!(
            "Worker '{}' started on queue '{}' (job timeout {}s)",
            self.worker_id,
            self.settings.queue,
            self.settings.job_timeout.as_secs()
        );

        while !*cancel.borrow() {
            match self.run_once().await {
                Ok(_) => {}
                Err(e) => {
                    tracing::error!("Worker '{}' failed to dequeue: {}", self.worker_id, e);
                    tokio::select! {
                        _ = cancel.changed() => {}
                        _ = tokio::time::sleep(BROKER_RETRY_DELAY) => {}
                    }
                }
            }
        }

        tracing::info!("Worker '{}' shut down", self.worker_id);
    }

    /// Wait up to the pop timeout for one job and process it.
    pub async fn run_once(&self) -> AppResult<Option<JobOutcome>> {
        let payload = self
            .broker
            .pop_blocking(&self.settings.queue, self.settings.pop_timeout)
            .await?;
        match payload {
            Some(payload) => Ok(Some(self.process_payload(&payload).await)),
            None => Ok(None),
        }
    }

    /// Process one queue payload to a terminal status.
    pub async fn process_payload(&self, payload: &str) -> JobOutcome {
        let job = match Job::from_payload(payload) {
            Ok(job) => job,
            Err(e) => {
                tracing::error!(
                    worker = %self.worker_id,
                    error = %e,
                    "Discarding unreadable queue payload"
                );
                return JobOutcome::Skipped;
            }
        };

        match self.tracker.mark_processing(job.id).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(job_id = %job.id, worker = %self.worker_id, "Job already claimed, skipping");
                return JobOutcome::Skipped;
            }
            Err(e) => {
                tracing::error!(job_id = %job.id, error = %e, "Could not claim job, dropping it");
                return JobOutcome::Skipped;
            }
        }
        tracing::info!(
            job_id = %job.id,
            worker = %self.worker_id,
            material = %job.material,
            infill = job.infill,
            "Processing job"
        );

        let result = self.execute(&job).await;
        self.record(&job, result).await
    }

    /// Run the pipeline in a scoped workspace under the job deadline.
    async fn execute(&self, job: &Job) -> Result<QuoteResult, StageError> {
        let workspace = JobWorkspace::create(&self.settings.temp_dir, job.id)
            .await
            .map_err(|e| {
                StageError::with_detail(
                    FailureKind::Internal,
                    "Could not prepare job workspace",
                    e.to_string(),
                )
            })?;

        let fetcher = Arc::clone(&self.fetcher);
        let pipeline = Arc::clone(&self.pipeline);
        let task_job = job.clone();
        let dir = workspace.path().to_path_buf();
        let mut task = tokio::spawn(async move {
            let stem = task_job.id.to_string();
            let input = fetcher.fetch(&task_job.download_url, &dir, &stem).await?;
            pipeline.run(&task_job, &input, &dir).await
        });

        let outcome = match tokio::time::timeout(self.settings.job_timeout, &mut task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => {
                tracing::error!(job_id = %job.id, error = %join_error, "Pipeline task panicked");
                Err(StageError::with_detail(
                    FailureKind::Internal,
                    "Unexpected processing error",
                    join_error.to_string(),
                ))
            }
            Err(_) => {
                tracing::error!(
                    job_id = %job.id,
                    timeout_secs = self.settings.job_timeout.as_secs(),
                    "Job deadline exceeded, aborting pipeline"
                );
                task.abort();
                // Dropping the task's future kills any running tool's process group.
                let _ = task.await;
                Err(StageError::new(
                    FailureKind::Timeout,
                    format!(
                        "Processing exceeded the {} second limit",
                        self.settings.job_timeout.as_secs()
                    ),
                ))
            }
        };

        drop(workspace);
        outcome
    }

    async fn record(&self, job: &Job, result: Result<QuoteResult, StageError>) -> JobOutcome {
        match result {
            Ok(quote) => match self.tracker.complete(job.id, &quote).await {
                Ok(true) => {
                    tracing::info!(job_id = %job.id, total_cost = quote.total_cost, "Job completed");
                    JobOutcome::Completed
                }
                Ok(false) => {
                    tracing::warn!(job_id = %job.id, "Completion was refused by the status record");
                    JobOutcome::Skipped
                }
                Err(e) => {
                    tracing::error!(job_id = %job.id, error = %e, "Failed to store result");
                    self.record_failure(
                        job,
                        &StageError::with_detail(
                            FailureKind::Internal,
                            "Could not store result",
                            e.to_string(),
                        ),
                    )
                    .await
                }
            },
            Err(stage) => self.record_failure(job, &stage).await,
        }
    }

    async fn record_failure(&self, job: &Job, stage: &StageError) -> JobOutcome {
        tracing::warn!(
            job_id = %job.id,
            kind = %stage.kind,
            detail = %stage.detail,
            "Job failed"
        );
        let reason: FailureReason = stage.to_reason();
        match self.tracker.fail(job.id, &reason).await {
            Ok(true) => {}
            Ok(false) => tracing::warn!(job_id = %job.id, "Failure transition was refused"),
            Err(e) => tracing::error!(job_id = %job.id, error = %e, "Failed to record job failure"),
        }
        JobOutcome::Failed(stage.kind)
    }
}
