//! Starting the configured number of runners in one process.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinSet;

use printquote_core::config::AppConfig;
use printquote_core::result::AppResult;
use printquote_service::StatusTracker;
use printquote_store::StoreManager;
use printquote_toolchain::Toolchain;

use crate::fetch::HttpFetcher;
use crate::pipeline::QuotePipeline;
use crate::runner::{RunnerSettings, WorkerRunner};

/// Spawn `worker.instances` runners sharing one set of backends.
///
/// Runners do not coordinate; the broker's atomic pop is what keeps two of
/// them from taking the same job.
pub fn spawn_pool(
    config: &AppConfig,
    stores: &StoreManager,
    toolchain: Arc<dyn Toolchain>,
    cancel: watch::Receiver<bool>,
) -> AppResult<JoinSet<()>> {
    let fetcher = Arc::new(HttpFetcher::new(Duration::from_secs(
        config.worker.fetch_timeout_seconds,
    ))?);
    let tracker = StatusTracker::new(
        stores.store(),
        Duration::from_secs(config.store.job_ttl_seconds),
    );
    let pipeline = Arc::new(QuotePipeline::new(
        toolchain,
        config.pricing.clone(),
        config.toolchain.supported_formats.clone(),
    ));
    let settings = RunnerSettings::from_config(config);

    let mut set = JoinSet::new();
    for index in 0..config.worker.instances {
        let runner = WorkerRunner::new(
            format!("worker-{index}"),
            stores.broker(),
            tracker.clone(),
            fetcher.clone(),
            Arc::clone(&pipeline),
            settings.clone(),
        );
        let cancel = cancel.clone();
        set.spawn(async move { runner.run(cancel).await });
    }
    tracing::info!(
        "Started {} worker instance(s) on queue '{}'",
        config.worker.instances,
        settings.queue
    );
    Ok(set)
}
