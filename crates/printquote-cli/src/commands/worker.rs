//! Worker command: consume the queue until interrupted.

use std::sync::Arc;

use clap::Args;
use tokio::sync::watch;

use printquote_core::error::AppError;
use printquote_store::StoreManager;
use printquote_toolchain::ExternalToolchain;

use crate::output;

/// Worker arguments
#[derive(Debug, Args)]
pub struct WorkerArgs {
    /// Number of worker loops (defaults to `worker.instances`)
    #[arg(short = 'n', long)]
    pub instances: Option<usize>,
    /// Serve `GET /health` on this port (defaults to `worker.health_port`)
    #[arg(long)]
    pub health_port: Option<u16>,
}

/// Execute worker command
pub async fn execute(args: &WorkerArgs, env: &str) -> Result<(), AppError> {
    let mut config = super::load_config(env)?;
    if let Some(instances) = args.instances {
        config.worker.instances = instances;
    }
    config.check()?;

    let stores = StoreManager::new(&config.store, &config.queue).await?;
    stores.ensure_reachable().await?;

    tokio::fs::create_dir_all(&config.worker.temp_dir)
        .await
        .map_err(|e| {
            AppError::internal(format!(
                "Failed to create temp dir '{}': {e}",
                config.worker.temp_dir
            ))
        })?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let toolchain = Arc::new(ExternalToolchain::new(config.toolchain.clone()));
    let mut workers =
        printquote_worker::spawn_pool(&config, &stores, toolchain, shutdown_rx.clone())?;

    let health = args.health_port.or(config.worker.health_port).map(|port| {
        let cancel = shutdown_rx.clone();
        tokio::spawn(async move {
            if let Err(e) = printquote_worker::health::serve(port, cancel).await {
                tracing::error!("Worker health endpoint failed: {}", e);
            }
        })
    });

    output::print_success(&format!(
        "{} worker(s) consuming '{}' (Ctrl+C to stop)",
        config.worker.instances, config.queue.name
    ));

    printquote_api::app::shutdown_signal().await;
    let _ = shutdown_tx.send(true);
    output::print_warning("Shutting down; waiting for in-flight jobs...");

    while workers.join_next().await.is_some() {}
    if let Some(handle) = health {
        let _ = handle.await;
    }
    output::print_success("Workers stopped");
    Ok(())
}
