//! Queue inspection commands.

use clap::{Args, Subcommand};
use serde::Serialize;

use printquote_core::error::AppError;
use printquote_store::StoreManager;

use crate::output::{self, OutputFormat};

/// Queue arguments
#[derive(Debug, Args)]
pub struct QueueArgs {
    #[command(subcommand)]
    pub command: QueueCommand,
}

/// Queue subcommands
#[derive(Debug, Subcommand)]
pub enum QueueCommand {
    /// Show pending job count and backend health
    Status,
}

#[derive(Debug, Serialize)]
struct QueueStatus {
    queue: String,
    provider: String,
    pending: u64,
    broker_healthy: bool,
    store_healthy: bool,
}

/// Execute queue command
pub async fn execute(args: &QueueArgs, env: &str, format: OutputFormat) -> Result<(), AppError> {
    let config = super::load_config(env)?;
    match args.command {
        QueueCommand::Status => {
            let stores = StoreManager::new(&config.store, &config.queue).await?;
            let broker = stores.broker();
            let status = QueueStatus {
                queue: config.queue.name.clone(),
                provider: broker.provider_type().to_string(),
                pending: broker.len(&config.queue.name).await?,
                broker_healthy: broker.health_check().await.unwrap_or(false),
                store_healthy: stores.store().health_check().await.unwrap_or(false),
            };

            match format {
                OutputFormat::Json => output::print_json(&status),
                OutputFormat::Table => {
                    println!("Queue status:");
                    output::print_kv("Queue", &status.queue);
                    output::print_kv("Provider", &status.provider);
                    output::print_kv("Pending jobs", &status.pending.to_string());
                    output::print_kv("Broker", health_label(status.broker_healthy));
                    output::print_kv("Store", health_label(status.store_healthy));
                }
            }
        }
    }
    Ok(())
}

fn health_label(healthy: bool) -> &'static str {
    if healthy { "healthy" } else { "unreachable" }
}
