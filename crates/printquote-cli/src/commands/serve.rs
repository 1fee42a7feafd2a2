//! Serve command: start the HTTP API.

use clap::Args;

use printquote_core::error::AppError;

/// Serve arguments
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Override the configured port
    #[arg(short, long)]
    pub port: Option<u16>,
    /// Override the configured bind address
    #[arg(long)]
    pub host: Option<String>,
    /// Run this many worker loops inside the API process
    /// (defaults to `server.embedded_workers`)
    #[arg(short, long)]
    pub workers: Option<usize>,
}

/// Execute serve command
pub async fn execute(args: &ServeArgs, env: &str) -> Result<(), AppError> {
    let mut config = super::load_config(env)?;
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(host) = &args.host {
        config.server.host = host.clone();
    }
    let workers = args.workers.unwrap_or(config.server.embedded_workers);
    printquote_api::run_server(config, workers).await
}
