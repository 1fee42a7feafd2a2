//! PrintQuote API server
//!
//! Loads configuration, initialises logging and serves the HTTP API.

use tracing_subscriber::{EnvFilter, fmt};

use printquote_core::config::AppConfig;
use printquote_core::error::AppError;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    let embedded_workers = config.server.embedded_workers;
    if let Err(e) = printquote_api::run_server(config, embedded_workers).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from `config/` and `PRINTQUOTE__*` variables
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("PRINTQUOTE_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}
