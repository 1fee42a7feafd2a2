//! CLI command definitions and dispatch.

pub mod queue;
pub mod quote;
pub mod serve;
pub mod worker;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use printquote_core::config::AppConfig;
use printquote_core::error::AppError;

/// PrintQuote: asynchronous quotation engine for 3D printing jobs
#[derive(Debug, Parser)]
#[command(name = "printquote", version, about, long_about = None)]
pub struct Cli {
    /// Configuration environment overlay (`config/<env>.toml`)
    #[arg(short, long, env = "PRINTQUOTE_ENV", default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the HTTP API
    Serve(serve::ServeArgs),
    /// Run a pool of queue workers
    Worker(worker::WorkerArgs),
    /// Quote a local model file without the queue
    Quote(quote::QuoteArgs),
    /// Queue inspection
    Queue(queue::QueueArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Serve(args) => serve::execute(args, &self.env).await,
            Commands::Worker(args) => worker::execute(args, &self.env).await,
            Commands::Quote(args) => quote::execute(args, &self.env, self.format).await,
            Commands::Queue(args) => queue::execute(args, &self.env, self.format).await,
        }
    }
}

/// Helper: load configuration for an environment
pub fn load_config(env: &str) -> Result<AppConfig, AppError> {
    AppConfig::load(env)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_quote_command() {
        let cli = Cli::parse_from([
            "printquote",
            "--format",
            "json",
            "quote",
            "part.stl",
            "--material",
            "PETG",
            "--infill",
            "40",
            "--rush",
        ]);
        assert_eq!(cli.format, OutputFormat::Json);
        let Commands::Quote(args) = cli.command else {
            panic!("expected quote command");
        };
        assert_eq!(args.material.as_deref(), Some("PETG"));
        assert_eq!(args.infill, 40);
        assert!(args.rush);
    }

    #[test]
    fn test_infill_above_100_rejected() {
        let parsed = Cli::try_parse_from(["printquote", "quote", "part.stl", "--infill", "150"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_parse_queue_status() {
        let cli = Cli::parse_from(["printquote", "queue", "status"]);
        assert!(matches!(cli.command, Commands::Queue(_)));
    }
}
