//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section. Every section has defaults, so an empty configuration is valid.

pub mod blob;
pub mod logging;
pub mod pricing;
pub mod queue;
pub mod server;
pub mod store;
pub mod submission;
pub mod toolchain;
pub mod worker;

use serde::{Deserialize, Serialize};
use validator::Validate;

use self::blob::BlobConfig;
use self::logging::LoggingConfig;
use self::pricing::PricingConfig;
use self::queue::QueueConfig;
use self::server::ServerConfig;
use self::store::StoreConfig;
use self::submission::SubmissionConfig;
use self::toolchain::ToolchainConfig;
use self::worker::WorkerConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Validate, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Status/result store settings.
    #[serde(default)]
    #[validate(nested)]
    pub store: StoreConfig,
    /// Queue broker settings.
    #[serde(default)]
    #[validate(nested)]
    pub queue: QueueConfig,
    /// Worker pool settings.
    #[serde(default)]
    #[validate(nested)]
    pub worker: WorkerConfig,
    /// External toolchain settings.
    #[serde(default)]
    #[validate(nested)]
    pub toolchain: ToolchainConfig,
    /// Cost model.
    #[serde(default)]
    pub pricing: PricingConfig,
    /// Admission defaults and bounds.
    #[serde(default)]
    #[validate(nested)]
    pub submission: SubmissionConfig,
    /// Blob storage settings.
    #[serde(default)]
    pub blob: BlobConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `PRINTQUOTE_`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("PRINTQUOTE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let app_config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        app_config.check()?;
        Ok(app_config)
    }

    /// Validate field ranges and cross-field constraints.
    pub fn check(&self) -> Result<(), AppError> {
        self.validate()
            .map_err(|e| AppError::configuration(format!("Invalid configuration: {e}")))?;

        if self.submission.min_layer_height > self.submission.max_layer_height {
            return Err(AppError::configuration(
                "submission.min_layer_height exceeds submission.max_layer_height",
            ));
        }
        Ok(())
    }
}
