//! Queue broker configuration.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Job queue configuration.
#[derive(Debug, Clone, Validate, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Name of the single list that carries job payloads.
    #[serde(default = "default_name")]
    #[validate(length(min = 1))]
    pub name: String,
    /// How long a worker blocks on an empty queue before re-checking for shutdown.
    #[serde(default = "default_pop_timeout")]
    #[validate(range(min = 1, max = 60))]
    pub pop_timeout_seconds: u64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            pop_timeout_seconds: default_pop_timeout(),
        }
    }
}

fn default_name() -> String {
    "print_jobs".to_string()
}

fn default_pop_timeout() -> u64 {
    5
}
