//! Worker pool configuration.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Worker execution pipeline configuration.
#[derive(Debug, Clone, Validate, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Number of independent serial worker loops started by one process.
    #[serde(default = "default_instances")]
    #[validate(range(min = 1, max = 64))]
    pub instances: usize,
    /// Hard deadline for the whole pipeline of a single job, in seconds.
    #[serde(default = "default_job_timeout")]
    #[validate(range(min = 1))]
    pub job_timeout_seconds: u64,
    /// Parent directory for per-job ephemeral workspaces.
    #[serde(default = "default_temp_dir")]
    pub temp_dir: String,
    /// Timeout for downloading the input file, in seconds.
    #[serde(default = "default_fetch_timeout")]
    #[validate(range(min = 1))]
    pub fetch_timeout_seconds: u64,
    /// Port for the optional worker liveness listener.
    #[serde(default)]
    pub health_port: Option<u16>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            instances: default_instances(),
            job_timeout_seconds: default_job_timeout(),
            temp_dir: default_temp_dir(),
            fetch_timeout_seconds: default_fetch_timeout(),
            health_port: None,
        }
    }
}

fn default_instances() -> usize {
    1
}

fn default_job_timeout() -> u64 {
    600
}

fn default_temp_dir() -> String {
    "data/tmp".to_string()
}

fn default_fetch_timeout() -> u64 {
    30
}
