//! External geometry toolchain configuration.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Paths and limits for the slicer and orientation tools.
#[derive(Debug, Clone, Validate, Serialize, Deserialize)]
pub struct ToolchainConfig {
    /// PrusaSlicer executable.
    #[serde(default = "default_prusaslicer")]
    pub prusaslicer: String,
    /// Tweaker3 executable.
    #[serde(default = "default_tweaker3")]
    pub tweaker3: String,
    /// Directory holding the slicer `.ini` profiles.
    #[serde(default = "default_profiles_dir")]
    pub profiles_dir: String,
    /// Deadline for each external tool invocation, in seconds.
    #[serde(default = "default_timeout")]
    #[validate(range(min = 1, max = 7200))]
    pub timeout_seconds: u64,
    /// Accepted input extensions, lowercase and without the dot.
    #[serde(default = "default_supported_formats")]
    #[validate(length(min = 1))]
    pub supported_formats: Vec<String>,
    /// Continue with the unoriented mesh when orientation fails.
    #[serde(default)]
    pub orientation_fallback: bool,
    /// Capture tool stdout/stderr for diagnostics.
    #[serde(default = "default_true")]
    pub capture_output: bool,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            prusaslicer: default_prusaslicer(),
            tweaker3: default_tweaker3(),
            profiles_dir: default_profiles_dir(),
            timeout_seconds: default_timeout(),
            supported_formats: default_supported_formats(),
            orientation_fallback: false,
            capture_output: true,
        }
    }
}

fn default_prusaslicer() -> String {
    "prusaslicer".to_string()
}

fn default_tweaker3() -> String {
    "tweaker3".to_string()
}

fn default_profiles_dir() -> String {
    "./profiles".to_string()
}

fn default_timeout() -> u64 {
    300
}

fn default_supported_formats() -> Vec<String> {
    vec!["stl".to_string(), "step".to_string(), "stp".to_string()]
}

fn default_true() -> bool {
    true
}
