//! Blob storage configuration.

use serde::{Deserialize, Serialize};

/// Blob storage collaborator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlobConfig {
    /// Provider type: `"local"` or `"http"`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Local directory provider settings.
    #[serde(default)]
    pub local: LocalBlobConfig,
    /// Remote HTTP provider settings.
    #[serde(default)]
    pub http: HttpBlobConfig,
}

impl Default for BlobConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            local: LocalBlobConfig::default(),
            http: HttpBlobConfig::default(),
        }
    }
}

/// Local directory provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalBlobConfig {
    /// Directory uploads are written to.
    #[serde(default = "default_root")]
    pub root: String,
    /// Base URL under which `root` is served back.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

impl Default for LocalBlobConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            public_base_url: default_public_base_url(),
        }
    }
}

/// Remote HTTP provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpBlobConfig {
    /// Upload endpoint accepting a multipart `file` field.
    #[serde(default)]
    pub endpoint: String,
    /// Request timeout in seconds.
    #[serde(default = "default_http_timeout")]
    pub timeout_seconds: u64,
}

impl Default for HttpBlobConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            timeout_seconds: default_http_timeout(),
        }
    }
}

fn default_provider() -> String {
    "local".to_string()
}

fn default_root() -> String {
    "data/blobs".to_string()
}

fn default_public_base_url() -> String {
    "http://localhost:8000/blobs".to_string()
}

fn default_http_timeout() -> u64 {
    30
}
