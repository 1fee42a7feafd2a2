//! Status/result store configuration.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Status/result store configuration.
///
/// The same backend also hosts the queue broker, so switching `provider`
/// moves both.
#[derive(Debug, Clone, Validate, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Backend type: `"memory"` or `"redis"`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// TTL applied to `status:{id}`, `result:{id}` and `failure:{id}` keys.
    #[serde(default = "default_job_ttl")]
    #[validate(range(min = 1))]
    pub job_ttl_seconds: u64,
    /// Redis backend configuration.
    #[serde(default)]
    pub redis: RedisStoreConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            job_ttl_seconds: default_job_ttl(),
            redis: RedisStoreConfig::default(),
        }
    }
}

/// Redis backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisStoreConfig {
    /// Redis connection URL.
    #[serde(default = "default_redis_url")]
    pub url: String,
    /// Prefix prepended to every key and queue name.
    #[serde(default)]
    pub key_prefix: String,
}

impl Default for RedisStoreConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
            key_prefix: String::new(),
        }
    }
}

fn default_provider() -> String {
    "memory".to_string()
}

fn default_job_ttl() -> u64 {
    24 * 60 * 60
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}
