//! Store manager that builds the configured backend pair.

use std::sync::Arc;

use tracing::info;

use printquote_core::config::queue::QueueConfig;
use printquote_core::config::store::StoreConfig;
use printquote_core::error::AppError;
use printquote_core::result::AppResult;
use printquote_core::traits::{KeyValueStore, QueueBroker};

/// Holds the status/result store and the queue broker.
///
/// Both come from the same backend so one `provider` setting moves them
/// together.
#[derive(Debug, Clone)]
pub struct StoreManager {
    /// Status/result store.
    store: Arc<dyn KeyValueStore>,
    /// Queue broker.
    broker: Arc<dyn QueueBroker>,
}

impl StoreManager {
    /// Create the backends from configuration.
    pub async fn new(config: &StoreConfig, queue: &QueueConfig) -> AppResult<Self> {
        let (store, broker): (Arc<dyn KeyValueStore>, Arc<dyn QueueBroker>) =
            match config.provider.as_str() {
                #[cfg(feature = "redis-backend")]
                "redis" => {
                    info!("Initializing Redis store and queue broker");
                    let client = crate::redis::RedisClient::connect(&config.redis).await?;
                    let max_block = std::time::Duration::from_secs(queue.pop_timeout_seconds);
                    (
                        Arc::new(crate::redis::RedisKeyValueStore::new(client.clone())),
                        Arc::new(crate::redis::RedisQueueBroker::new(client, max_block)),
                    )
                }
                #[cfg(feature = "memory")]
                "memory" => {
                    info!("Initializing in-memory store and queue broker");
                    (
                        Arc::new(crate::memory::MemoryKeyValueStore::new()),
                        Arc::new(crate::memory::MemoryQueueBroker::new()),
                    )
                }
                other => {
                    return Err(AppError::configuration(format!(
                        "Unknown store provider: '{other}'. Supported: memory, redis"
                    )));
                }
            };

        Ok(Self { store, broker })
    }

    /// Create a manager from existing backends (for testing).
    pub fn from_parts(store: Arc<dyn KeyValueStore>, broker: Arc<dyn QueueBroker>) -> Self {
        Self { store, broker }
    }

    /// The status/result store.
    pub fn store(&self) -> Arc<dyn KeyValueStore> {
        Arc::clone(&self.store)
    }

    /// The queue broker.
    pub fn broker(&self) -> Arc<dyn QueueBroker> {
        Arc::clone(&self.broker)
    }

    /// Verify both backends answer. Startup refuses to continue on failure.
    pub async fn ensure_reachable(&self) -> AppResult<()> {
        if !self.store.health_check().await? {
            return Err(AppError::service_unavailable(format!(
                "{} store did not answer the health check",
                self.store.provider_type()
            )));
        }
        if !self.broker.health_check().await? {
            return Err(AppError::service_unavailable(format!(
                "{} queue broker did not answer the health check",
                self.broker.provider_type()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_provider_is_configuration_error() {
        let config = StoreConfig {
            provider: "etcd".to_string(),
            ..StoreConfig::default()
        };
        let err = StoreManager::new(&config, &QueueConfig::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind, printquote_core::error::ErrorKind::Configuration);
    }

    #[cfg(feature = "memory")]
    #[tokio::test]
    async fn test_memory_backends_are_reachable() {
        let manager = StoreManager::new(&StoreConfig::default(), &QueueConfig::default())
            .await
            .unwrap();
        manager.ensure_reachable().await.unwrap();
        assert_eq!(manager.store().provider_type(), "memory");
        assert_eq!(manager.broker().provider_type(), "memory");
    }
}
