//! Queue broker trait for the admission-to-worker hand-off.

use std::time::Duration;

use async_trait::async_trait;

use crate::result::AppResult;

/// A durable, ordered, multi-producer/multi-consumer list.
///
/// `pop_blocking` hands each entry to exactly one caller. Once removed the
/// broker keeps no record of the entry.
#[async_trait]
pub trait QueueBroker: Send + Sync + std::fmt::Debug + 'static {
    /// Return the backend type name (e.g., "redis", "memory").
    fn provider_type(&self) -> &str;

    /// Append a payload to the tail of the named queue.
    async fn push(&self, queue: &str, payload: &str) -> AppResult<()>;

    /// Remove one payload from the head of the named queue, waiting up to
    /// `timeout` for one to arrive. Returns `None` when the wait elapses.
    async fn pop_blocking(&self, queue: &str, timeout: Duration) -> AppResult<Option<String>>;

    /// Number of payloads currently waiting in the named queue.
    async fn len(&self, queue: &str) -> AppResult<u64>;

    /// Check that the backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}
