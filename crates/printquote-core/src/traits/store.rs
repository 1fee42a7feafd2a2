//! Key-value store trait backing job status and result records.

use std::time::Duration;

use async_trait::async_trait;

use crate::result::AppResult;

/// Trait for TTL-bounded key-value backends (Redis or in-memory).
///
/// All values are strings; callers serialize structured records as JSON.
/// Every operation is atomic per call. Expired keys behave exactly like
/// keys that were never written.
#[async_trait]
pub trait KeyValueStore: Send + Sync + std::fmt::Debug + 'static {
    /// Return the backend type name (e.g., "redis", "memory").
    fn provider_type(&self) -> &str;

    /// Get a value by key. Returns `None` if the key does not exist or has expired.
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Set a value with a TTL, replacing any existing value.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()>;

    /// Set a value only if the key does not already exist (NX).
    /// Returns `true` if the value was set, `false` if the key already existed.
    async fn set_nx(&self, key: &str, value: &str, ttl: Duration) -> AppResult<bool>;

    /// Replace the value only if it currently equals `expected`.
    ///
    /// The remaining TTL of the key is preserved. Returns `false` when the
    /// key is absent or holds a different value.
    async fn compare_and_swap(&self, key: &str, expected: &str, new: &str) -> AppResult<bool>;

    /// Time left before the key expires, `None` when it is absent or
    /// carries no expiry.
    async fn remaining_ttl(&self, key: &str) -> AppResult<Option<Duration>>;

    /// Delete a key. Deleting an absent key is not an error.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Check whether a key exists.
    async fn exists(&self, key: &str) -> AppResult<bool>;

    /// Check that the backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}
