//! Redis list queue broker (`RPUSH` / `BLPOP`).

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use tokio::sync::Mutex;
use tracing::debug;

use printquote_core::error::{AppError, ErrorKind};
use printquote_core::result::AppResult;
use printquote_core::traits::QueueBroker;

use super::client::RedisClient;

/// Extra time allowed for a `BLPOP` reply beyond its server-side timeout.
const RESPONSE_GRACE: Duration = Duration::from_secs(2);

/// Redis-backed queue broker.
///
/// Blocking pops run on dedicated connections kept in a small idle pool so
/// that several worker loops can block at the same time.
pub struct RedisQueueBroker {
    /// Redis client.
    client: RedisClient,
    /// Upper bound for a single blocking pop.
    max_block: Duration,
    /// Idle blocking connections.
    idle: Mutex<Vec<MultiplexedConnection>>,
}

impl std::fmt::Debug for RedisQueueBroker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisQueueBroker")
            .field("client", &self.client)
            .field("max_block", &self.max_block)
            .finish_non_exhaustive()
    }
}

impl RedisQueueBroker {
    /// Create a new broker. Pops never block longer than `max_block`.
    pub fn new(client: RedisClient, max_block: Duration) -> Self {
        Self {
            client,
            max_block: max_block.max(Duration::from_millis(100)),
            idle: Mutex::new(Vec::new()),
        }
    }

    /// Map a Redis error to an AppError.
    fn map_err(e: redis::RedisError) -> AppError {
        AppError::with_source(ErrorKind::Store, format!("Redis error: {e}"), e)
    }

    async fn checkout(&self) -> AppResult<MultiplexedConnection> {
        if let Some(conn) = self.idle.lock().await.pop() {
            return Ok(conn);
        }
        self.client
            .blocking_connection(self.max_block + RESPONSE_GRACE)
            .await
    }
}

#[async_trait]
impl QueueBroker for RedisQueueBroker {
    fn provider_type(&self) -> &str {
        "redis"
    }

    async fn push(&self, queue: &str, payload: &str) -> AppResult<()> {
        let key = self.client.prefixed_key(queue);
        let mut conn = self.client.conn_mut();
        let length: u64 = redis::cmd("RPUSH")
            .arg(&key)
            .arg(payload)
            .query_async(&mut conn)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Enqueue, format!("Failed to enqueue job: {e}"), e)
            })?;
        debug!(queue = %key, length, "Pushed job payload");
        Ok(())
    }

    async fn pop_blocking(&self, queue: &str, timeout: Duration) -> AppResult<Option<String>> {
        let key = self.client.prefixed_key(queue);
        let wait = timeout.min(self.max_block);

        // A zero BLPOP timeout blocks forever.
        if wait.is_zero() {
            let mut conn = self.client.conn_mut();
            let popped: Option<String> = redis::cmd("LPOP")
                .arg(&key)
                .query_async(&mut conn)
                .await
                .map_err(Self::map_err)?;
            return Ok(popped);
        }

        let mut conn = self.checkout().await?;
        let reply: Result<Option<(String, String)>, _> = redis::cmd("BLPOP")
            .arg(&key)
            .arg(wait.as_secs_f64())
            .query_async(&mut conn)
            .await;

        match reply {
            Ok(popped) => {
                self.idle.lock().await.push(conn);
                Ok(popped.map(|(_, payload)| payload))
            }
            // The connection state is unknown after an error; drop it.
            Err(e) => Err(Self::map_err(e)),
        }
    }

    async fn len(&self, queue: &str) -> AppResult<u64> {
        let key = self.client.prefixed_key(queue);
        let mut conn = self.client.conn_mut();
        let length: u64 = redis::cmd("LLEN")
            .arg(&key)
            .query_async(&mut conn)
            .await
            .map_err(Self::map_err)?;
        Ok(length)
    }

    async fn health_check(&self) -> AppResult<bool> {
        let mut conn = self.client.conn_mut();
        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(Self::map_err)?;
        Ok(pong == "PONG")
    }
}
