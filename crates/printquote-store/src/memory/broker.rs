//! In-memory queue broker.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::{Mutex, Notify};
use tokio::time::Instant;
use tracing::debug;

use printquote_core::result::AppResult;
use printquote_core::traits::QueueBroker;

#[derive(Debug, Default)]
struct QueueSlot {
    items: Mutex<VecDeque<String>>,
    ready: Notify,
}

/// In-memory FIFO queues keyed by name.
///
/// Each pop removes under the queue's lock, so an entry is handed to one
/// caller only.
#[derive(Debug, Clone, Default)]
pub struct MemoryQueueBroker {
    queues: Arc<DashMap<String, Arc<QueueSlot>>>,
}

impl MemoryQueueBroker {
    /// Create an empty broker.
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, queue: &str) -> Arc<QueueSlot> {
        Arc::clone(self.queues.entry(queue.to_string()).or_default().value())
    }
}

#[async_trait]
impl QueueBroker for MemoryQueueBroker {
    fn provider_type(&self) -> &str {
        "memory"
    }

    async fn push(&self, queue: &str, payload: &str) -> AppResult<()> {
        let slot = self.slot(queue);
        let length = {
            let mut items = slot.items.lock().await;
            items.push_back(payload.to_string());
            items.len()
        };
        slot.ready.notify_one();
        debug!(queue, length, "Pushed job payload");
        Ok(())
    }

    async fn pop_blocking(&self, queue: &str, timeout: Duration) -> AppResult<Option<String>> {
        let slot = self.slot(queue);
        let deadline = Instant::now() + timeout;

        loop {
            // Register interest before checking so a push in between is not missed.
            let notified = slot.ready.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if let Some(payload) = slot.items.lock().await.pop_front() {
                return Ok(Some(payload));
            }

            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return Ok(None);
            }
        }
    }

    async fn len(&self, queue: &str) -> AppResult<u64> {
        let slot = self.slot(queue);
        let length = slot.items.lock().await.len();
        Ok(length as u64)
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[tokio::test]
    async fn test_fifo_order() {
        let broker = MemoryQueueBroker::new();
        broker.push("q", "a").await.unwrap();
        broker.push("q", "b").await.unwrap();
        assert_eq!(broker.len("q").await.unwrap(), 2);
        let wait = Duration::from_millis(10);
        assert_eq!(broker.pop_blocking("q", wait).await.unwrap(), Some("a".into()));
        assert_eq!(broker.pop_blocking("q", wait).await.unwrap(), Some("b".into()));
        assert_eq!(broker.len("q").await.unwrap(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pop_times_out_on_empty_queue() {
        let broker = MemoryQueueBroker::new();
        let popped = broker
            .pop_blocking("q", Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(popped, None);
    }

    #[tokio::test]
    async fn test_blocked_pop_wakes_on_push() {
        let broker = MemoryQueueBroker::new();
        let waiter = {
            let broker = broker.clone();
            tokio::spawn(async move { broker.pop_blocking("q", Duration::from_secs(5)).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        broker.push("q", "job").await.unwrap();
        assert_eq!(waiter.await.unwrap().unwrap(), Some("job".to_string()));
    }

    #[tokio::test]
    async fn test_racing_consumers_each_entry_delivered_once() {
        let broker = MemoryQueueBroker::new();
        for i in 0..200 {
            broker.push("q", &i.to_string()).await.unwrap();
        }

        let mut handles = Vec::new();
        for _ in 0..8 {
            let broker = broker.clone();
            handles.push(tokio::spawn(async move {
                let mut got = Vec::new();
                while let Some(item) = broker
                    .pop_blocking("q", Duration::from_millis(50))
                    .await
                    .unwrap()
                {
                    got.push(item);
                }
                got
            }));
        }

        let mut seen = HashSet::new();
        let mut total = 0;
        for handle in handles {
            for item in handle.await.unwrap() {
                total += 1;
                seen.insert(item);
            }
        }
        assert_eq!(total, 200);
        assert_eq!(seen.len(), 200);
    }
}
