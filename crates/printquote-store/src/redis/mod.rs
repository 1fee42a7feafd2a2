//! Redis store and queue broker.

pub mod broker;
pub mod client;
pub mod store;

pub use broker::RedisQueueBroker;
pub use client::RedisClient;
pub use store::RedisKeyValueStore;
