//! In-process store and queue broker.

pub mod broker;
pub mod store;

pub use broker::MemoryQueueBroker;
pub use store::MemoryKeyValueStore;
