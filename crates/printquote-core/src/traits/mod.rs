//! Core traits defined in `printquote-core` and implemented by other crates.

pub mod blob;
pub mod broker;
pub mod store;

pub use blob::BlobStorage;
pub use broker::QueueBroker;
pub use store::KeyValueStore;
