//! # printquote-store
//!
//! Status/result store and queue broker implementations for PrintQuote.
//! Supports two modes:
//!
//! - **memory**: In-process store and queue using [dashmap](https://crates.io/crates/dashmap)
//!   and `tokio` synchronization. Only meaningful when the API and the
//!   workers share one process.
//! - **redis**: Redis-backed store (`SET EX`/`NX`, Lua compare-and-swap) and
//!   queue (`RPUSH`/`BLPOP`) using the [redis](https://crates.io/crates/redis) crate.
//!
//! The backend is selected at runtime based on configuration.

pub mod keys;
#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;
#[cfg(feature = "redis-backend")]
pub mod redis;

pub use provider::StoreManager;
