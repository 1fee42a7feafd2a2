//! # printquote-worker
//!
//! Worker execution pipeline for PrintQuote. Each [`WorkerRunner`] is an
//! independent serial loop: pop one job, claim it, run the quotation
//! pipeline under a hard deadline inside a scoped workspace, then record the
//! terminal status. Parallelism comes from running more runners.

pub mod error;
pub mod fetch;
pub mod health;
pub mod pipeline;
pub mod pool;
pub mod runner;
pub mod workspace;

pub use error::StageError;
pub use fetch::{Fetcher, HttpFetcher};
pub use pipeline::QuotePipeline;
pub use pool::spawn_pool;
pub use runner::{JobOutcome, RunnerSettings, WorkerRunner};
pub use workspace::JobWorkspace;
