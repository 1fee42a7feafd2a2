//! # printquote-entity
//!
//! Domain models for PrintQuote. Every struct in this crate is either a
//! wire record (queue payload, store value) or a domain value object. All
//! entities derive `Debug`, `Clone`, `Serialize`, and `Deserialize`.

pub mod failure;
pub mod job;
pub mod quote;
