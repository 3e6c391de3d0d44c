//! Snapshot retrieval.
//!
//! A small blocking HTTP client and the sources built on it.

pub mod client;
pub mod source;
