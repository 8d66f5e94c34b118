//! Test doubles shared across the engram workspace.
//!
//! `MemoryGraph` stands in for the graph knowledge store and records every
//! insert/delete so tests can assert exact write counts; failures and
//! latency can be injected per call. `StaticContentSource` stands in for
//! the upstream filtering pipeline with a fixed session-to-content map.

mod content;
mod graph;

pub use content::StaticContentSource;
pub use graph::{FailMode, MemoryGraph};
