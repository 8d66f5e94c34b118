pub mod error;
pub mod fingerprint;
pub mod graph;
pub mod orchestrator;
pub mod writer;

pub use error::{Error, Result};
pub use fingerprint::{canonical_content, fingerprint};
pub use graph::GraphStore;
pub use orchestrator::Orchestrator;
pub use writer::EpisodeWriter;
