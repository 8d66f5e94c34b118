use anyhow::Result;

use engram_types::{EpisodeId, ProjectNamespace};

/// Downstream boundary to the graph knowledge store.
///
/// Responsibilities:
/// - Mint an episode identifier for inserted content
/// - Remove an episode on request (cascading derived relationships is the
///   graph's concern, not the engine's)
///
/// The engine knows nothing about the graph's internal schema. There is no
/// cross-call transaction boundary: delete and insert are independent
/// operations, and the orchestrator's hash-driven retry covers a crash
/// between them.
pub trait GraphStore: Send + Sync {
    /// Insert content under the given namespace and return the fresh
    /// episode identifier
    fn insert(&self, content: &str, namespace: &ProjectNamespace) -> Result<EpisodeId>;

    /// Delete an existing episode
    fn delete(&self, episode_id: &EpisodeId) -> Result<()>;
}
