use std::sync::Arc;

use anyhow::{Context, Result};

use engram_types::{EpisodeId, FilteredMessage, ProjectNamespace};

use crate::fingerprint::canonical_content;
use crate::graph::GraphStore;

/// Performs the delete-old/write-new episode operation against the graph
/// store.
///
/// Replacement is delete-then-insert, not a transaction. A crash between
/// the two leaves no episode and a stale `content_hash` in the state store,
/// which forces a clean re-write on the next trigger; that retry path is
/// the accepted recovery mechanism.
pub struct EpisodeWriter {
    graph: Arc<dyn GraphStore>,
}

impl EpisodeWriter {
    pub fn new(graph: Arc<dyn GraphStore>) -> Self {
        Self { graph }
    }

    /// Delete `previous_episode_id` (when present) and insert the current
    /// content, returning the new episode identifier
    pub fn replace(
        &self,
        session_id: &str,
        previous_episode_id: Option<&EpisodeId>,
        messages: &[FilteredMessage],
        namespace: &ProjectNamespace,
    ) -> Result<EpisodeId> {
        if let Some(previous) = previous_episode_id {
            self.graph
                .delete(previous)
                .with_context(|| format!("Failed to delete episode {} for session {}", previous, session_id))?;
            tracing::debug!(session_id, episode_id = %previous, "Deleted superseded episode");
        }

        let content = canonical_content(messages);
        let episode_id = self
            .graph
            .insert(&content, namespace)
            .with_context(|| format!("Failed to insert episode for session {}", session_id))?;

        tracing::debug!(session_id, episode_id = %episode_id, "Inserted episode");
        Ok(episode_id)
    }
}
