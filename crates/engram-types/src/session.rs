use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::project::{EpisodeId, ProjectNamespace};

/// Lifecycle state of a tracked session.
///
/// Transitions are driven exclusively by the closure orchestrator:
/// `Active`/`Inactive` -> `Indexing` -> `Indexed`, reverting to the
/// pre-attempt state on write failure. No record is left in `Indexing`
/// after an attempt returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    /// Content still changing
    Active,
    /// No recent activity, not yet indexed
    Inactive,
    /// Write in flight; doubles as the per-session mutual-exclusion flag
    Indexing,
    /// Durable episode exists and matches the current content hash
    Indexed,
}

impl LifecycleState {
    /// Whether an indexing attempt may start from this state
    pub fn is_attemptable(&self) -> bool {
        !matches!(self, LifecycleState::Indexing)
    }
}

/// Which trigger initiated an indexing attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    /// Direct close signal (tool call or hook)
    Explicit,
    /// On-demand indexing just before a search reads stale scope
    Lazy,
    /// Periodic inactivity sweep
    Timeout,
}

/// Outcome of one `attempt_index` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum IndexOutcome {
    /// Content unchanged since the last successful write; no graph call made
    Skipped,
    /// Session had never been indexed; a fresh episode was inserted
    FirstIndexed { episode_id: EpisodeId },
    /// Prior episode deleted and replaced with current content
    Replaced { episode_id: EpisodeId },
    /// Another attempt for this session is already in flight
    Busy,
}

impl IndexOutcome {
    /// Episode identifier produced by this attempt, if any
    pub fn episode_id(&self) -> Option<&EpisodeId> {
        match self {
            IndexOutcome::FirstIndexed { episode_id } | IndexOutcome::Replaced { episode_id } => {
                Some(episode_id)
            }
            IndexOutcome::Skipped | IndexOutcome::Busy => None,
        }
    }

    /// Whether this attempt performed a graph write
    pub fn wrote(&self) -> bool {
        self.episode_id().is_some()
    }
}

/// Per-session lifecycle record, owned exclusively by the state store.
///
/// Exactly one record exists per `session_id`; creation is implicit on the
/// first trigger for an unseen session. `episode_id` is present if and only
/// if the state is `Indexed`, and `content_hash` only ever changes as a side
/// effect of a successful episode write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Opaque stable identifier of the transcript/session
    pub session_id: String,
    /// Location of the backing transcript (display only, never a dedup key)
    pub source_path: String,
    /// Stable identifier of the owning project
    pub project_namespace: ProjectNamespace,
    /// Current lifecycle state
    pub lifecycle_state: LifecycleState,
    /// Fingerprint of the last successfully indexed content
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
    /// Episode currently representing this session in the graph store
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode_id: Option<EpisodeId>,
    /// Most recent observed content change
    pub last_activity_at: DateTime<Utc>,
    /// Most recent successful write
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_indexed_at: Option<DateTime<Utc>>,
    /// Messages observed at last hash computation (diagnostic only)
    pub message_count: usize,
}

impl SessionRecord {
    /// Fresh record for a session observed for the first time
    pub fn new(
        session_id: impl Into<String>,
        source_path: impl Into<String>,
        project_namespace: ProjectNamespace,
        observed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            source_path: source_path.into(),
            project_namespace,
            lifecycle_state: LifecycleState::Active,
            content_hash: None,
            episode_id: None,
            last_activity_at: observed_at,
            last_indexed_at: None,
            message_count: 0,
        }
    }

    /// Whether the given fingerprint matches the last indexed content
    pub fn matches_hash(&self, hash: &str) -> bool {
        self.content_hash.as_deref() == Some(hash)
    }

    /// Whether this session needs (re-)indexing for the given fingerprint
    pub fn is_stale(&self, hash: &str) -> bool {
        self.lifecycle_state != LifecycleState::Indexed || !self.matches_hash(hash)
    }
}
