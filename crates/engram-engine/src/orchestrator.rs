use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use engram_store::SessionStore;
use engram_types::{
    EpisodeId, IndexOutcome, LifecycleState, SessionContent, SessionRecord, TriggerKind,
};

use crate::error::{Error, Result};
use crate::fingerprint::fingerprint;
use crate::graph::GraphStore;
use crate::writer::EpisodeWriter;

/// Decision taken inside the store's critical section for one attempt
enum Claim {
    /// Another attempt holds the `Indexing` flag
    Busy,
    /// Content unchanged since the last successful write
    Skip,
    /// Attempt claimed; snapshot of what the write needs
    Proceed {
        prior_state: LifecycleState,
        previous_episode: Option<EpisodeId>,
    },
}

/// The single serialization point for session closure.
///
/// Every trigger kind funnels through `attempt_index`; the `Indexing`
/// lifecycle state, flipped inside one store critical section, is the only
/// mutual-exclusion mechanism. The graph write itself runs outside any
/// lock, so attempts for different sessions proceed in parallel.
pub struct Orchestrator {
    store: Arc<SessionStore>,
    writer: EpisodeWriter,
}

impl Orchestrator {
    pub fn new(store: Arc<SessionStore>, graph: Arc<dyn GraphStore>) -> Self {
        Self {
            store,
            writer: EpisodeWriter::new(graph),
        }
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Run one indexing attempt for a session.
    ///
    /// Returns `Busy` when another attempt is in flight, `Skipped` when the
    /// content fingerprint matches the last indexed version, and
    /// `FirstIndexed`/`Replaced` after a successful write. On write failure
    /// the record reverts to its pre-attempt state and stays eligible for
    /// retry with the same stale hash.
    pub fn attempt_index(
        &self,
        session_id: &str,
        content: &SessionContent,
        trigger: TriggerKind,
    ) -> Result<IndexOutcome> {
        let new_hash = fingerprint(&content.messages);
        let message_count = content.messages.len();

        let claim = self.store.update(session_id, |entry| {
            let record = entry.get_or_insert_with(|| {
                SessionRecord::new(
                    session_id,
                    &content.source_path,
                    content.project_namespace.clone(),
                    Utc::now(),
                )
            });

            if !record.lifecycle_state.is_attemptable() {
                return Claim::Busy;
            }

            record.message_count = message_count;

            if record.lifecycle_state == LifecycleState::Indexed && record.matches_hash(&new_hash)
            {
                return Claim::Skip;
            }

            let prior_state = record.lifecycle_state;
            record.lifecycle_state = LifecycleState::Indexing;
            Claim::Proceed {
                prior_state,
                previous_episode: record.episode_id.clone(),
            }
        })?;

        let (prior_state, previous_episode) = match claim {
            Claim::Busy => {
                tracing::debug!(session_id, ?trigger, "Indexing already in flight");
                return Ok(IndexOutcome::Busy);
            }
            Claim::Skip => {
                tracing::debug!(session_id, ?trigger, hash = %new_hash, "Content unchanged");
                return Ok(IndexOutcome::Skipped);
            }
            Claim::Proceed {
                prior_state,
                previous_episode,
            } => (prior_state, previous_episode),
        };

        // Graph write happens outside the store lock. If content changes
        // again while this write is in flight, the episode lands one
        // version stale; the next trigger sees the newer hash and replaces
        // it.
        let write_result = self.writer.replace(
            session_id,
            previous_episode.as_ref(),
            &content.messages,
            &content.project_namespace,
        );

        match write_result {
            Ok(episode_id) => {
                self.store.update(session_id, |entry| {
                    if let Some(record) = entry {
                        record.episode_id = Some(episode_id.clone());
                        record.content_hash = Some(new_hash.clone());
                        record.last_indexed_at = Some(Utc::now());
                        record.lifecycle_state = LifecycleState::Indexed;
                    }
                })?;

                let outcome = if previous_episode.is_some() {
                    IndexOutcome::Replaced { episode_id }
                } else {
                    IndexOutcome::FirstIndexed { episode_id }
                };
                tracing::info!(session_id, ?trigger, hash = %new_hash, ?outcome, "Session indexed");
                Ok(outcome)
            }
            Err(err) => {
                self.store.update(session_id, |entry| {
                    if let Some(record) = entry {
                        record.lifecycle_state = prior_state;
                    }
                })?;

                tracing::warn!(
                    session_id,
                    ?trigger,
                    error = %err,
                    "Episode write failed; session state reverted for retry"
                );
                Err(Error::Write(err))
            }
        }
    }

    /// Record fresh activity for a session, creating its record on first
    /// observation. A resumed `Inactive` session becomes `Active` again.
    pub fn mark_activity(&self, session_id: &str, content: &SessionContent) -> Result<()> {
        self.store.update(session_id, |entry| {
            let record = entry.get_or_insert_with(|| {
                SessionRecord::new(
                    session_id,
                    &content.source_path,
                    content.project_namespace.clone(),
                    Utc::now(),
                )
            });

            record.last_activity_at = Utc::now();
            if record.lifecycle_state == LifecycleState::Inactive {
                record.lifecycle_state = LifecycleState::Active;
            }
        })?;
        Ok(())
    }

    /// Timeout trigger: if the session has been `Active` with no activity
    /// for longer than the threshold, flip it to `Inactive` and run an
    /// indexing attempt. Returns `None` when the session has not timed out.
    pub fn sweep_timeout(
        &self,
        session_id: &str,
        inactivity_threshold: Duration,
        content: &SessionContent,
    ) -> Result<Option<IndexOutcome>> {
        let threshold = chrono::Duration::from_std(inactivity_threshold)
            .unwrap_or_else(|_| chrono::Duration::MAX);

        let timed_out = self.store.update(session_id, |entry| {
            let Some(record) = entry else {
                return false;
            };
            if record.lifecycle_state != LifecycleState::Active {
                return false;
            }
            if Utc::now() - record.last_activity_at <= threshold {
                return false;
            }
            record.lifecycle_state = LifecycleState::Inactive;
            true
        })?;

        if !timed_out {
            return Ok(None);
        }

        tracing::debug!(session_id, "Inactivity threshold exceeded");
        self.attempt_index(session_id, content, TriggerKind::Timeout)
            .map(Some)
    }
}
