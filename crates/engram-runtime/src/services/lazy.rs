use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Semaphore;

use engram_engine::Orchestrator;
use engram_types::{IndexOutcome, ProjectNamespace, SessionRecord, TriggerKind};

use crate::content::ContentSource;
use crate::error::Result;

/// Result of one session's pass through the lazy pre-check.
///
/// A failed session carries its error here instead of failing the whole
/// batch; the other sessions still complete.
#[derive(Debug, Clone, Serialize)]
pub struct SessionAttempt {
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<IndexOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SessionAttempt {
    fn failed(session_id: String, error: impl ToString) -> Self {
        Self {
            session_id,
            outcome: None,
            error: Some(error.to_string()),
        }
    }
}

/// Lazy pre-check trigger adapter.
///
/// A search over some scope calls `ensure_indexed` first and awaits it, so
/// results are never missing content that was already known to be stale.
/// Every session in scope is passed through `attempt_index`; up-to-date
/// ones come back `Skipped` without a graph write, so staleness detection
/// and indexing share one code path. Attempts run in parallel, bounded by
/// the configured batch concurrency.
pub struct LazyIndexService {
    orchestrator: Arc<Orchestrator>,
    source: Arc<dyn ContentSource>,
    concurrency: usize,
}

impl LazyIndexService {
    pub fn new(
        orchestrator: Arc<Orchestrator>,
        source: Arc<dyn ContentSource>,
        concurrency: usize,
    ) -> Self {
        Self {
            orchestrator,
            source,
            concurrency: concurrency.max(1),
        }
    }

    /// Block (asynchronously) until every session in scope has been passed
    /// through an indexing attempt, returning per-session results
    pub async fn ensure_indexed(
        &self,
        scopes: &[ProjectNamespace],
    ) -> Result<Vec<SessionAttempt>> {
        let candidates = self.orchestrator.store().in_scope(scopes)?;
        if candidates.is_empty() {
            return Ok(vec![]);
        }

        tracing::debug!(
            sessions = candidates.len(),
            concurrency = self.concurrency,
            "Lazy pre-check starting"
        );

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut handles = Vec::with_capacity(candidates.len());

        for record in candidates {
            let semaphore = semaphore.clone();
            let orchestrator = self.orchestrator.clone();
            let source = self.source.clone();
            let session_id = record.session_id.clone();

            handles.push((
                session_id,
                tokio::spawn(async move {
                    let _permit = match semaphore.acquire_owned().await {
                        Ok(permit) => permit,
                        Err(err) => {
                            return SessionAttempt::failed(record.session_id.clone(), err);
                        }
                    };
                    // The orchestrator is synchronous; keep its graph write
                    // off the async workers
                    let blocking = tokio::task::spawn_blocking(move || {
                        attempt_one(&orchestrator, source.as_ref(), &record)
                    });
                    match blocking.await {
                        Ok(attempt) => attempt,
                        Err(err) => SessionAttempt::failed(String::new(), err),
                    }
                }),
            ));
        }

        let mut results = Vec::with_capacity(handles.len());
        for (session_id, handle) in handles {
            let attempt = match handle.await {
                Ok(mut attempt) => {
                    if attempt.session_id.is_empty() {
                        attempt.session_id = session_id;
                    }
                    attempt
                }
                Err(err) => SessionAttempt::failed(session_id, err),
            };
            if let Some(error) = &attempt.error {
                tracing::warn!(
                    session_id = %attempt.session_id,
                    error = %error,
                    "Lazy indexing attempt failed; session stays eligible for retry"
                );
            }
            results.push(attempt);
        }

        Ok(results)
    }
}

fn attempt_one(
    orchestrator: &Orchestrator,
    source: &dyn ContentSource,
    record: &SessionRecord,
) -> SessionAttempt {
    let session_id = record.session_id.clone();

    let content = match source.filtered_content(&session_id) {
        Ok(Some(content)) => content,
        Ok(None) => {
            return SessionAttempt::failed(
                session_id,
                "content source no longer tracks this session",
            );
        }
        Err(err) => return SessionAttempt::failed(session_id, err),
    };

    match orchestrator.attempt_index(&session_id, &content, TriggerKind::Lazy) {
        Ok(outcome) => SessionAttempt {
            session_id,
            outcome: Some(outcome),
            error: None,
        },
        Err(err) => SessionAttempt::failed(session_id, err),
    }
}
