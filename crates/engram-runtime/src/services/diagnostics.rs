use chrono::{DateTime, Utc};
use serde::Serialize;

use engram_store::SessionStore;
use engram_types::{LifecycleState, ProjectNamespace};

use crate::error::Result;

#[derive(Debug, Clone, Default)]
pub struct PendingSessionsRequest {
    /// Restrict to one project namespace
    pub scope: Option<ProjectNamespace>,
    /// Also list sessions already marked `Inactive`
    pub include_inactive: bool,
}

/// One not-yet-durable session, as shown by diagnostic tooling
#[derive(Debug, Clone, Serialize)]
pub struct PendingSession {
    pub session_id: String,
    pub lifecycle_state: LifecycleState,
    pub project_namespace: ProjectNamespace,
    pub last_activity_at: DateTime<Utc>,
    pub message_count: usize,
}

/// Read-only listing of sessions that have not reached `Indexed`.
/// Never mutates state; safe to call from monitoring loops.
pub struct DiagnosticsService<'a> {
    store: &'a SessionStore,
}

impl<'a> DiagnosticsService<'a> {
    pub fn new(store: &'a SessionStore) -> Self {
        Self { store }
    }

    pub fn pending_sessions(
        &self,
        request: &PendingSessionsRequest,
    ) -> Result<Vec<PendingSession>> {
        let records = self
            .store
            .pending(request.scope.as_ref(), request.include_inactive)?;

        Ok(records
            .into_iter()
            .map(|r| PendingSession {
                session_id: r.session_id,
                lifecycle_state: r.lifecycle_state,
                project_namespace: r.project_namespace,
                last_activity_at: r.last_activity_at,
                message_count: r.message_count,
            })
            .collect())
    }
}
