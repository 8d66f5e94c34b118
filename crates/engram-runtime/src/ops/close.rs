use serde::{Deserialize, Serialize};

use engram_engine::Orchestrator;
use engram_types::{EpisodeId, IndexOutcome, TriggerKind};

use crate::content::ContentSource;
use crate::error::{Error, Result};

/// Explicit close signal, typically arriving from a tool call or editor
/// hook when a conversation ends
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CloseRequest {
    /// Session to close; defaults to the caller's current session
    pub session_id: Option<String>,
    /// Free-text reason, echoed into the report for audit logs
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseOutcome {
    Skipped,
    Replaced,
    FirstIndexed,
    Busy,
    Error,
}

/// Structured result handed back to the explicit-close caller
#[derive(Debug, Clone, Serialize)]
pub struct CloseReport {
    pub session_id: String,
    pub outcome: CloseOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode_id: Option<EpisodeId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Explicit-close trigger adapter: resolves the target session, fetches its
/// filtered content, and funnels into the orchestrator. Content-driven, so
/// it bypasses the inactivity threshold entirely.
pub struct CloseService<'a> {
    orchestrator: &'a Orchestrator,
    source: &'a dyn ContentSource,
}

impl<'a> CloseService<'a> {
    pub fn new(orchestrator: &'a Orchestrator, source: &'a dyn ContentSource) -> Self {
        Self {
            orchestrator,
            source,
        }
    }

    /// Run one explicit close. Write failures come back as a structured
    /// `Error` outcome (the caller gets them synchronously); infrastructure
    /// failures (state store) propagate as `Err`.
    pub fn run(&self, request: CloseRequest) -> Result<CloseReport> {
        let session_id = match request.session_id {
            Some(id) => id,
            None => self.source.current_session_id().ok_or_else(|| {
                Error::InvalidOperation(
                    "No session_id given and the content source has no current session".to_string(),
                )
            })?,
        };

        let content = self
            .source
            .filtered_content(&session_id)
            .map_err(Error::Content)?
            .ok_or_else(|| Error::UnknownSession(session_id.clone()))?;

        match self
            .orchestrator
            .attempt_index(&session_id, &content, TriggerKind::Explicit)
        {
            Ok(outcome) => Ok(report_from_outcome(session_id, request.reason, outcome)),
            Err(engram_engine::Error::Write(err)) => Ok(CloseReport {
                session_id,
                outcome: CloseOutcome::Error,
                episode_id: None,
                reason: request.reason,
                error: Some(err.to_string()),
            }),
            Err(err) => Err(err.into()),
        }
    }
}

fn report_from_outcome(
    session_id: String,
    reason: Option<String>,
    outcome: IndexOutcome,
) -> CloseReport {
    let (close_outcome, episode_id) = match outcome {
        IndexOutcome::Skipped => (CloseOutcome::Skipped, None),
        IndexOutcome::FirstIndexed { episode_id } => {
            (CloseOutcome::FirstIndexed, Some(episode_id))
        }
        IndexOutcome::Replaced { episode_id } => (CloseOutcome::Replaced, Some(episode_id)),
        IndexOutcome::Busy => (CloseOutcome::Busy, None),
    };

    CloseReport {
        session_id,
        outcome: close_outcome,
        episode_id,
        reason,
        error: None,
    }
}
