use anyhow::Result;

use engram_types::SessionContent;

/// Upstream boundary to the transcript filtering pipeline.
///
/// Responsibilities:
/// - Supply the current filtered, ordered content for a session on demand
///   (lazy and timeout triggers fetch rather than being pushed)
/// - Know which session belongs to the current caller, for explicit close
///   requests that omit a session id
///
/// The engine treats the returned messages as opaque text blocks; parsing,
/// summarization, and redaction all happen on the far side of this trait.
pub trait ContentSource: Send + Sync {
    /// Current filtered content for a session, or `None` if the source no
    /// longer tracks it
    fn filtered_content(&self, session_id: &str) -> Result<Option<SessionContent>>;

    /// The caller's current session, if the source can tell
    fn current_session_id(&self) -> Option<String> {
        None
    }
}
