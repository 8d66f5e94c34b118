use serde::{Deserialize, Serialize};

/// One role-tagged text block of filtered session content.
///
/// Produced upstream by the filtering/summarization pipeline; the engine
/// treats the text as opaque. Order matters: the fingerprint covers the
/// full ordered sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilteredMessage {
    /// Speaker role (e.g., "user", "agent", "system")
    pub role: String,
    /// Filtered/redacted message text
    pub text: String,
}

impl FilteredMessage {
    pub fn new(role: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            text: text.into(),
        }
    }

    /// Canonical single-line form used for fingerprinting and episode bodies
    pub fn canonical_line(&self) -> String {
        format!("[{}]: {}", self.role, self.text)
    }
}

/// The full filtered payload the upstream pipeline supplies for a session
/// when it judges the content has changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContent {
    /// Backing transcript location (native path, display only)
    pub source_path: String,
    /// Owning project, independent of OS path format
    pub project_namespace: crate::ProjectNamespace,
    /// Ordered role-tagged text blocks
    pub messages: Vec<FilteredMessage>,
}

impl SessionContent {
    pub fn new(
        source_path: impl Into<String>,
        project_namespace: crate::ProjectNamespace,
        messages: Vec<FilteredMessage>,
    ) -> Self {
        Self {
            source_path: source_path.into(),
            project_namespace,
            messages,
        }
    }
}
