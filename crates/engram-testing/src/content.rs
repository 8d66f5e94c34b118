use std::collections::HashMap;
use std::sync::Mutex;

use engram_runtime::ContentSource;
use engram_types::{FilteredMessage, ProjectNamespace, SessionContent};

/// `ContentSource` double backed by a fixed session-to-content map.
///
/// Content can be swapped mid-test to simulate a session growing between
/// triggers.
#[derive(Default)]
pub struct StaticContentSource {
    contents: Mutex<HashMap<String, SessionContent>>,
    current_session: Mutex<Option<String>>,
}

impl StaticContentSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_content(&self, session_id: &str, content: SessionContent) {
        self.contents
            .lock()
            .unwrap()
            .insert(session_id.to_string(), content);
    }

    /// Convenience: register a session with role/text pairs under a
    /// namespace, with a synthetic source path
    pub fn set_messages(&self, session_id: &str, namespace: &str, pairs: &[(&str, &str)]) {
        let content = SessionContent::new(
            format!("/logs/{}.jsonl", session_id),
            ProjectNamespace::new(namespace),
            pairs
                .iter()
                .map(|(role, text)| FilteredMessage::new(*role, *text))
                .collect(),
        );
        self.set_content(session_id, content);
    }

    pub fn forget(&self, session_id: &str) {
        self.contents.lock().unwrap().remove(session_id);
    }

    pub fn set_current_session(&self, session_id: &str) {
        *self.current_session.lock().unwrap() = Some(session_id.to_string());
    }
}

impl ContentSource for StaticContentSource {
    fn filtered_content(&self, session_id: &str) -> anyhow::Result<Option<SessionContent>> {
        Ok(self.contents.lock().unwrap().get(session_id).cloned())
    }

    fn current_session_id(&self) -> Option<String> {
        self.current_session.lock().unwrap().clone()
    }
}
