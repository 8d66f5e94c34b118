use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use engram_types::{LifecycleState, ProjectNamespace, SessionRecord};

use crate::error::{Error, Result};

// NOTE: Persistence design
//
// Why a single JSON file (not a database)?
// - The record set is small (one entry per tracked session) and read-mostly
// - Readers must never observe a partial record after a crash; a whole-file
//   write-to-temp-then-rename gives that without journaling machinery
// - A missing or unreadable file is recoverable state, not an error: the
//   engine re-learns sessions from triggers and re-indexes by hash
//
// Why a BTreeMap keyed by session_id?
// - Exactly-one-record-per-session is a map invariant, not a query
// - Stable key order keeps the on-disk file diffable across rewrites

/// Durable, crash-safe table of per-session lifecycle records.
///
/// All mutation goes through the internal mutex, held only for the
/// read-modify-write and the file rewrite, never across a graph call.
pub struct SessionStore {
    path: Option<PathBuf>,
    sessions: Mutex<BTreeMap<String, SessionRecord>>,
}

impl SessionStore {
    /// Open the store backed by the given state file, creating parent
    /// directories as needed. A missing or corrupt file starts empty.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let sessions = load_state_file(path);
        Ok(Self {
            path: Some(path.to_path_buf()),
            sessions: Mutex::new(sessions),
        })
    }

    /// Open a store with no backing file (tests and dry runs)
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            path: None,
            sessions: Mutex::new(BTreeMap::new()),
        })
    }

    pub fn get(&self, session_id: &str) -> Result<Option<SessionRecord>> {
        let sessions = self.lock()?;
        Ok(sessions.get(session_id).cloned())
    }

    /// Insert or replace one record and persist the store
    pub fn upsert(&self, record: SessionRecord) -> Result<()> {
        let mut sessions = self.lock()?;
        let session_id = record.session_id.clone();
        let previous = sessions.insert(session_id.clone(), record);
        if let Err(err) = self.persist(&sessions) {
            restore_entry(&mut sessions, &session_id, previous);
            return Err(err);
        }
        Ok(())
    }

    pub fn load_all(&self) -> Result<Vec<SessionRecord>> {
        let sessions = self.lock()?;
        Ok(sessions.values().cloned().collect())
    }

    /// Read-modify-write one session's record inside a single critical
    /// section.
    ///
    /// The closure receives the current record (`None` for an unseen
    /// session) and may create or mutate it in place. The store is
    /// persisted only when the record actually changed. This is the
    /// primitive the orchestrator builds its state transitions on; using
    /// separate `get`/`upsert` calls for a transition would let two
    /// triggers claim the same session concurrently.
    ///
    /// When persisting fails the in-memory record is rolled back to its
    /// prior value, so a transition that never reached disk does not
    /// linger in memory either.
    pub fn update<R>(
        &self,
        session_id: &str,
        f: impl FnOnce(&mut Option<SessionRecord>) -> R,
    ) -> Result<R> {
        let mut sessions = self.lock()?;
        let before = sessions.get(session_id).cloned();
        let mut entry = before.clone();

        let outcome = f(&mut entry);

        if entry != before {
            match entry {
                Some(record) => {
                    sessions.insert(session_id.to_string(), record);
                }
                None => {
                    sessions.remove(session_id);
                }
            }
            if let Err(err) = self.persist(&sessions) {
                restore_entry(&mut sessions, session_id, before);
                return Err(err);
            }
        }

        Ok(outcome)
    }

    /// All records whose project namespace is in the given scope set
    pub fn in_scope(&self, scopes: &[ProjectNamespace]) -> Result<Vec<SessionRecord>> {
        let sessions = self.lock()?;
        Ok(sessions
            .values()
            .filter(|r| scopes.contains(&r.project_namespace))
            .cloned()
            .collect())
    }

    /// Records not yet durable: everything outside `Indexed`, optionally
    /// filtered to one namespace and optionally excluding `Inactive`
    pub fn pending(
        &self,
        scope: Option<&ProjectNamespace>,
        include_inactive: bool,
    ) -> Result<Vec<SessionRecord>> {
        let sessions = self.lock()?;
        Ok(sessions
            .values()
            .filter(|r| r.lifecycle_state != LifecycleState::Indexed)
            .filter(|r| include_inactive || r.lifecycle_state != LifecycleState::Inactive)
            .filter(|r| scope.is_none_or(|ns| &r.project_namespace == ns))
            .cloned()
            .collect())
    }

    pub fn count(&self) -> Result<usize> {
        let sessions = self.lock()?;
        Ok(sessions.len())
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<String, SessionRecord>>> {
        self.sessions.lock().map_err(|_| Error::Poisoned)
    }

    /// Rewrite the whole state file through a sibling temp file so a crash
    /// mid-write leaves the previous version intact
    fn persist(&self, sessions: &BTreeMap<String, SessionRecord>) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let content = serde_json::to_string_pretty(sessions)?;
        let tmp_path = tmp_sibling(path);
        std::fs::write(&tmp_path, content)?;
        std::fs::rename(&tmp_path, path)?;
        Ok(())
    }
}

fn restore_entry(
    sessions: &mut BTreeMap<String, SessionRecord>,
    session_id: &str,
    previous: Option<SessionRecord>,
) {
    match previous {
        Some(record) => {
            sessions.insert(session_id.to_string(), record);
        }
        None => {
            sessions.remove(session_id);
        }
    }
}

fn tmp_sibling(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".tmp");
    PathBuf::from(name)
}

fn load_state_file(path: &Path) -> BTreeMap<String, SessionRecord> {
    if !path.exists() {
        return BTreeMap::new();
    }

    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) => {
            tracing::warn!(
                path = %path.display(),
                error = %err,
                "Failed to read session state file; starting with empty store"
            );
            return BTreeMap::new();
        }
    };

    match serde_json::from_str::<BTreeMap<String, SessionRecord>>(&content) {
        Ok(mut sessions) => {
            // No attempt can be in flight in a freshly opened store, so a
            // record persisted as `Indexing` is the remnant of a crash
            // mid-attempt. Make it attemptable again.
            for record in sessions.values_mut() {
                if record.lifecycle_state == LifecycleState::Indexing {
                    tracing::warn!(
                        session_id = %record.session_id,
                        "Session was mid-index at shutdown; resetting to active"
                    );
                    record.lifecycle_state = LifecycleState::Active;
                }
            }
            sessions
        }
        Err(err) => {
            tracing::warn!(
                path = %path.display(),
                error = %err,
                "Session state file is corrupt; starting with empty store"
            );
            BTreeMap::new()
        }
    }
}
