use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::bail;
use uuid::Uuid;

use engram_engine::GraphStore;
use engram_types::{EpisodeId, ProjectNamespace};

/// Which graph operation should fail with an injected error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailMode {
    #[default]
    None,
    InsertFails,
    DeleteFails,
}

#[derive(Debug, Clone)]
struct StoredEpisode {
    content: String,
    namespace: ProjectNamespace,
}

/// In-memory `GraphStore` double with write counting, fault injection, and
/// optional insert latency (for interleaving tests)
#[derive(Default)]
pub struct MemoryGraph {
    episodes: Mutex<HashMap<EpisodeId, StoredEpisode>>,
    fail_mode: Mutex<FailMode>,
    insert_delay: Mutex<Option<Duration>>,
    inserts: AtomicUsize,
    deletes: AtomicUsize,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_mode(&self, mode: FailMode) {
        *self.fail_mode.lock().unwrap() = mode;
    }

    /// Delay every subsequent insert, keeping the writer "in flight" long
    /// enough for concurrent triggers to observe the busy state
    pub fn set_insert_delay(&self, delay: Duration) {
        *self.insert_delay.lock().unwrap() = Some(delay);
    }

    pub fn insert_count(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }

    pub fn delete_count(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    pub fn episode_count(&self) -> usize {
        self.episodes.lock().unwrap().len()
    }

    pub fn episode_content(&self, episode_id: &EpisodeId) -> Option<String> {
        self.episodes
            .lock()
            .unwrap()
            .get(episode_id)
            .map(|e| e.content.clone())
    }

    pub fn episode_namespace(&self, episode_id: &EpisodeId) -> Option<ProjectNamespace> {
        self.episodes
            .lock()
            .unwrap()
            .get(episode_id)
            .map(|e| e.namespace.clone())
    }
}

impl GraphStore for MemoryGraph {
    fn insert(&self, content: &str, namespace: &ProjectNamespace) -> anyhow::Result<EpisodeId> {
        if *self.fail_mode.lock().unwrap() == FailMode::InsertFails {
            bail!("injected insert failure");
        }

        let delay = *self.insert_delay.lock().unwrap();
        if let Some(delay) = delay {
            std::thread::sleep(delay);
        }

        let episode_id = EpisodeId::new(format!("ep-{}", Uuid::new_v4()));
        self.episodes.lock().unwrap().insert(
            episode_id.clone(),
            StoredEpisode {
                content: content.to_string(),
                namespace: namespace.clone(),
            },
        );
        self.inserts.fetch_add(1, Ordering::SeqCst);
        Ok(episode_id)
    }

    fn delete(&self, episode_id: &EpisodeId) -> anyhow::Result<()> {
        if *self.fail_mode.lock().unwrap() == FailMode::DeleteFails {
            bail!("injected delete failure");
        }

        if self.episodes.lock().unwrap().remove(episode_id).is_none() {
            bail!("episode {} not found", episode_id);
        }
        self.deletes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
