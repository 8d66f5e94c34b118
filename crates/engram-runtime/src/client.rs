use std::path::PathBuf;
use std::sync::Arc;

use engram_engine::{GraphStore, Orchestrator};
use engram_store::SessionStore;
use engram_types::{ProjectNamespace, SessionContent};

use crate::config::{Config, resolve_workspace_path};
use crate::content::ContentSource;
use crate::error::Result;
use crate::ops::{CloseReport, CloseRequest, CloseService};
use crate::services::{
    DiagnosticsService, LazyIndexService, PendingSession, PendingSessionsRequest, SessionAttempt,
};
use crate::sweeper::{Sweeper, SweeperConfig};

const STATE_FILE: &str = "sessions.json";
const CONFIG_FILE: &str = "config.toml";

/// Top-level handle wiring the state store, the closure orchestrator, and
/// the collaborator boundaries together for one data directory.
///
/// One process owns the data directory at a time; there is no cross-process
/// lock.
pub struct Engram {
    orchestrator: Arc<Orchestrator>,
    source: Arc<dyn ContentSource>,
    config: Arc<Config>,
}

impl Engram {
    /// Open (or initialize) the engine in the given data directory. A
    /// missing config file is created with defaults; a missing or corrupt
    /// state file starts as an empty store.
    pub fn open(
        data_dir: PathBuf,
        graph: Arc<dyn GraphStore>,
        source: Arc<dyn ContentSource>,
    ) -> Result<Self> {
        let state_path = data_dir.join(STATE_FILE);
        let config_path = data_dir.join(CONFIG_FILE);

        let store = Arc::new(SessionStore::open(&state_path)?);
        let config = if config_path.exists() {
            Config::load_from(&config_path)?
        } else {
            let defaults = Config::default();
            defaults.save_to(&config_path)?;
            defaults
        };

        Ok(Self {
            orchestrator: Arc::new(Orchestrator::new(store, graph)),
            source,
            config: Arc::new(config),
        })
    }

    /// Open in the default data directory, resolved from `ENGRAM_PATH`,
    /// the XDG data dir, or `~/.engram` in that order
    pub fn open_default(
        graph: Arc<dyn GraphStore>,
        source: Arc<dyn ContentSource>,
    ) -> Result<Self> {
        Self::open(resolve_workspace_path(None)?, graph, source)
    }

    /// Explicit close trigger: index the given (or current) session now
    pub fn close_session(&self, request: CloseRequest) -> Result<CloseReport> {
        CloseService::new(&self.orchestrator, self.source.as_ref()).run(request)
    }

    /// Lazy pre-check trigger: await until every session in scope has been
    /// passed through an indexing attempt
    pub async fn ensure_indexed(
        &self,
        scopes: &[ProjectNamespace],
    ) -> Result<Vec<SessionAttempt>> {
        LazyIndexService::new(
            self.orchestrator.clone(),
            self.source.clone(),
            self.config.lazy_concurrency,
        )
        .ensure_indexed(scopes)
        .await
    }

    /// Record that a session's content changed (upstream push)
    pub fn observe_activity(&self, session_id: &str, content: &SessionContent) -> Result<()> {
        self.orchestrator
            .mark_activity(session_id, content)
            .map_err(Into::into)
    }

    /// Read-only listing of sessions that have not reached `Indexed`
    pub fn pending_sessions(
        &self,
        request: &PendingSessionsRequest,
    ) -> Result<Vec<PendingSession>> {
        DiagnosticsService::new(self.orchestrator.store()).pending_sessions(request)
    }

    /// Start the background inactivity sweeper with the configured
    /// interval and threshold
    pub fn start_sweeper(&self) -> Result<Sweeper> {
        Sweeper::start(
            self.orchestrator.clone(),
            self.source.clone(),
            SweeperConfig {
                interval: self.config.sweep_interval(),
                inactivity_threshold: self.config.inactivity_threshold(),
            },
        )
    }

    pub fn orchestrator(&self) -> &Arc<Orchestrator> {
        &self.orchestrator
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
