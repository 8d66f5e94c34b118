use std::sync::Arc;
use std::sync::mpsc::{RecvTimeoutError, Sender, channel};
use std::thread::JoinHandle;
use std::time::Duration;

use engram_engine::Orchestrator;
use engram_types::LifecycleState;

use crate::content::ContentSource;
use crate::error::Result;

#[derive(Debug, Clone)]
pub struct SweeperConfig {
    /// Time between sweep passes
    pub interval: Duration,
    /// Inactivity threshold handed to `sweep_timeout`
    pub inactivity_threshold: Duration,
}

/// Background inactivity sweep.
///
/// A named thread wakes every `interval`, finds `Active` sessions whose
/// last activity is older than the threshold, and runs the timeout trigger
/// on each. Shutdown goes through a channel: the loop notices it between
/// passes (or mid-wait), so cancellation is prompt but never interrupts an
/// attempt already started. Per-session failures are logged and retried on
/// the next cycle.
pub struct Sweeper {
    shutdown_tx: Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl Sweeper {
    pub fn start(
        orchestrator: Arc<Orchestrator>,
        source: Arc<dyn ContentSource>,
        config: SweeperConfig,
    ) -> Result<Self> {
        let (shutdown_tx, shutdown_rx) = channel();

        let handle = std::thread::Builder::new()
            .name("engram-sweeper".to_string())
            .spawn(move || {
                loop {
                    match shutdown_rx.recv_timeout(config.interval) {
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                        Err(RecvTimeoutError::Timeout) => {
                            run_sweep_pass(
                                &orchestrator,
                                source.as_ref(),
                                config.inactivity_threshold,
                            );
                        }
                    }
                }
            })?;

        Ok(Self {
            shutdown_tx,
            handle: Some(handle),
        })
    }

    /// Signal shutdown and wait for the thread to finish its current pass
    pub fn stop(mut self) {
        let _ = self.shutdown_tx.send(());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        // Dropping the sender also unblocks the loop, but an explicit send
        // covers the case where a clone of the channel outlives us
        let _ = self.shutdown_tx.send(());
    }
}

fn run_sweep_pass(orchestrator: &Orchestrator, source: &dyn ContentSource, threshold: Duration) {
    let records = match orchestrator.store().load_all() {
        Ok(records) => records,
        Err(err) => {
            tracing::warn!(error = %err, "Sweep pass could not load session records");
            return;
        }
    };

    for record in records {
        if record.lifecycle_state != LifecycleState::Active {
            continue;
        }

        let content = match source.filtered_content(&record.session_id) {
            Ok(Some(content)) => content,
            Ok(None) => continue,
            Err(err) => {
                tracing::warn!(
                    session_id = %record.session_id,
                    error = %err,
                    "Sweep could not fetch session content"
                );
                continue;
            }
        };

        match orchestrator.sweep_timeout(&record.session_id, threshold, &content) {
            Ok(Some(outcome)) => {
                tracing::debug!(session_id = %record.session_id, ?outcome, "Timeout sweep indexed session");
            }
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(
                    session_id = %record.session_id,
                    error = %err,
                    "Timeout sweep attempt failed; will retry next cycle"
                );
            }
        }
    }
}
