pub mod client;
pub mod config;
pub mod content;
pub mod error;
pub mod ops;
pub mod services;
pub mod sweeper;

pub use client::Engram;
pub use config::{Config, resolve_workspace_path};
pub use content::ContentSource;
pub use error::{Error, Result};
pub use ops::{CloseOutcome, CloseReport, CloseRequest, CloseService};
pub use services::{
    DiagnosticsService, LazyIndexService, PendingSession, PendingSessionsRequest, SessionAttempt,
};
pub use sweeper::{Sweeper, SweeperConfig};
