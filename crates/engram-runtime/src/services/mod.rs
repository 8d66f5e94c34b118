mod diagnostics;
mod lazy;

pub use diagnostics::{DiagnosticsService, PendingSession, PendingSessionsRequest};
pub use lazy::{LazyIndexService, SessionAttempt};
