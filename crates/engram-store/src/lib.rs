// Durable per-session lifecycle records
// Single JSON state file, atomically rewritten on every mutation

mod error;
mod store;

// Public API
pub use error::{Error, Result};
pub use store::SessionStore;
