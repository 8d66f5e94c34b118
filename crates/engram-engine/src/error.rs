use std::fmt;

/// Result type for engram-engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during an indexing attempt
#[derive(Debug)]
pub enum Error {
    /// State store operation failed
    Store(engram_store::Error),

    /// Graph store delete or insert failed; the session's lifecycle state
    /// was reverted and it stays eligible for retry
    Write(anyhow::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Store(err) => write!(f, "State store error: {}", err),
            Error::Write(err) => write!(f, "Episode write failed: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Store(err) => Some(err),
            Error::Write(err) => Some(err.as_ref()),
        }
    }
}

impl From<engram_store::Error> for Error {
    fn from(err: engram_store::Error) -> Self {
        Error::Store(err)
    }
}
