use std::fmt;

/// Result type for engram-runtime operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the runtime layer
#[derive(Debug)]
pub enum Error {
    /// Indexing engine error
    Engine(engram_engine::Error),

    /// State store error
    Store(engram_store::Error),

    /// Upstream content source error
    Content(anyhow::Error),

    /// IO operation failed
    Io(std::io::Error),

    /// Configuration error
    Config(String),

    /// Session unknown to the content source
    UnknownSession(String),

    /// Invalid operation or state
    InvalidOperation(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Engine(err) => write!(f, "Engine error: {}", err),
            Error::Store(err) => write!(f, "State store error: {}", err),
            Error::Content(err) => write!(f, "Content source error: {}", err),
            Error::Io(err) => write!(f, "IO error: {}", err),
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
            Error::UnknownSession(id) => write!(f, "Unknown session: {}", id),
            Error::InvalidOperation(msg) => write!(f, "Invalid operation: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Engine(err) => Some(err),
            Error::Store(err) => Some(err),
            Error::Content(err) => Some(err.as_ref()),
            Error::Io(err) => Some(err),
            Error::Config(_) | Error::UnknownSession(_) | Error::InvalidOperation(_) => None,
        }
    }
}

impl From<engram_engine::Error> for Error {
    fn from(err: engram_engine::Error) -> Self {
        Error::Engine(err)
    }
}

impl From<engram_store::Error> for Error {
    fn from(err: engram_store::Error) -> Self {
        Error::Store(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}
