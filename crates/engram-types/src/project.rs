use serde::{Deserialize, Serialize};
use std::fmt;

/// Project identifier computed from the canonical project root path via SHA256.
///
/// Used as the stable namespace key for episodes; never compare projects by
/// raw OS paths (symlinks and platform path formats make them unstable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectNamespace(String);

impl ProjectNamespace {
    /// Create a new ProjectNamespace from a string (typically hex digest)
    pub fn new(namespace: impl Into<String>) -> Self {
        Self(namespace.into())
    }

    /// Get the namespace as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ProjectNamespace {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ProjectNamespace {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for ProjectNamespace {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Identifier of an episode in the graph knowledge store.
///
/// Opaque to the engine; minted by the graph store on insert.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EpisodeId(String);

impl EpisodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EpisodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for EpisodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for EpisodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
