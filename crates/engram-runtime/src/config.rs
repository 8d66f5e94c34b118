use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Resolve the workspace data directory path based on priority:
/// 1. Explicit path (with tilde expansion)
/// 2. ENGRAM_PATH environment variable (with tilde expansion)
/// 3. XDG data directory (recommended default)
/// 4. ~/.engram (fallback for systems without XDG)
pub fn resolve_workspace_path(explicit_path: Option<&str>) -> Result<PathBuf> {
    // Priority 1: Explicit path
    if let Some(path) = explicit_path {
        return Ok(expand_tilde(path));
    }

    // Priority 2: ENGRAM_PATH environment variable
    if let Ok(env_path) = std::env::var("ENGRAM_PATH") {
        return Ok(expand_tilde(&env_path));
    }

    // Priority 3: XDG data directory (recommended default)
    if let Some(data_dir) = dirs::data_dir() {
        return Ok(data_dir.join("engram"));
    }

    // Priority 4: Fallback to ~/.engram (last resort for systems without XDG)
    if let Some(home) = std::env::var_os("HOME") {
        return Ok(PathBuf::from(home).join(".engram"));
    }

    Err(Error::Config(
        "Could not determine workspace path: no HOME directory or XDG data directory found"
            .to_string(),
    ))
}

/// Expand tilde (~) in paths to the user's home directory
fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/")
        && let Some(home) = std::env::var_os("HOME")
    {
        return PathBuf::from(home).join(stripped);
    }
    PathBuf::from(path)
}

fn default_inactivity_threshold_secs() -> u64 {
    1800
}

fn default_sweep_interval_secs() -> u64 {
    300
}

fn default_lazy_concurrency() -> usize {
    4
}

/// Engine tunables.
///
/// The fingerprint truncation length is deliberately not here: it is a code
/// constant, since changing it would invalidate every stored hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Seconds without activity before the sweep treats a session as closed
    #[serde(default = "default_inactivity_threshold_secs")]
    pub inactivity_threshold_secs: u64,

    /// Seconds between sweep passes
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    /// How many sessions one lazy pre-check batch indexes in parallel
    #[serde(default = "default_lazy_concurrency")]
    pub lazy_concurrency: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            inactivity_threshold_secs: default_inactivity_threshold_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
            lazy_concurrency: default_lazy_concurrency(),
        }
    }
}

impl Config {
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn default_path() -> Result<PathBuf> {
        Ok(resolve_workspace_path(None)?.join("config.toml"))
    }

    pub fn inactivity_threshold(&self) -> Duration {
        Duration::from_secs(self.inactivity_threshold_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.inactivity_threshold_secs, 1800);
        assert_eq!(config.sweep_interval_secs, 300);
        assert_eq!(config.lazy_concurrency, 4);
    }

    #[test]
    fn test_config_save_and_load() -> Result<()> {
        let temp_dir = TempDir::new().map_err(Error::Io)?;
        let config_path = temp_dir.path().join("config.toml");

        let config = Config {
            inactivity_threshold_secs: 600,
            sweep_interval_secs: 60,
            lazy_concurrency: 2,
        };

        config.save_to(&config_path)?;
        assert!(config_path.exists());

        let loaded = Config::load_from(&config_path)?;
        assert_eq!(loaded.inactivity_threshold_secs, 600);
        assert_eq!(loaded.sweep_interval_secs, 60);
        assert_eq!(loaded.lazy_concurrency, 2);

        Ok(())
    }

    #[test]
    fn test_load_nonexistent_returns_default() -> Result<()> {
        let temp_dir = TempDir::new().map_err(Error::Io)?;
        let config_path = temp_dir.path().join("nonexistent.toml");

        let config = Config::load_from(&config_path)?;
        assert_eq!(config.inactivity_threshold_secs, 1800);

        Ok(())
    }

    #[test]
    fn test_partial_file_fills_in_defaults() -> Result<()> {
        let temp_dir = TempDir::new().map_err(Error::Io)?;
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(&config_path, "sweep_interval_secs = 30\n").map_err(Error::Io)?;

        let config = Config::load_from(&config_path)?;
        assert_eq!(config.sweep_interval_secs, 30);
        assert_eq!(config.inactivity_threshold_secs, 1800);
        assert_eq!(config.lazy_concurrency, 4);

        Ok(())
    }

    #[test]
    fn test_duration_accessors() {
        let config = Config::default();
        assert_eq!(config.inactivity_threshold(), Duration::from_secs(1800));
        assert_eq!(config.sweep_interval(), Duration::from_secs(300));
    }

    #[test]
    fn test_explicit_path_wins_resolution() {
        let path = resolve_workspace_path(Some("/opt/engram-data")).unwrap();
        assert_eq!(path, PathBuf::from("/opt/engram-data"));
    }

    #[test]
    fn test_explicit_path_expands_tilde() {
        let Some(home) = std::env::var_os("HOME") else {
            return;
        };
        let path = resolve_workspace_path(Some("~/engram-data")).unwrap();
        assert_eq!(path, PathBuf::from(home).join("engram-data"));
    }

    #[test]
    fn test_resolution_without_explicit_path_lands_in_engram_dir() {
        // Whichever of ENGRAM_PATH / XDG / ~/.engram applies on this host,
        // the result is absolute and usable as a data dir
        let path = resolve_workspace_path(None).unwrap();
        assert!(path.is_absolute());
    }

    #[test]
    fn test_default_config_path_points_at_config_toml() {
        let path = Config::default_path().unwrap();
        assert!(path.ends_with("config.toml"));
    }
}
