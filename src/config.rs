//! Configuration Management
//!
//! Handles persistent configuration storage for the plugin. Values given on
//! the command line win over the file, the file wins over built-in defaults.

use crate::aruba::client::DEFAULT_BASE_URL;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Address the HTTP server binds when nothing else is configured
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";

/// Persisted configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Socket address to serve on
    #[serde(default)]
    pub listen_addr: Option<String>,
    /// Aruba Cloud API base URL
    #[serde(default)]
    pub upstream_base_url: Option<String>,
    /// Overall timeout for one upstream call; none when unset
    #[serde(default)]
    pub upstream_timeout_secs: Option<u64>,
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("aruba-subnet-plugin").join("config.json"))
    }

    /// Load configuration from `path`; a missing or unreadable file yields defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring malformed config {:?}: {}", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Get effective listen address (CLI > config > default)
    pub fn effective_listen_addr(&self, cli: Option<&str>) -> String {
        cli.map(str::to_string)
            .or_else(|| self.listen_addr.clone())
            .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string())
    }

    /// Get effective upstream base URL (CLI > config > default)
    pub fn effective_base_url(&self, cli: Option<&str>) -> String {
        cli.map(str::to_string)
            .or_else(|| self.upstream_base_url.clone())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    /// Get effective upstream timeout (CLI > config > none)
    pub fn effective_timeout(&self, cli: Option<u64>) -> Option<Duration> {
        cli.or(self.upstream_timeout_secs)
            .map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_apply_without_file_or_flags() {
        let config = Config::default();
        assert_eq!(config.effective_listen_addr(None), "0.0.0.0:8080");
        assert_eq!(config.effective_base_url(None), "https://api.arubacloud.com");
        assert_eq!(config.effective_timeout(None), None);
    }

    #[test]
    fn test_cli_overrides_file() {
        let config = Config {
            listen_addr: Some("127.0.0.1:9000".into()),
            upstream_base_url: Some("https://staging.example".into()),
            upstream_timeout_secs: Some(30),
        };

        assert_eq!(config.effective_listen_addr(None), "127.0.0.1:9000");
        assert_eq!(
            config.effective_listen_addr(Some("127.0.0.1:9999")),
            "127.0.0.1:9999"
        );
        assert_eq!(
            config.effective_base_url(Some("http://localhost:1234")),
            "http://localhost:1234"
        );
        assert_eq!(config.effective_timeout(None), Some(Duration::from_secs(30)));
        assert_eq!(config.effective_timeout(Some(5)), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            listen_addr: Some("127.0.0.1:8081".into()),
            upstream_base_url: None,
            upstream_timeout_secs: Some(10),
        };

        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path), config);
    }

    #[test]
    fn test_missing_or_malformed_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.json");
        assert_eq!(Config::load_from(&missing), Config::default());

        let malformed = dir.path().join("bad.json");
        std::fs::write(&malformed, "{ not json").unwrap();
        assert_eq!(Config::load_from(&malformed), Config::default());
    }
}
