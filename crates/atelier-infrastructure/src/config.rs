//! Application configuration loaded from `config.toml`.

use crate::paths::AtelierPaths;
use atelier_core::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Connection and timeout settings.
///
/// Every field has a default, so a missing or partial config file is fine;
/// an unreadable one falls back to defaults with a warning rather than
/// failing startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the backend, including the API prefix.
    pub base_url: String,
    /// Timeout for short administrative calls, in milliseconds.
    pub request_timeout_ms: u64,
    /// Timeout for calls that invoke a downstream model, in milliseconds.
    pub model_timeout_ms: u64,
    /// Outbound block window after a 429 without a Retry-After, in seconds.
    pub rate_limit_cooldown_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            request_timeout_ms: 15_000,
            model_timeout_ms: 300_000,
            rate_limit_cooldown_secs: 30,
        }
    }
}

impl ClientConfig {
    /// Loads the configuration from the default platform location.
    ///
    /// # Errors
    ///
    /// Returns a config error only if the platform config directory cannot
    /// be determined; a missing or unreadable file yields defaults.
    pub fn load() -> Result<Self> {
        Ok(Self::load_from(&AtelierPaths::config_file()?))
    }

    /// Loads the configuration from an explicit path.
    pub fn load_from(path: &Path) -> Self {
        let Ok(raw) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        match toml::from_str(&raw) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "invalid config file, using defaults");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig::load_from(&dir.path().join("config.toml"));
        assert_eq!(config.request_timeout_ms, 15_000);
        assert_eq!(config.model_timeout_ms, 300_000);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "base_url = \"https://api.example.com\"\n").unwrap();

        let config = ClientConfig::load_from(&path);

        assert_eq!(config.base_url, "https://api.example.com");
        assert_eq!(config.rate_limit_cooldown_secs, 30);
    }

    #[test]
    fn test_invalid_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "request_timeout_ms = \"soon\"").unwrap();

        let config = ClientConfig::load_from(&path);

        assert_eq!(config.request_timeout_ms, 15_000);
    }
}
