//! Service endpoint configuration
//!
//! Resolution priority for the API base URL:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`ADMITGUARD_API_URL`)
//! 3. TOML config file (`admitguard/config.toml` in the platform config dir)
//! 4. Compiled default (`http://localhost:5000`)
//!
//! Timeout and log level come from the TOML file when present, otherwise
//! from compiled defaults. These settings cannot change during a session;
//! restart to pick up changes.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Environment variable overriding the API base URL
pub const API_URL_ENV: &str = "ADMITGUARD_API_URL";

const DEFAULT_BASE_URL: &str = "http://localhost:5000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Resolved client configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Base URL of the remote validation/candidate service (no trailing slash)
    pub base_url: String,

    /// Per-request timeout for all HTTP calls
    pub timeout_secs: u64,

    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            log_level: "info".to_string(),
        }
    }
}

/// Bootstrap configuration loaded from the TOML file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default)]
    pub timeout_secs: Option<u64>,

    #[serde(default)]
    pub log_level: Option<String>,
}

impl TomlConfig {
    /// Parse a TOML config file
    pub fn load(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config file {:?}: {}", path, e)))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))
    }
}

/// Default configuration file path for the platform
/// (`~/.config/admitguard/config.toml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("admitguard").join("config.toml"))
}

impl ServiceConfig {
    /// Resolve configuration from CLI argument, environment, config file
    /// and compiled defaults, in that priority order.
    ///
    /// A missing or unparsable config file is not fatal — the remaining
    /// sources apply and a warning is logged.
    pub fn resolve(cli_base_url: Option<&str>) -> Self {
        let file_config = default_config_path()
            .filter(|p| p.exists())
            .and_then(|p| match TomlConfig::load(&p) {
                Ok(config) => Some(config),
                Err(e) => {
                    tracing::warn!(error = %e, "Ignoring unreadable config file");
                    None
                }
            })
            .unwrap_or_default();

        Self::from_sources(cli_base_url, std::env::var(API_URL_ENV).ok(), file_config)
    }

    /// Pure resolution step, separated from the ambient sources for testing
    pub fn from_sources(
        cli_base_url: Option<&str>,
        env_base_url: Option<String>,
        file_config: TomlConfig,
    ) -> Self {
        let defaults = Self::default();

        let base_url = cli_base_url
            .map(str::to_string)
            .or(env_base_url)
            .or(file_config.base_url)
            .unwrap_or(defaults.base_url);

        Self {
            // The join convention is `{base_url}/api/...`
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_secs: file_config.timeout_secs.unwrap_or(defaults.timeout_secs),
            log_level: file_config.log_level.unwrap_or(defaults.log_level),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.base_url, "http://localhost:5000");
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_cli_beats_env_and_file() {
        let file = TomlConfig {
            base_url: Some("http://file:1".into()),
            timeout_secs: Some(5),
            log_level: None,
        };
        let config = ServiceConfig::from_sources(
            Some("http://cli:1"),
            Some("http://env:1".into()),
            file,
        );
        assert_eq!(config.base_url, "http://cli:1");
        // Non-URL settings still come from the file
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn test_env_beats_file() {
        let file = TomlConfig { base_url: Some("http://file:1".into()), ..Default::default() };
        let config = ServiceConfig::from_sources(None, Some("http://env:1".into()), file);
        assert_eq!(config.base_url, "http://env:1");
    }

    #[test]
    fn test_trailing_slash_is_stripped() {
        let config = ServiceConfig::from_sources(Some("http://host:5000/"), None, TomlConfig::default());
        assert_eq!(config.base_url, "http://host:5000");
    }
}
