//! Configuration Management
//!
//! Handles persistent CLI defaults for the Admin API address.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable holding a full Admin API address
pub const ADMIN_URL_ENV: &str = "INPANZEE_ADMIN_URL";

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Admin API scheme (`http` or `https`)
    #[serde(default)]
    pub scheme: Option<String>,
    /// Admin API host
    #[serde(default)]
    pub host: Option<String>,
    /// Admin API port
    #[serde(default)]
    pub port: Option<u16>,
}

/// Fully resolved Admin API address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminAddress {
    pub scheme: String,
    pub host: String,
    pub port: u16,
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("inpanzee").join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)?;

        Ok(())
    }

    /// Overlay values from the CLI on top of this configuration
    pub fn merged(&self, scheme: Option<&str>, host: Option<&str>, port: Option<u16>) -> Self {
        Self {
            scheme: scheme.map(str::to_string).or_else(|| self.scheme.clone()),
            host: host.map(str::to_string).or_else(|| self.host.clone()),
            port: port.or(self.port),
        }
    }

    /// Resolve the address (CLI/config values > environment address)
    pub fn effective_address(&self) -> Result<AdminAddress> {
        let from_env = std::env::var(ADMIN_URL_ENV).ok();
        self.resolve_with(from_env.as_deref())
    }

    fn resolve_with(&self, env_url: Option<&str>) -> Result<AdminAddress> {
        let env_parts = env_url
            .map(crate::gateway::url::decompose)
            .transpose()
            .with_context(|| format!("{} is not a valid address", ADMIN_URL_ENV))?;

        let scheme = self
            .scheme
            .clone()
            .or_else(|| env_parts.as_ref().map(|p| p.scheme.clone()))
            .context("no Admin API scheme configured (use --scheme or INPANZEE_ADMIN_URL)")?;
        let host = self
            .host
            .clone()
            .or_else(|| env_parts.as_ref().map(|p| p.host.clone()))
            .context("no Admin API host configured (use --host or INPANZEE_ADMIN_URL)")?;
        let port = self
            .port
            .or_else(|| env_parts.as_ref().and_then(|p| p.port))
            .or_else(|| default_port(&scheme))
            .context("no Admin API port configured (use --port or INPANZEE_ADMIN_URL)")?;

        Ok(AdminAddress { scheme, host, port })
    }
}

fn default_port(scheme: &str) -> Option<u16> {
    url::Url::parse(&format!("{}://placeholder", scheme))
        .ok()
        .and_then(|u| u.port_or_known_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_values_override_config() {
        let config = Config {
            scheme: Some("http".to_string()),
            host: Some("kong".to_string()),
            port: Some(8001),
        };

        let merged = config.merged(None, Some("edge"), Some(9001));
        assert_eq!(merged.scheme.as_deref(), Some("http"));
        assert_eq!(merged.host.as_deref(), Some("edge"));
        assert_eq!(merged.port, Some(9001));
    }

    #[test]
    fn test_environment_fills_gaps() {
        let config = Config {
            host: Some("kong".to_string()),
            ..Default::default()
        };

        let address = config
            .resolve_with(Some("https://ignored:8444"))
            .unwrap();
        assert_eq!(
            address,
            AdminAddress {
                scheme: "https".to_string(),
                host: "kong".to_string(),
                port: 8444,
            }
        );
    }

    #[test]
    fn test_environment_default_port() {
        let address = Config::default()
            .resolve_with(Some("https://kong.internal"))
            .unwrap();
        assert_eq!(address.port, 443);
    }

    #[test]
    fn test_missing_address_is_an_error() {
        assert!(Config::default().resolve_with(None).is_err());
        assert!(Config::default().resolve_with(Some("not a url")).is_err());
    }

    #[test]
    fn test_config_deserializes_partial_files() {
        let config: Config = serde_json::from_str(r#"{"host": "kong"}"#).unwrap();
        assert_eq!(config.host.as_deref(), Some("kong"));
        assert!(config.port.is_none());
    }
}
