//! Configuration loading and management

use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

/// Client identifier the mock accepts
pub const DEFAULT_CLIENT_ID: &str = "vruc_test_client";

/// Client secret the mock accepts
pub const DEFAULT_CLIENT_SECRET: &str = "vruc_test_secret";

/// Longest code or token lifetime accepted (10 years)
pub const MAX_LIFETIME_SECS: u64 = 10 * 365 * 24 * 3600;

/// Main configuration for the mock provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// The single client allowed to use this provider
    #[serde(default = "default_client_id")]
    pub client_id: String,

    #[serde(default = "default_client_secret")]
    pub client_secret: String,

    /// Authorization code lifetime in seconds (default: 5 minutes)
    #[serde(default = "default_code_lifetime")]
    pub code_lifetime_secs: u64,

    /// Access token lifetime in seconds (default: 1 hour)
    #[serde(default = "default_access_token_lifetime")]
    pub access_token_lifetime_secs: u64,

    /// HMAC secret for signing access tokens.
    /// If not set, a random key is generated at startup (tokens won't survive restarts)
    #[serde(default)]
    pub signing_secret: Option<String>,
}

fn default_client_id() -> String {
    DEFAULT_CLIENT_ID.to_string()
}

fn default_client_secret() -> String {
    DEFAULT_CLIENT_SECRET.to_string()
}

fn default_code_lifetime() -> u64 {
    300 // 5 minutes
}

fn default_access_token_lifetime() -> u64 {
    3600 // 1 hour
}

impl Default for Config {
    fn default() -> Self {
        Self {
            client_id: default_client_id(),
            client_secret: default_client_secret(),
            code_lifetime_secs: default_code_lifetime(),
            access_token_lifetime_secs: default_access_token_lifetime(),
            signing_secret: None,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file, or use defaults when no file is given
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let Some(config_file) = config_file else {
            tracing::info!("No config file given, using defaults");
            return Ok(Config::default());
        };

        let content = std::fs::read_to_string(config_file)
            .with_context(|| format!("Failed to read config file: {:?}", config_file))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {:?}", config_file))?;
        config
            .validate()
            .with_context(|| format!("Invalid configuration in {:?}", config_file))?;
        tracing::info!("Loaded configuration from {:?}", config_file);
        Ok(config)
    }

    /// Reject lifetimes that would overflow expiry arithmetic
    pub fn validate(&self) -> Result<()> {
        for (name, secs) in [
            ("code_lifetime_secs", self.code_lifetime_secs),
            ("access_token_lifetime_secs", self.access_token_lifetime_secs),
        ] {
            if secs > MAX_LIFETIME_SECS {
                bail!("{name} is {secs}, maximum is {MAX_LIFETIME_SECS}");
            }
        }
        Ok(())
    }

    /// Authorization code lifetime, capped at `MAX_LIFETIME_SECS`
    pub fn code_lifetime(&self) -> TimeDelta {
        lifetime(self.code_lifetime_secs)
    }

    /// Access token lifetime, capped at `MAX_LIFETIME_SECS`
    pub fn access_token_lifetime(&self) -> TimeDelta {
        lifetime(self.access_token_lifetime_secs)
    }

    /// Check a client_id / client_secret pair
    pub fn client_matches(&self, client_id: &str, client_secret: &str) -> bool {
        self.client_id == client_id && self.client_secret == client_secret
    }
}

fn lifetime(secs: u64) -> TimeDelta {
    TimeDelta::seconds(secs.min(MAX_LIFETIME_SECS) as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::load(None).unwrap();
        assert_eq!(config.client_id, "vruc_test_client");
        assert_eq!(config.client_secret, "vruc_test_secret");
        assert_eq!(config.code_lifetime_secs, 300);
        assert_eq!(config.access_token_lifetime_secs, 3600);
        assert!(config.signing_secret.is_none());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"client_id": "other", "access_token_lifetime_secs": 60}}"#).unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.client_id, "other");
        assert_eq!(config.client_secret, "vruc_test_secret");
        assert_eq!(config.access_token_lifetime_secs, 60);
        assert_eq!(config.code_lifetime_secs, 300);
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.json");
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn test_oversized_lifetime_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"code_lifetime_secs": 10000000000000}}"#).unwrap();

        let err = Config::load(Some(file.path())).unwrap_err();
        assert!(format!("{err:#}").contains("code_lifetime_secs"));

        let config = Config {
            access_token_lifetime_secs: u64::MAX,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_lifetimes_are_capped() {
        let config = Config {
            code_lifetime_secs: u64::MAX,
            ..Config::default()
        };
        assert_eq!(config.code_lifetime().num_seconds(), MAX_LIFETIME_SECS as i64);
        assert_eq!(Config::default().code_lifetime().num_seconds(), 300);
        assert_eq!(Config::default().access_token_lifetime().num_seconds(), 3600);
    }

    #[test]
    fn test_client_matches() {
        let config = Config::default();
        assert!(config.client_matches("vruc_test_client", "vruc_test_secret"));
        assert!(!config.client_matches("vruc_test_client", "wrong"));
        assert!(!config.client_matches("wrong", "vruc_test_secret"));
    }
}
