//! Configuration management for the Sentry MCP server.
//!
//! Two layers:
//!
//! - [`Config`] is the optional TOML file holding non-secret settings.
//!   It lives in a platform-specific location:
//!   - **macOS/Linux**: `~/.config/sentry-issues/config.toml`
//!   - **Windows**: `%APPDATA%\sentry-issues\config.toml`
//! - [`Settings`] is the resolved, immutable runtime configuration built once
//!   at startup from the environment and the file. The auth token and the
//!   organization only ever come from the environment.
//!
//! # Example
//!
//! ```ignore
//! use sentry_issues_core::config::{Config, Settings};
//!
//! let config = Config::load()?;
//! let settings = Settings::from_env(&config)?;
//! ```

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Config file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Config directory name.
const CONFIG_DIR_NAME: &str = "sentry-issues";

/// Environment variable holding the bearer token.
pub const AUTH_TOKEN_VAR: &str = "SENTRY_AUTH_TOKEN";

/// Environment variable holding the organization id or slug.
pub const ORGANIZATION_VAR: &str = "ORGANIZATION_ID_OR_SLUG";

/// Environment variable overriding the API base URL.
pub const BASE_URL_VAR: &str = "SENTRY_BASE_URL";

/// Default Sentry API URL.
pub const DEFAULT_BASE_URL: &str = "https://sentry.io";

/// Upper bound for every upstream request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// =============================================================================
// Configuration file
// =============================================================================

/// Contents of the configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Sentry API configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentry: Option<SentryConfig>,
}

/// Sentry API configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SentryConfig {
    /// API base URL (for self-hosted Sentry)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl Config {
    /// Get the configuration directory path.
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(CONFIG_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }

    /// Get the configuration file path.
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default location.
    ///
    /// Returns a default (empty) config if the file doesn't exist.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    ///
    /// Returns a default (empty) config if the file doesn't exist.
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        if !path.exists() {
            debug!(path = ?path, "Config file does not exist, using defaults");
            return Ok(Self::default());
        }

        debug!(path = ?path, "Loading config");

        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config file: {}", e)))?;

        info!(path = ?path, "Config loaded successfully");
        Ok(config)
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        self.save_to(&path)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("Failed to create config directory: {}", e)))?;
        }

        debug!(path = ?path, "Saving config");

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, contents)
            .map_err(|e| Error::Config(format!("Failed to write config file: {}", e)))?;

        info!(path = ?path, "Config saved successfully");
        Ok(())
    }

    /// Set a configuration value by key path.
    ///
    /// Key format: `section.field` (e.g., `sentry.base_url`)
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let (section, field) = split_key(key)?;

        match section {
            "sentry" => {
                let config = self.sentry.get_or_insert_with(SentryConfig::default);
                match field {
                    "base_url" | "url" => config.base_url = Some(value.to_string()),
                    _ => {
                        return Err(Error::Config(format!(
                            "Unknown Sentry config field: {}",
                            field
                        )))
                    }
                }
            }
            _ => return Err(Error::Config(format!("Unknown config section: {}", section))),
        }

        Ok(())
    }

    /// Get a configuration value by key path.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let (section, field) = split_key(key)?;

        match section {
            "sentry" => {
                let Some(config) = &self.sentry else {
                    return Ok(None);
                };
                match field {
                    "base_url" | "url" => Ok(config.base_url.clone()),
                    _ => Err(Error::Config(format!(
                        "Unknown Sentry config field: {}",
                        field
                    ))),
                }
            }
            _ => Err(Error::Config(format!("Unknown config section: {}", section))),
        }
    }
}

fn split_key(key: &str) -> Result<(&str, &str)> {
    let parts: Vec<&str> = key.split('.').collect();
    if parts.len() != 2 {
        return Err(Error::Config(format!(
            "Invalid config key '{}'. Expected format: section.field",
            key
        )));
    }
    Ok((parts[0], parts[1]))
}

// =============================================================================
// Resolved settings
// =============================================================================

/// Runtime configuration, read once at startup and never mutated.
#[derive(Clone)]
pub struct Settings {
    pub base_url: String,
    pub auth_token: String,
    pub organization: String,
    pub timeout: Duration,
}

impl Settings {
    /// Resolve settings from the process environment and the config file.
    pub fn from_env(config: &Config) -> Result<Self> {
        Self::resolve(config, |name| std::env::var(name).ok())
    }

    /// Resolve settings with a custom variable lookup.
    ///
    /// Environment values win over the file; empty values count as missing.
    pub fn resolve<F>(config: &Config, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let auth_token = var(AUTH_TOKEN_VAR).ok_or_else(|| {
            Error::Config(format!("{} environment variable is required", AUTH_TOKEN_VAR))
        })?;
        let organization = var(ORGANIZATION_VAR).ok_or_else(|| {
            Error::Config(format!("{} environment variable is required", ORGANIZATION_VAR))
        })?;

        let base_url = var(BASE_URL_VAR)
            .or_else(|| config.sentry.as_ref().and_then(|s| s.base_url.clone()))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_token,
            organization,
            timeout: REQUEST_TIMEOUT,
        })
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("base_url", &self.base_url)
            .field("auth_token", &"<redacted>")
            .field("organization", &self.organization)
            .field("timeout", &self.timeout)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
