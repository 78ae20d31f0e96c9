//! Configuration management for the review analyzer.
//!
//! The CLI reads a single configuration file at `~/.review-analyzer/config.json`.
//! The analysis crate never reads it directly: callers turn the loaded
//! [`ClientSettings`] into a client configuration and hand that over.
//!
//! # Configuration Priority
//!
//! 1. Environment variables (REVIEW_* prefix)
//! 2. Explicit config file values
//! 3. Default values
//!
//! # Environment Variable Mapping
//!
//! - `REVIEW_ENDPOINT` → client.endpoint
//! - `REVIEW_MAX_RETRIES` → client.max_retries
//! - `REVIEW_BASE_BACKOFF_MS` → client.base_backoff_ms
//! - `REVIEW_LOG_LEVEL` → observability.log_level
//! - `REVIEW_LOG_FORMAT` → observability.log_format

use crate::error::{Error, Result, ResultExt};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Get the configuration directory path.
pub fn config_dir() -> PathBuf {
    directories::UserDirs::new().map_or_else(
        || PathBuf::from(".review-analyzer"),
        |dirs| dirs.home_dir().join(".review-analyzer"),
    )
}

/// Get the configuration file path.
pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

// ============================================================================
// Client Settings
// ============================================================================

/// Settings for the outbound analysis client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientSettings {
    /// Analysis endpoint that accepts the `review` form field
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Retries after the first attempt (429 and transport failures share this budget)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base backoff delay in milliseconds (doubles with each retry)
    #[serde(default = "default_base_backoff_ms")]
    pub base_backoff_ms: u64,

    /// Upper bound for a single backoff delay in milliseconds
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            max_retries: default_max_retries(),
            base_backoff_ms: default_base_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

fn default_endpoint() -> String {
    "http://localhost:8080/work/single".into()
}

fn default_max_retries() -> u32 {
    3
}

fn default_base_backoff_ms() -> u64 {
    1000
}

fn default_max_backoff_ms() -> u64 {
    60_000
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

// ============================================================================
// Observability
// ============================================================================

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Base log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Output format: "json" or "pretty"
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "pretty".into()
}

// ============================================================================
// Root Config
// ============================================================================

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub client: ClientSettings,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from the default path, falling back to defaults.
    pub fn load() -> Result<Self> {
        let path = config_path();
        if !path.exists() {
            tracing::info!("Config file not found, using defaults");
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .context(format!("Failed to read config from {}", path.display()))?;

        serde_json::from_str(&content)
            .context(format!("Failed to parse config from {}", path.display()))
    }

    /// Load configuration with environment variable overrides.
    pub fn load_with_env() -> Result<Self> {
        let mut config = Self::load()?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply `REVIEW_*` environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup.
    ///
    /// Numeric values that fail to parse are ignored and logged.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(endpoint) = lookup("REVIEW_ENDPOINT") {
            self.client.endpoint = endpoint;
        }
        if let Some(raw) = lookup("REVIEW_MAX_RETRIES") {
            match raw.parse() {
                Ok(n) => self.client.max_retries = n,
                Err(_) => tracing::warn!(value = %raw, "Ignoring invalid REVIEW_MAX_RETRIES"),
            }
        }
        if let Some(raw) = lookup("REVIEW_BASE_BACKOFF_MS") {
            match raw.parse() {
                Ok(ms) => self.client.base_backoff_ms = ms,
                Err(_) => tracing::warn!(value = %raw, "Ignoring invalid REVIEW_BASE_BACKOFF_MS"),
            }
        }
        if let Some(level) = lookup("REVIEW_LOG_LEVEL") {
            self.observability.log_level = level;
        }
        if let Some(format) = lookup("REVIEW_LOG_FORMAT") {
            self.observability.log_format = format;
        }
    }

    /// Write a default configuration file at `path`.
    ///
    /// Refuses to overwrite an existing file.
    pub fn init_at(path: &Path) -> Result<Self> {
        if path.exists() {
            return Err(Error::Config(format!(
                "{} already exists",
                path.display()
            )));
        }
        let config = Self::default();
        config.save_to(path)?;
        tracing::info!(path = %path.display(), "Wrote default configuration");
        Ok(config)
    }

    /// Write configuration to a path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .context(format!("Failed to create {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).map_err(Error::from)
    }
}
