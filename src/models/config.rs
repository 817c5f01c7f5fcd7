// src/models/config.rs

//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::policy::LoanPolicy;

/// Environment variable overriding `api.base_url`.
pub const API_URL_ENV: &str = "LMS_API_URL";

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Remote LMS API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Loan accounting constants
    #[serde(default)]
    pub policy: PolicyConfig,

    /// Storage backend selection
    #[serde(default)]
    pub storage: StorageConfig,

    /// Console logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Apply environment overrides on top of the file values.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                log::debug!("Using {} = {}", API_URL_ENV, url);
                self.api.base_url = url;
            }
        }
        self
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(AppError::validation("api.base_url is empty"));
        }
        url::Url::parse(&self.api.base_url)?;
        if self.api.user_agent.trim().is_empty() {
            return Err(AppError::validation("api.user_agent is empty"));
        }
        if self.api.timeout_secs == 0 {
            return Err(AppError::validation("api.timeout_secs must be > 0"));
        }
        if self.policy.borrowing_period_days == 0 {
            return Err(AppError::validation(
                "policy.borrowing_period_days must be > 0",
            ));
        }
        if self.storage.data_dir.as_os_str().is_empty() {
            return Err(AppError::validation("storage.data_dir is empty"));
        }
        Ok(())
    }

    /// Build the loan policy described by the `[policy]` section.
    pub fn loan_policy(&self) -> LoanPolicy {
        LoanPolicy::new(
            self.policy.borrowing_period_days,
            self.policy.fine_per_day,
        )
    }

    /// Resolve the data directory relative to a base path.
    pub fn data_dir(&self, base: &Path) -> PathBuf {
        if self.storage.data_dir.is_absolute() {
            self.storage.data_dir.clone()
        } else {
            base.join(&self.storage.data_dir)
        }
    }
}

/// HTTP client settings for the remote backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the LMS API (routes are joined onto it)
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Use `Add_Admin` instead of `Register` for sign up
    #[serde(default)]
    pub legacy_admin_routes: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            legacy_admin_routes: false,
        }
    }
}

/// Loan accounting constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Days a book may be kept before it becomes overdue
    #[serde(default = "defaults::borrowing_period")]
    pub borrowing_period_days: u32,

    /// Fine charged per full overdue day
    #[serde(default = "defaults::fine_per_day")]
    pub fine_per_day: u64,

    /// Currency symbol used when printing fines and prices
    #[serde(default = "defaults::currency")]
    pub currency: String,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            borrowing_period_days: defaults::borrowing_period(),
            fine_per_day: defaults::fine_per_day(),
            currency: defaults::currency(),
        }
    }
}

/// Which storage backend the console talks to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// The external LMS HTTP API
    #[default]
    Remote,
    /// JSON files in the data directory
    Local,
}

/// Storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: Backend,

    /// Directory for the local store and the session file, relative to
    /// the storage directory holding `config.toml`
    #[serde(default = "defaults::data_dir")]
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            data_dir: defaults::data_dir(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum level of console output
    #[serde(default = "defaults::log_level")]
    pub level: String,

    /// Print sub-item detail lines under summaries
    #[serde(default = "defaults::show_details")]
    pub show_details: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
            show_details: defaults::show_details(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    // Api defaults
    pub fn base_url() -> String {
        "http://localhost:5000".into()
    }
    pub fn user_agent() -> String {
        "lms-console/0.1".into()
    }
    pub fn timeout() -> u64 {
        30
    }

    // Policy defaults
    pub fn borrowing_period() -> u32 {
        2
    }
    pub fn fine_per_day() -> u64 {
        100
    }
    pub fn currency() -> String {
        "₹".into()
    }

    // Storage defaults
    pub fn data_dir() -> PathBuf {
        PathBuf::from(".")
    }

    // Logging defaults
    pub fn log_level() -> String {
        "info".into()
    }
    pub fn show_details() -> bool {
        true
    }
}
