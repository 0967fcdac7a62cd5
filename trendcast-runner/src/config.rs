//! Job configuration and store credentials.
//!
//! Job parameters (symbol, windows, model tag) come from defaults, an
//! optional TOML file, and CLI flag overrides, validated once at startup.
//! Store credentials come only from the environment and are required
//! before any network call is made.

use secrecy::SecretString;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use trendcast_core::features::MA_WINDOW;

/// Environment variable holding the store endpoint URL.
pub const STORE_URL_VAR: &str = "SUPABASE_URL";
/// Environment variable holding the store service credential.
pub const STORE_KEY_VAR: &str = "SUPABASE_SERVICE_KEY";

/// Configuration errors. All of these abort the run before any I/O.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingCredential(&'static str),

    #[error("read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse config TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Parameters of one forecast job.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JobConfig {
    /// Instrument to fetch and forecast.
    pub symbol: String,
    /// Days of history requested from the provider.
    pub lookback_days: i64,
    /// Most recent feature rows used to fit the trend.
    pub training_window: usize,
    /// Tag written on every persisted record.
    pub model_version: String,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            symbol: "BTC-USD".into(),
            lookback_days: 60,
            training_window: 30,
            model_version: "linear_v1".into(),
        }
    }
}

impl JobConfig {
    /// Load a job config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse a job config from a TOML string. Unlisted fields keep their
    /// defaults; unknown fields are rejected.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Validate the parameters once, at startup.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.symbol.trim().is_empty() {
            return Err(ConfigError::Invalid("symbol must not be empty".into()));
        }
        if self.model_version.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "model_version must not be empty".into(),
            ));
        }
        if self.lookback_days < 1 {
            return Err(ConfigError::Invalid(format!(
                "lookback_days must be >= 1, got {}",
                self.lookback_days
            )));
        }
        if self.training_window < 2 {
            return Err(ConfigError::Invalid(format!(
                "training_window must be >= 2, got {}",
                self.training_window
            )));
        }
        // The feature builder consumes MA_WINDOW - 1 leading rows, so the
        // lookback must at least cover the training window plus that burn-in.
        let min_lookback = (self.training_window + MA_WINDOW - 1) as i64;
        if self.lookback_days < min_lookback {
            return Err(ConfigError::Invalid(format!(
                "lookback_days ({}) cannot cover training_window ({}) plus \
                 the {}-row feature burn-in; need at least {}",
                self.lookback_days,
                self.training_window,
                MA_WINDOW - 1,
                min_lookback
            )));
        }
        Ok(())
    }
}

/// Remote-store endpoint and service credential.
#[derive(Debug)]
pub struct StoreConfig {
    pub url: String,
    pub service_key: SecretString,
}

impl StoreConfig {
    /// Read the store configuration from the environment.
    ///
    /// Absence of either variable aborts the run before any network call.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(&|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: &dyn Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let url = lookup(STORE_URL_VAR)
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::MissingCredential(STORE_URL_VAR))?;
        let key = lookup(STORE_KEY_VAR)
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::MissingCredential(STORE_KEY_VAR))?;

        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            service_key: SecretString::new(key.into()),
        })
    }
}
