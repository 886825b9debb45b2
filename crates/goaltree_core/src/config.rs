//! Cascade engine configuration.
//!
//! # Invariants
//! - `CascadeConfig::default()` is always valid.
//! - Loaded configs are validated before they are returned.

use crate::progress::achievement::RegressionPolicy;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::time::Duration;

const DEFAULT_MAX_CONFLICT_RETRIES: u32 = 3;
const DEFAULT_PROGRESS_CACHE_TTL_SECS: u64 = 300;

/// Tunables for the cascade coordinator and progress read path.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CascadeConfig {
    /// Extra cascade attempts after a concurrency conflict.
    pub max_conflict_retries: u32,
    pub regression_policy: RegressionPolicy,
    /// TTL for cached progress snapshots.
    pub progress_cache_ttl_secs: u64,
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            max_conflict_retries: DEFAULT_MAX_CONFLICT_RETRIES,
            regression_policy: RegressionPolicy::default(),
            progress_cache_ttl_secs: DEFAULT_PROGRESS_CACHE_TTL_SECS,
        }
    }
}

impl CascadeConfig {
    /// Parses and validates a JSON config. Missing fields take defaults.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(raw).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|err| ConfigError::Read(format!("{}: {err}", path.display())))?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.progress_cache_ttl_secs == 0 {
            return Err(ConfigError::Invalid(
                "progress_cache_ttl_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn progress_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.progress_cache_ttl_secs)
    }
}

/// Errors from loading a `CascadeConfig`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Read(String),
    Parse(String),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read(message) => write!(f, "failed to read cascade config: {message}"),
            Self::Parse(message) => write!(f, "failed to parse cascade config: {message}"),
            Self::Invalid(message) => write!(f, "invalid cascade config: {message}"),
        }
    }
}

impl Error for ConfigError {}
