//! Core configuration.

use crate::logging::{default_log_level, normalize_level};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Tunables for storage and hierarchy traversal.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CoreConfig {
    /// Maximum number of ancestors collected when walking an Area's parent
    /// chain. Exceeding it stops the walk at that ancestor.
    #[serde(default = "default_max_ancestry_depth")]
    pub max_ancestry_depth: usize,

    /// SQLite busy timeout applied to every opened connection (milliseconds).
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    /// Log level passed to `init_logging` by embedding applications.
    #[serde(default = "default_level")]
    pub log_level: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            max_ancestry_depth: default_max_ancestry_depth(),
            busy_timeout_ms: default_busy_timeout_ms(),
            log_level: default_level(),
        }
    }
}

impl CoreConfig {
    /// Parses configuration from a JSON document; missing keys take defaults.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_ancestry_depth == 0 {
            return Err(ConfigError::Invalid(
                "max_ancestry_depth must be at least 1".to_string(),
            ));
        }
        normalize_level(&self.log_level).map_err(ConfigError::Invalid)?;
        Ok(())
    }
}

/// Configuration load failure.
#[derive(Debug)]
pub enum ConfigError {
    /// Input is not valid JSON or has unknown/mistyped keys.
    Parse(serde_json::Error),
    /// Input parsed but violates a value constraint.
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "invalid configuration: {err}"),
            Self::Invalid(message) => write!(f, "invalid configuration: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

fn default_max_ancestry_depth() -> usize {
    // One level per area type.
    4
}

fn default_busy_timeout_ms() -> u64 {
    5_000
}

fn default_level() -> String {
    default_log_level().to_string()
}
