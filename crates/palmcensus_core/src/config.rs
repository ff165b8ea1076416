//! Configuration file handling.
//!
//! Loads `palmcensus.toml`. Every section and field is optional and falls
//! back to the built-in defaults.

use crate::service::aggregation::DEFAULT_RECENT_LIMIT;
use crate::service::census_service::ServiceSettings;
use crate::service::dashboard::DEFAULT_MONITORING_OPERATIONS;
use crate::service::health::HealthPolicy;
use crate::service::prediction::PredictionConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure to read, parse or validate configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub summary: SummaryConfig,
    #[serde(default)]
    pub monitoring: MonitoringConfig,
    #[serde(default)]
    pub prediction: PredictionConfig,
    #[serde(default)]
    pub health: HealthPolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

fn default_database_path() -> PathBuf {
    PathBuf::from("palmcensus.sqlite3")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Absolute directory for rolling log files; file logging is off when unset.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            dir: None,
        }
    }
}

fn default_log_level() -> String {
    crate::logging::default_log_level().to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryConfig {
    /// Operations aggregated by the dashboard summary.
    #[serde(default = "default_recent_limit")]
    pub recent_limit: u32,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            recent_limit: default_recent_limit(),
        }
    }
}

fn default_recent_limit() -> u32 {
    DEFAULT_RECENT_LIMIT
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoringConfig {
    #[serde(default = "default_operations_limit")]
    pub operations_limit: u32,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            operations_limit: default_operations_limit(),
        }
    }
}

fn default_operations_limit() -> u32 {
    DEFAULT_MONITORING_OPERATIONS
}

impl Config {
    /// Reads, parses and validates a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses and validates TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects zero limits, non-positive multipliers and misordered thresholds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.summary.recent_limit == 0 {
            return Err(invalid("summary.recent_limit", "must be at least 1"));
        }
        if self.monitoring.operations_limit == 0 {
            return Err(invalid("monitoring.operations_limit", "must be at least 1"));
        }

        let prediction = &self.prediction;
        for (field, value) in [
            ("prediction.red_fruit_growth", prediction.red_fruit_growth),
            ("prediction.black_fruit_growth", prediction.black_fruit_growth),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(invalid(field, format!("must be positive, got {value}")));
            }
        }
        if !(0.0..=1.0).contains(&prediction.confidence) {
            return Err(invalid(
                "prediction.confidence",
                format!("must be within [0, 1], got {}", prediction.confidence),
            ));
        }

        let health = &self.health;
        let ordered = 0.0 <= health.warning_threshold
            && health.warning_threshold < health.healthy_threshold
            && health.healthy_threshold <= 1.0;
        if !ordered {
            return Err(invalid(
                "health",
                format!(
                    "expected 0 <= warning_threshold < healthy_threshold <= 1, got {} and {}",
                    health.warning_threshold, health.healthy_threshold
                ),
            ));
        }

        Ok(())
    }

    /// Settings consumed by `CensusService`.
    pub fn service_settings(&self) -> ServiceSettings {
        ServiceSettings {
            summary_limit: self.summary.recent_limit,
            operations_limit: self.monitoring.operations_limit,
            prediction: self.prediction,
            health: self.health,
        }
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}
