//! File and environment configuration.
//!
//! Bundles the analysis thresholds and the logging setup into one TOML
//! document:
//!
//! ```toml
//! [analysis]
//! fan_threshold = 10
//! window_ms = 259200000
//! degree_mode = "transaction_count"
//!
//! [logging]
//! filter = "info"
//! json = false
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use ringwatch::config::RingwatchConfig;
//!
//! // Load from environment
//! let config = RingwatchConfig::from_env()?;
//!
//! // Or load from file
//! let config = RingwatchConfig::from_file("ringwatch.toml")?;
//! config.logging.init()?;
//! ```

use ringwatch_aml::config::{AnalysisConfig, CycleDedup, DegreeMode};
use ringwatch_core::error::{Result, RingwatchError};
use ringwatch_core::logging::LogConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// Top-level ringwatch configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RingwatchConfig {
    /// Detection thresholds and options.
    pub analysis: AnalysisConfig,
    /// Logging configuration.
    pub logging: LogConfig,
}

impl RingwatchConfig {
    /// Development configuration: verbose logging, default thresholds.
    pub fn development() -> Self {
        Self {
            analysis: AnalysisConfig::default(),
            logging: LogConfig::development(),
        }
    }

    /// Production configuration: JSON logs, detectors on the rayon pool.
    pub fn production() -> Self {
        Self {
            analysis: AnalysisConfig {
                parallel_detectors: true,
                ..Default::default()
            },
            logging: LogConfig::production(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// `RINGWATCH_ENV` picks the base profile (`production`/`prod`, otherwise
    /// development); individual `RINGWATCH_*` variables override single fields.
    pub fn from_env() -> Result<Self> {
        let mut config = match std::env::var("RINGWATCH_ENV")
            .as_deref()
            .unwrap_or("development")
        {
            "production" | "prod" => Self::production(),
            _ => Self::development(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Overlay `RINGWATCH_*` variables from the process environment.
    pub fn with_env_overrides(mut self) -> Result<Self> {
        self.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(self)
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        // Logging overrides
        if let Some(val) = lookup("RINGWATCH_LOG_LEVEL") {
            self.logging.filter = val;
        }
        if let Some(val) = lookup("RINGWATCH_LOG_JSON") {
            self.logging.json = parse_var("RINGWATCH_LOG_JSON", &val)?;
        }

        // Analysis overrides
        let analysis = &mut self.analysis;
        if let Some(val) = lookup("RINGWATCH_MAX_CYCLE_LENGTH") {
            analysis.max_cycle_length = parse_var("RINGWATCH_MAX_CYCLE_LENGTH", &val)?;
        }
        if let Some(val) = lookup("RINGWATCH_FAN_THRESHOLD") {
            analysis.fan_threshold = parse_var("RINGWATCH_FAN_THRESHOLD", &val)?;
        }
        if let Some(val) = lookup("RINGWATCH_WINDOW_MS") {
            analysis.window_ms = parse_var("RINGWATCH_WINDOW_MS", &val)?;
        }
        if let Some(val) = lookup("RINGWATCH_VELOCITY_THRESHOLD") {
            analysis.velocity_threshold = parse_var("RINGWATCH_VELOCITY_THRESHOLD", &val)?;
        }
        if let Some(val) = lookup("RINGWATCH_VOLUME_THRESHOLD") {
            analysis.volume_threshold = parse_var("RINGWATCH_VOLUME_THRESHOLD", &val)?;
        }
        if let Some(val) = lookup("RINGWATCH_DEGREE_MODE") {
            analysis.degree_mode = match val.as_str() {
                "transaction_count" => DegreeMode::TransactionCount,
                "distinct_neighbors" => DegreeMode::DistinctNeighbors,
                other => {
                    return Err(RingwatchError::config(format!(
                        "RINGWATCH_DEGREE_MODE: unknown mode {}",
                        other
                    )))
                }
            };
        }
        if let Some(val) = lookup("RINGWATCH_CYCLE_DEDUP") {
            analysis.cycle_dedup = match val.as_str() {
                "member_set" => CycleDedup::MemberSet,
                "rotation" => CycleDedup::Rotation,
                other => {
                    return Err(RingwatchError::config(format!(
                        "RINGWATCH_CYCLE_DEDUP: unknown policy {}",
                        other
                    )))
                }
            };
        }
        if let Some(val) = lookup("RINGWATCH_PARALLEL") {
            analysis.parallel_detectors = parse_var("RINGWATCH_PARALLEL", &val)?;
        }

        Ok(())
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| RingwatchError::config(format!("Failed to read config: {}", e)))?;

        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| RingwatchError::config(format!("Failed to parse config: {}", e)))
    }

    /// Render the configuration as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| RingwatchError::config(format!("Failed to serialize config: {}", e)))
    }

    /// Save configuration to a TOML file.
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = self.to_toml()?;

        std::fs::write(path.as_ref(), content)
            .map_err(|e| RingwatchError::config(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        self.analysis.validate()?;
        self.logging.validate()?;

        if self.analysis.max_cycle_length > 8 {
            tracing::warn!(
                max_cycle_length = self.analysis.max_cycle_length,
                "cycle search grows exponentially with length; expect slow analyses"
            );
        }

        Ok(())
    }

    /// Set the analysis configuration.
    pub fn with_analysis(mut self, analysis: AnalysisConfig) -> Self {
        self.analysis = analysis;
        self
    }

    /// Set the logging configuration.
    pub fn with_logging(mut self, logging: LogConfig) -> Self {
        self.logging = logging;
        self
    }
}

fn parse_var<T: FromStr>(name: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| RingwatchError::config(format!("{}: {}", name, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = RingwatchConfig::default();
        assert_eq!(config.analysis, AnalysisConfig::default());
        assert_eq!(config.logging.filter, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_production_config() {
        let config = RingwatchConfig::production();
        assert!(config.analysis.parallel_detectors);
        assert!(config.logging.json);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = RingwatchConfig::development();
        config
            .apply_overrides(vars(&[
                ("RINGWATCH_LOG_LEVEL", "warn,ringwatch_aml=debug"),
                ("RINGWATCH_FAN_THRESHOLD", "6"),
                ("RINGWATCH_WINDOW_MS", "3600000"),
                ("RINGWATCH_DEGREE_MODE", "distinct_neighbors"),
                ("RINGWATCH_PARALLEL", "true"),
            ]))
            .unwrap();

        assert_eq!(config.logging.filter, "warn,ringwatch_aml=debug");
        assert!(config.validate().is_ok());
        assert_eq!(config.analysis.fan_threshold, 6);
        assert_eq!(config.analysis.window_ms, 3_600_000);
        assert_eq!(config.analysis.degree_mode, DegreeMode::DistinctNeighbors);
        assert!(config.analysis.parallel_detectors);
        assert_eq!(config.analysis.max_cycle_length, 5);
    }

    #[test]
    fn test_env_override_errors() {
        let mut config = RingwatchConfig::default();
        let err = config
            .apply_overrides(vars(&[("RINGWATCH_FAN_THRESHOLD", "many")]))
            .unwrap_err();
        assert!(err.to_string().contains("RINGWATCH_FAN_THRESHOLD"));

        assert!(config
            .apply_overrides(vars(&[("RINGWATCH_CYCLE_DEDUP", "sometimes")]))
            .is_err());
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = RingwatchConfig::production();
        let text = config.to_toml().unwrap();
        assert!(text.contains("[analysis]"));
        assert!(text.contains("[logging]"));
        assert_eq!(RingwatchConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn test_partial_toml() {
        let config = RingwatchConfig::from_toml(
            r#"
            [analysis]
            fan_threshold = 4
            cycle_dedup = "rotation"
            "#,
        )
        .unwrap();
        assert_eq!(config.analysis.fan_threshold, 4);
        assert_eq!(config.analysis.cycle_dedup, CycleDedup::Rotation);
        assert_eq!(config.logging, LogConfig::default());
    }

    #[test]
    fn test_invalid_toml() {
        let err = RingwatchConfig::from_toml("analysis = 3").unwrap_err();
        assert!(matches!(err, RingwatchError::ConfigError(_)));
    }

    #[test]
    fn test_validation() {
        let config = RingwatchConfig::default().with_analysis(AnalysisConfig {
            fan_threshold: 0,
            ..Default::default()
        });
        assert!(config.validate().is_err());

        let config = RingwatchConfig::default()
            .with_logging(LogConfig::default().with_filter("ringwatch=noisy"));
        assert!(config.validate().is_err());
    }
}
