//! Detection configuration.
//!
//! Every threshold the detectors and the ring compiler use lives here. The
//! defaults look for 3-5 account cycles, 10-way fans inside 72 hour windows
//! and 4 account shell chains with interior degree 2-3.

use ringwatch_core::error::{Result, RingwatchError};
use serde::{Deserialize, Serialize};

/// 72 hours in milliseconds.
pub const DEFAULT_WINDOW_MS: i64 = 259_200_000;

/// How an account's degree is counted for the shell-chain filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegreeMode {
    /// One per transaction touching the account (parallel edges counted).
    #[default]
    TransactionCount,
    /// Distinct successors plus distinct predecessors.
    DistinctNeighbors,
}

/// Which cycles count as duplicates of each other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleDedup {
    /// Same unordered member set, regardless of rotation or direction.
    #[default]
    MemberSet,
    /// Same walk up to rotation; opposite directions stay distinct.
    Rotation,
}

/// Analysis configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Longest cycle (in accounts) the search explores.
    pub max_cycle_length: usize,
    /// Shortest cycle (in accounts) that is reported.
    pub min_cycle_length: usize,
    /// Minimum distinct counterparties for a fan pattern.
    pub fan_threshold: usize,
    /// Smurfing window size in milliseconds.
    pub window_ms: i64,
    /// Exact number of accounts in a shell chain.
    pub shell_chain_length: usize,
    /// Lowest degree allowed for a shell intermediate.
    pub shell_degree_min: usize,
    /// Highest degree allowed for a shell intermediate.
    pub shell_degree_max: usize,
    /// Transaction count above which flagged accounts get a velocity bonus.
    pub velocity_threshold: usize,
    /// Moved amount above which flagged accounts get a volume bonus.
    pub volume_threshold: f64,
    /// Degree definition for the shell filter.
    pub degree_mode: DegreeMode,
    /// Cycle duplicate policy.
    pub cycle_dedup: CycleDedup,
    /// Run the three detectors on the rayon pool.
    pub parallel_detectors: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_cycle_length: 5,
            min_cycle_length: 3,
            fan_threshold: 10,
            window_ms: DEFAULT_WINDOW_MS,
            shell_chain_length: 4,
            shell_degree_min: 2,
            shell_degree_max: 3,
            velocity_threshold: 20,
            volume_threshold: 50_000.0,
            degree_mode: DegreeMode::TransactionCount,
            cycle_dedup: CycleDedup::MemberSet,
            parallel_detectors: false,
        }
    }
}

impl AnalysisConfig {
    /// Check the configuration for values the detectors cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.min_cycle_length < 3 {
            return Err(RingwatchError::config(format!(
                "min_cycle_length must be at least 3, got {}",
                self.min_cycle_length
            )));
        }
        if self.max_cycle_length < self.min_cycle_length {
            return Err(RingwatchError::config(format!(
                "max_cycle_length ({}) is below min_cycle_length ({})",
                self.max_cycle_length, self.min_cycle_length
            )));
        }
        if self.fan_threshold == 0 {
            return Err(RingwatchError::config("fan_threshold must be positive"));
        }
        if self.window_ms <= 0 {
            return Err(RingwatchError::config(format!(
                "window_ms must be positive, got {}",
                self.window_ms
            )));
        }
        if self.shell_chain_length < 3 {
            return Err(RingwatchError::config(format!(
                "shell_chain_length must be at least 3, got {}",
                self.shell_chain_length
            )));
        }
        if self.shell_degree_min > self.shell_degree_max {
            return Err(RingwatchError::config(format!(
                "shell degree band is empty: [{}, {}]",
                self.shell_degree_min, self.shell_degree_max
            )));
        }
        if !self.volume_threshold.is_finite() || self.volume_threshold < 0.0 {
            return Err(RingwatchError::config(format!(
                "volume_threshold must be a non-negative number, got {}",
                self.volume_threshold
            )));
        }
        Ok(())
    }

    /// Returns true if `degree` lies inside the shell intermediate band.
    pub fn is_shell_degree(&self, degree: usize) -> bool {
        (self.shell_degree_min..=self.shell_degree_max).contains(&degree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AnalysisConfig::default();
        assert_eq!(config.max_cycle_length, 5);
        assert_eq!(config.min_cycle_length, 3);
        assert_eq!(config.fan_threshold, 10);
        assert_eq!(config.window_ms, 259_200_000);
        assert_eq!(config.shell_chain_length, 4);
        assert_eq!((config.shell_degree_min, config.shell_degree_max), (2, 3));
        assert_eq!(config.velocity_threshold, 20);
        assert_eq!(config.volume_threshold, 50_000.0);
        assert_eq!(config.degree_mode, DegreeMode::TransactionCount);
        assert_eq!(config.cycle_dedup, CycleDedup::MemberSet);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let bad = [
            AnalysisConfig {
                min_cycle_length: 2,
                ..Default::default()
            },
            AnalysisConfig {
                max_cycle_length: 2,
                ..Default::default()
            },
            AnalysisConfig {
                fan_threshold: 0,
                ..Default::default()
            },
            AnalysisConfig {
                window_ms: 0,
                ..Default::default()
            },
            AnalysisConfig {
                shell_chain_length: 2,
                ..Default::default()
            },
            AnalysisConfig {
                shell_degree_min: 4,
                ..Default::default()
            },
            AnalysisConfig {
                volume_threshold: f64::NAN,
                ..Default::default()
            },
        ];

        for config in &bad {
            assert!(config.validate().is_err(), "accepted {:?}", config);
        }
    }

    #[test]
    fn test_shell_degree_band() {
        let config = AnalysisConfig::default();
        assert!(!config.is_shell_degree(1));
        assert!(config.is_shell_degree(2));
        assert!(config.is_shell_degree(3));
        assert!(!config.is_shell_degree(4));
    }

    #[test]
    fn test_partial_deserialize_uses_defaults() {
        let config: AnalysisConfig =
            serde_json::from_str(r#"{"fan_threshold": 4, "degree_mode": "distinct_neighbors"}"#)
                .unwrap();
        assert_eq!(config.fan_threshold, 4);
        assert_eq!(config.degree_mode, DegreeMode::DistinctNeighbors);
        assert_eq!(config.max_cycle_length, 5);
    }
}
