//! AML types and data structures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Opaque account identifier. Equality is exact string match.
pub type AccountId = String;

// ============================================================================
// Transaction Types
// ============================================================================

/// A money transfer between two accounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique transaction ID.
    pub id: String,
    /// Sending account.
    pub sender: AccountId,
    /// Receiving account.
    pub receiver: AccountId,
    /// Transferred amount (non-negative).
    pub amount: f64,
    /// When the transfer happened.
    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    /// Create a new transaction.
    pub fn new(
        id: impl Into<String>,
        sender: impl Into<AccountId>,
        receiver: impl Into<AccountId>,
        amount: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            sender: sender.into(),
            receiver: receiver.into(),
            amount,
            timestamp,
        }
    }
}

// ============================================================================
// Detector Outputs
// ============================================================================

/// A closed directed walk through distinct accounts.
///
/// The last member has an edge back to the first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cycle {
    /// Members in walk order.
    pub members: Vec<AccountId>,
}

impl Cycle {
    /// Number of accounts in the cycle.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns true if the cycle has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Direction of a smurfing fan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FanRole {
    /// Many senders converge on the center (aggregation).
    FanIn,
    /// The center distributes to many receivers.
    FanOut,
}

/// A fan-in or fan-out pattern inside one time window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FanPattern {
    /// Fan direction.
    pub role: FanRole,
    /// Aggregator (fan-in) or distributor (fan-out).
    pub center: AccountId,
    /// Distinct counterparties in first-seen order.
    pub counterparties: Vec<AccountId>,
    /// Epoch-aligned window index.
    pub window: i64,
}

/// Fan-in and fan-out patterns found by the smurfing detector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SmurfingPatterns {
    /// Aggregation patterns, window order.
    pub fan_in: Vec<FanPattern>,
    /// Distribution patterns, window order.
    pub fan_out: Vec<FanPattern>,
}

impl SmurfingPatterns {
    /// Total number of patterns.
    pub fn len(&self) -> usize {
        self.fan_in.len() + self.fan_out.len()
    }

    /// Returns true if no pattern was found.
    pub fn is_empty(&self) -> bool {
        self.fan_in.is_empty() && self.fan_out.is_empty()
    }
}

/// A layering path `[origin, hop.., destination]` through low-degree accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShellChain {
    /// Accounts in path order.
    pub accounts: Vec<AccountId>,
    /// Degree of each interior hop, in path order.
    pub intermediate_degrees: Vec<usize>,
}

// ============================================================================
// Rings and Profiles
// ============================================================================

/// Kind of pattern a ring was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternType {
    /// Circular fund flow.
    Cycle,
    /// Smurfing aggregation.
    FanIn,
    /// Smurfing distribution.
    FanOut,
    /// Shell-company layering chain.
    LayeringShell,
}

impl PatternType {
    /// Minimum suspicion score for members of a ring of this type.
    pub const fn account_floor(self) -> f64 {
        match self {
            PatternType::Cycle => 85.0,
            PatternType::FanIn | PatternType::FanOut => 75.0,
            PatternType::LayeringShell => 70.0,
        }
    }

    /// Wire name.
    pub const fn as_str(self) -> &'static str {
        match self {
            PatternType::Cycle => "cycle",
            PatternType::FanIn => "fan_in",
            PatternType::FanOut => "fan_out",
            PatternType::LayeringShell => "layering_shell",
        }
    }
}

impl From<FanRole> for PatternType {
    fn from(role: FanRole) -> Self {
        match role {
            FanRole::FanIn => PatternType::FanIn,
            FanRole::FanOut => PatternType::FanOut,
        }
    }
}

impl fmt::Display for PatternType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Explanation tag attached to a flagged account.
///
/// Serialized as its display string (e.g. `cycle_length_3`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternTag {
    /// Member of a cycle with the given number of accounts.
    CycleLength(usize),
    /// Member of a fan-in ring.
    SmurfingAggregation,
    /// Member of a fan-out ring.
    SmurfingDistribution,
    /// Member of a shell chain.
    ShellIntermediate,
    /// Transaction count above the velocity threshold.
    HighVelocity,
    /// Total moved amount above the volume threshold.
    HighVolume,
}

impl fmt::Display for PatternTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternTag::CycleLength(n) => write!(f, "cycle_length_{}", n),
            PatternTag::SmurfingAggregation => f.write_str("smurfing_aggregation"),
            PatternTag::SmurfingDistribution => f.write_str("smurfing_distribution"),
            PatternTag::ShellIntermediate => f.write_str("shell_intermediate"),
            PatternTag::HighVelocity => f.write_str("high_velocity"),
            PatternTag::HighVolume => f.write_str("high_volume"),
        }
    }
}

impl FromStr for PatternTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "smurfing_aggregation" => Ok(PatternTag::SmurfingAggregation),
            "smurfing_distribution" => Ok(PatternTag::SmurfingDistribution),
            "shell_intermediate" => Ok(PatternTag::ShellIntermediate),
            "high_velocity" => Ok(PatternTag::HighVelocity),
            "high_volume" => Ok(PatternTag::HighVolume),
            other => other
                .strip_prefix("cycle_length_")
                .and_then(|n| n.parse().ok())
                .map(PatternTag::CycleLength)
                .ok_or_else(|| format!("Unknown pattern tag: {}", other)),
        }
    }
}

impl Serialize for PatternTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PatternTag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A group of accounts implicated by one detected pattern instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FraudRing {
    /// Sequential ring id (`RING_001`, ...).
    pub id: String,
    /// Member accounts in pattern order.
    pub members: Vec<AccountId>,
    /// Pattern the ring was derived from.
    pub pattern_type: PatternType,
    /// Ring severity (0-100).
    pub risk_score: f64,
}

/// Risk profile of a flagged account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountProfile {
    /// Account id.
    pub account_id: AccountId,
    /// Cumulative suspicion score (0-100).
    pub suspicion_score: f64,
    /// Tags in the order they were attached.
    pub detected_patterns: Vec<PatternTag>,
    /// First ring that flagged this account.
    pub ring_id: String,
}

/// Totals for one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    /// Distinct accounts in the graph.
    pub total_accounts: usize,
    /// Accounts with a profile.
    pub flagged_accounts: usize,
    /// Rings compiled.
    pub ring_count: usize,
    /// Wall time of the whole analysis.
    pub elapsed_seconds: f64,
}

/// Outcome of an analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Flagged accounts, highest suspicion first.
    pub accounts: Vec<AccountProfile>,
    /// Rings in compilation order.
    pub rings: Vec<FraudRing>,
    /// Totals.
    pub summary: AnalysisSummary,
}

impl AnalysisResult {
    /// Look up the profile of an account.
    pub fn account(&self, account_id: &str) -> Option<&AccountProfile> {
        self.accounts.iter().find(|a| a.account_id == account_id)
    }

    /// Rings of one pattern type.
    pub fn rings_of(&self, pattern_type: PatternType) -> impl Iterator<Item = &FraudRing> {
        self.rings
            .iter()
            .filter(move |r| r.pattern_type == pattern_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_tag_strings() {
        assert_eq!(PatternTag::CycleLength(4).to_string(), "cycle_length_4");
        assert_eq!(
            "cycle_length_5".parse::<PatternTag>().unwrap(),
            PatternTag::CycleLength(5)
        );
        assert_eq!(
            "smurfing_distribution".parse::<PatternTag>().unwrap(),
            PatternTag::SmurfingDistribution
        );
        assert!("cycle_length_x".parse::<PatternTag>().is_err());
        assert!("layering".parse::<PatternTag>().is_err());
    }

    #[test]
    fn test_pattern_tag_serde() {
        let tags = vec![PatternTag::CycleLength(3), PatternTag::HighVolume];
        let json = serde_json::to_string(&tags).unwrap();
        assert_eq!(json, r#"["cycle_length_3","high_volume"]"#);

        let back: Vec<PatternTag> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tags);
    }

    #[test]
    fn test_pattern_type_wire_names() {
        assert_eq!(
            serde_json::to_string(&PatternType::LayeringShell).unwrap(),
            r#""layering_shell""#
        );
        assert_eq!(PatternType::from(FanRole::FanOut), PatternType::FanOut);
        assert_eq!(PatternType::Cycle.account_floor(), 85.0);
        assert_eq!(PatternType::FanIn.account_floor(), 75.0);
        assert_eq!(PatternType::LayeringShell.account_floor(), 70.0);
    }
}
