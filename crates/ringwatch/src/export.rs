//! JSON report export.
//!
//! The report keeps the field names downstream tooling already consumes
//! (`suspicious_accounts`, `fraud_rings`, `summary`).

use ringwatch_aml::scoring::round1;
use ringwatch_aml::types::{AnalysisResult, PatternTag, PatternType};
use ringwatch_core::error::{Result, RingwatchError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A flagged account as it appears in the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuspiciousAccount {
    /// Account identifier.
    pub account_id: String,
    /// Suspicion score in `[0, 100]`.
    pub suspicion_score: f64,
    /// Pattern tags, one per ring membership plus activity tags.
    pub detected_patterns: Vec<PatternTag>,
    /// First ring the account was placed in.
    pub ring_id: String,
}

/// A ring as it appears in the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RingEntry {
    /// Ring identifier (`RING_001`, ...).
    pub ring_id: String,
    /// Member accounts.
    pub member_accounts: Vec<String>,
    /// Pattern family.
    pub pattern_type: PatternType,
    /// Ring severity.
    pub risk_score: f64,
}

/// Report totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Distinct accounts in the ledger.
    pub total_accounts_analyzed: usize,
    /// Flagged accounts.
    pub suspicious_accounts_flagged: usize,
    /// Rings found.
    pub fraud_rings_detected: usize,
    /// Wall time, rounded to a tenth of a second.
    pub processing_time_seconds: f64,
}

/// Complete analysis report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Flagged accounts, highest suspicion first.
    pub suspicious_accounts: Vec<SuspiciousAccount>,
    /// Rings in detection order.
    pub fraud_rings: Vec<RingEntry>,
    /// Totals.
    pub summary: ReportSummary,
}

impl From<&AnalysisResult> for AnalysisReport {
    fn from(result: &AnalysisResult) -> Self {
        Self {
            suspicious_accounts: result
                .accounts
                .iter()
                .map(|a| SuspiciousAccount {
                    account_id: a.account_id.clone(),
                    suspicion_score: a.suspicion_score,
                    detected_patterns: a.detected_patterns.clone(),
                    ring_id: a.ring_id.clone(),
                })
                .collect(),
            fraud_rings: result
                .rings
                .iter()
                .map(|r| RingEntry {
                    ring_id: r.id.clone(),
                    member_accounts: r.members.clone(),
                    pattern_type: r.pattern_type,
                    risk_score: r.risk_score,
                })
                .collect(),
            summary: ReportSummary {
                total_accounts_analyzed: result.summary.total_accounts,
                suspicious_accounts_flagged: result.summary.flagged_accounts,
                fraud_rings_detected: result.summary.ring_count,
                processing_time_seconds: round1(result.summary.elapsed_seconds),
            },
        }
    }
}

impl AnalysisReport {
    /// Render as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| RingwatchError::SerializationError(e.to_string()))
    }

    /// Parse a report back from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| RingwatchError::SerializationError(e.to_string()))
    }

    /// Write the report to a file.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path.as_ref(), self.to_json()?)?;
        Ok(())
    }
}

/// Render an analysis result as a JSON report.
pub fn to_json(result: &AnalysisResult) -> Result<String> {
    AnalysisReport::from(result).to_json()
}
