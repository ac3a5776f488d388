//! Batch message types for the analysis kernel.

use crate::types::{AnalysisResult, Transaction};
use serde::{Deserialize, Serialize};

/// Analysis input for batch execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisInput {
    /// Transactions to analyze, in ledger order.
    pub transactions: Vec<Transaction>,
}

impl AnalysisInput {
    /// Create a new analysis input.
    pub fn new(transactions: Vec<Transaction>) -> Self {
        Self { transactions }
    }
}

/// Analysis output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisOutput {
    /// The analysis result.
    pub result: AnalysisResult,
    /// Computation time in microseconds.
    pub compute_time_us: u64,
}
