//! # Ringwatch
//!
//! Batch detection of money-muling rings in transaction ledgers.
//!
//! A ledger of transfers is turned into a directed multigraph and searched
//! for three laundering shapes:
//!
//! | pattern | shape | account floor |
//! |---------|-------|---------------|
//! | `cycle` | funds routed back to their origin through 3-5 accounts | 85 |
//! | `fan_in` / `fan_out` | ten or more counterparties inside one 72 hour window | 75 |
//! | `layering_shell` | 4-account chains through low-activity intermediaries | 70 |
//!
//! Each detected instance becomes a fraud ring; flagged accounts get a
//! suspicion score and the pattern tags that explain it.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ringwatch::prelude::*;
//!
//! let report = ringwatch::ingest::read_file("ledger.csv", IngestMode::Lenient)?;
//! let result = analyze(&report.transactions, &AnalysisConfig::default())?;
//!
//! for ring in &result.rings {
//!     println!("{} {} risk={:.1}", ring.id, ring.pattern_type, ring.risk_score);
//! }
//! println!("{}", ringwatch::export::to_json(&result)?);
//! ```
//!
//! ## Crates
//!
//! - `ringwatch-core`: errors, kernel metadata and traits, logging setup
//! - `ringwatch-aml`: graph construction, detectors, ring compilation
//! - `ringwatch`: this facade plus CSV ingestion, JSON export, file
//!   configuration and the demo ledger

#![warn(missing_docs)]
#![warn(clippy::all)]

// Re-export core crate
pub use ringwatch_core as core;

// Re-export detection crate
pub use ringwatch_aml as aml;

pub mod config;
pub mod demo;
pub mod export;
pub mod ingest;

pub use ringwatch_aml::analyze;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use ringwatch::prelude::*;
/// ```
pub mod prelude {
    pub use ringwatch_core::prelude::*;

    pub use ringwatch_aml::analysis::{analyze, AmlAnalyzer};
    pub use ringwatch_aml::config::{AnalysisConfig, CycleDedup, DegreeMode};
    pub use ringwatch_aml::scoring::{FeatureRiskScorer, RiskScorer};
    pub use ringwatch_aml::types::{
        AccountProfile, AnalysisResult, FraudRing, PatternTag, PatternType, Transaction,
    };

    pub use crate::config::RingwatchConfig;
    pub use crate::export::AnalysisReport;
    pub use crate::ingest::{IngestMode, IngestReport};
}

/// Version information.
pub mod version {
    /// Crate version.
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
}

/// Catalog of the analysis kernels shipped with ringwatch.
pub mod catalog {
    use ringwatch_core::kernel::KernelMetadata;

    /// Metadata of every kernel, in pipeline order.
    pub fn kernels() -> Vec<KernelMetadata> {
        ringwatch_aml::kernels()
    }

    /// Look up a kernel by id.
    pub fn find(id: &str) -> Option<KernelMetadata> {
        kernels().into_iter().find(|k| k.id == id)
    }

    /// Total kernel count.
    pub fn total_kernel_count() -> usize {
        kernels().len()
    }
}
