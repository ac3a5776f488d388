//! # Ringwatch AML
//!
//! Money-muling ring detection over a ledger of transfers.
//!
//! ## Kernels
//!
//! - `GraphBuilder` - directed multigraph from the ledger, first-seen account order
//! - `CycleDetector` - bounded simple cycles (circular fund routing)
//! - `SmurfingDetector` - fan-in / fan-out inside fixed time windows
//! - `ShellChainDetector` - fixed-length chains through low-degree intermediaries
//! - `RingCompiler` - rings, account suspicion scores and ranking
//! - `AmlAnalyzer` - the whole pipeline as one batch kernel
//!
//! ```rust,ignore
//! use ringwatch_aml::prelude::*;
//!
//! let result = analyze(&transactions, &AnalysisConfig::default())?;
//! for ring in &result.rings {
//!     println!("{} {} {:?}", ring.id, ring.pattern_type, ring.members);
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod config;
pub mod cycles;
pub mod graph;
pub mod messages;
pub mod scoring;
pub mod shell;
pub mod smurfing;
pub mod types;

#[cfg(test)]
mod testing;

pub use analysis::{analyze, validate_transactions, AmlAnalyzer};
pub use config::AnalysisConfig;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::analysis::*;
    pub use crate::config::*;
    pub use crate::cycles::*;
    pub use crate::graph::*;
    pub use crate::messages::*;
    pub use crate::scoring::*;
    pub use crate::shell::*;
    pub use crate::smurfing::*;
    pub use crate::types::*;
}

/// Metadata of every kernel in this crate, in pipeline order.
pub fn kernels() -> Vec<ringwatch_core::kernel::KernelMetadata> {
    use ringwatch_core::traits::Kernel;

    vec![
        graph::GraphBuilder::new().metadata().clone(),
        cycles::CycleDetector::new().metadata().clone(),
        smurfing::SmurfingDetector::new().metadata().clone(),
        shell::ShellChainDetector::new().metadata().clone(),
        scoring::RingCompiler::default().metadata().clone(),
        analysis::AmlAnalyzer::default().metadata().clone(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kernels() {
        let ids: Vec<String> = kernels().into_iter().map(|m| m.id).collect();
        assert_eq!(
            ids,
            vec![
                "aml/graph-builder",
                "aml/cycle-detection",
                "aml/smurfing-detection",
                "aml/shell-chain-detection",
                "aml/ring-compiler",
                "aml/analysis",
            ]
        );
    }

    #[test]
    fn test_prelude_imports() {
        use crate::prelude::*;

        let _config = AnalysisConfig::default();
        let _mode = DegreeMode::DistinctNeighbors;
        let _kind = PatternType::LayeringShell;
    }
}
