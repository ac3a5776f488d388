//! End-to-end ledger analysis.
//!
//! `analyze` validates the ledger, builds the transaction graph, runs the
//! three detectors and compiles their hits into rings. It is a pure function
//! of its input: it either returns a complete result or an error.

use crate::config::AnalysisConfig;
use crate::cycles::CycleDetector;
use crate::graph::{GraphBuilder, TransactionGraph};
use crate::messages::{AnalysisInput, AnalysisOutput};
use crate::scoring::{FeatureRiskScorer, RingCompiler, RiskScorer};
use crate::shell::ShellChainDetector;
use crate::smurfing::SmurfingDetector;
use crate::types::{AnalysisResult, Cycle, ShellChain, SmurfingPatterns, Transaction};
use ringwatch_core::error::{Result, RingwatchError};
use ringwatch_core::kernel::KernelMetadata;
use ringwatch_core::traits::{BatchKernel, Kernel};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

/// Analyze a ledger with the given configuration.
pub fn analyze(transactions: &[Transaction], config: &AnalysisConfig) -> Result<AnalysisResult> {
    AmlAnalyzer::new(config.clone()).analyze(transactions)
}

/// Check the ledger preconditions.
///
/// Rejects an empty ledger, repeated transaction ids, empty ids and negative
/// or non-finite amounts.
pub fn validate_transactions(transactions: &[Transaction]) -> Result<()> {
    if transactions.is_empty() {
        return Err(RingwatchError::invalid_input("transaction list is empty"));
    }

    let mut ids: HashSet<&str> = HashSet::with_capacity(transactions.len());
    for (position, tx) in transactions.iter().enumerate() {
        if tx.id.is_empty() {
            return Err(RingwatchError::invalid_input(format!(
                "transaction at position {} has an empty id",
                position
            )));
        }
        if !ids.insert(&tx.id) {
            return Err(RingwatchError::invalid_input(format!(
                "duplicate transaction id: {}",
                tx.id
            )));
        }
        if tx.sender.is_empty() || tx.receiver.is_empty() {
            return Err(RingwatchError::invalid_input(format!(
                "transaction {} has an empty account id",
                tx.id
            )));
        }
        if !tx.amount.is_finite() || tx.amount < 0.0 {
            return Err(RingwatchError::invalid_input(format!(
                "transaction {} has invalid amount {}",
                tx.id, tx.amount
            )));
        }
    }

    Ok(())
}

/// Money-muling ring analysis kernel.
#[derive(Debug, Clone)]
pub struct AmlAnalyzer {
    metadata: KernelMetadata,
    config: AnalysisConfig,
    compiler: RingCompiler,
}

impl Default for AmlAnalyzer {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}

impl AmlAnalyzer {
    /// Create an analyzer using the feature-based risk scorer.
    #[must_use]
    pub fn new(config: AnalysisConfig) -> Self {
        let scorer = Arc::new(FeatureRiskScorer::from_config(&config));
        Self::with_scorer(config, scorer)
    }

    /// Create an analyzer with a custom ring scorer.
    #[must_use]
    pub fn with_scorer(config: AnalysisConfig, scorer: Arc<dyn RiskScorer>) -> Self {
        Self {
            metadata: KernelMetadata::new("aml/analysis")
                .with_description("Cycle, smurfing and shell-chain ring analysis"),
            compiler: RingCompiler::with_scorer(config.clone(), scorer),
            config,
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyze a ledger.
    pub fn analyze(&self, transactions: &[Transaction]) -> Result<AnalysisResult> {
        self.analyze_with_graph(transactions).map(|(_, result)| result)
    }

    /// Analyze a ledger and also return the graph it was built on.
    ///
    /// Rendering adapters need both; neither is modified afterwards.
    pub fn analyze_with_graph(
        &self,
        transactions: &[Transaction],
    ) -> Result<(TransactionGraph, AnalysisResult)> {
        let started = Instant::now();
        self.config.validate()?;
        validate_transactions(transactions)?;

        let span = tracing::info_span!("analyze", transactions = transactions.len());
        let _guard = span.enter();

        let graph = GraphBuilder::build(transactions);
        tracing::debug!(
            accounts = graph.node_count(),
            edges = graph.edge_count(),
            "transaction graph built"
        );

        let (cycles, smurfing, shells) = self.detect(&graph);
        tracing::debug!(
            cycles = cycles.len(),
            fans = smurfing.len(),
            shell_chains = shells.len(),
            "detectors finished"
        );
        let result = self
            .compiler
            .compile(&graph, &cycles, &smurfing, &shells, started);

        tracing::info!(
            accounts = result.summary.total_accounts,
            flagged = result.summary.flagged_accounts,
            rings = result.summary.ring_count,
            elapsed_s = result.summary.elapsed_seconds,
            "analysis complete"
        );

        Ok((graph, result))
    }

    fn detect(&self, graph: &TransactionGraph) -> (Vec<Cycle>, SmurfingPatterns, Vec<ShellChain>) {
        let config = &self.config;
        if config.parallel_detectors {
            let (cycles, (smurfing, shells)) = rayon::join(
                || CycleDetector::compute(graph, config),
                || {
                    rayon::join(
                        || SmurfingDetector::compute(graph, config),
                        || ShellChainDetector::compute(graph, config),
                    )
                },
            );
            (cycles, smurfing, shells)
        } else {
            (
                CycleDetector::compute(graph, config),
                SmurfingDetector::compute(graph, config),
                ShellChainDetector::compute(graph, config),
            )
        }
    }
}

impl Kernel for AmlAnalyzer {
    fn metadata(&self) -> &KernelMetadata {
        &self.metadata
    }
}

impl BatchKernel<AnalysisInput, AnalysisOutput> for AmlAnalyzer {
    fn execute(&self, input: AnalysisInput) -> Result<AnalysisOutput> {
        let start = Instant::now();
        let result = self.analyze(&input.transactions)?;
        Ok(AnalysisOutput {
            result,
            compute_time_us: start.elapsed().as_micros() as u64,
        })
    }

    fn validate_input(&self, input: &AnalysisInput) -> Result<()> {
        validate_transactions(&input.transactions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CycleDedup;
    use crate::testing::{chain_txs, tx, HOUR_MS};
    use crate::types::{PatternTag, PatternType};

    #[test]
    fn test_analyzer_metadata() {
        let kernel = AmlAnalyzer::default();
        assert_eq!(kernel.metadata().id, "aml/analysis");
        assert_eq!(kernel.config(), &AnalysisConfig::default());
    }

    #[test]
    fn test_end_to_end_triangle() {
        let txs = vec![
            tx("T1", "A", "B", 100.0, 0),
            tx("T2", "B", "C", 100.0, 20 * 60_000),
            tx("T3", "C", "A", 100.0, 40 * 60_000),
        ];
        let result = analyze(&txs, &AnalysisConfig::default()).unwrap();

        assert_eq!(result.rings.len(), 1);
        assert_eq!(result.rings[0].pattern_type, PatternType::Cycle);
        let mut members = result.rings[0].members.clone();
        members.sort();
        assert_eq!(members, vec!["A", "B", "C"]);

        assert_eq!(result.accounts.len(), 3);
        assert!(result.accounts.iter().all(|a| a.suspicion_score >= 85.0));
        assert_eq!(result.summary.total_accounts, 3);
        assert_eq!(result.summary.flagged_accounts, 3);
        assert_eq!(result.summary.ring_count, 1);
    }

    #[test]
    fn test_clean_ledger_flags_nothing() {
        let txs = chain_txs(&["A", "B", "C"]);
        let result = analyze(&txs, &AnalysisConfig::default()).unwrap();
        assert!(result.rings.is_empty());
        assert!(result.accounts.is_empty());
        assert_eq!(result.summary.total_accounts, 3);
    }

    #[test]
    fn test_invalid_input_rejected() {
        let config = AnalysisConfig::default();

        let err = analyze(&[], &config).unwrap_err();
        assert!(matches!(err, RingwatchError::InvalidInput(_)));

        let dup = vec![tx("T1", "A", "B", 1.0, 0), tx("T1", "B", "C", 1.0, 1)];
        assert!(matches!(
            analyze(&dup, &config),
            Err(RingwatchError::InvalidInput(_))
        ));

        let negative = vec![tx("T1", "A", "B", -5.0, 0)];
        assert!(analyze(&negative, &config).is_err());

        let nan = vec![tx("T1", "A", "B", f64::NAN, 0)];
        assert!(analyze(&nan, &config).is_err());

        let unnamed = vec![tx("T1", "", "B", 1.0, 0)];
        assert!(analyze(&unnamed, &config).is_err());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = AnalysisConfig {
            window_ms: 0,
            ..Default::default()
        };
        let err = analyze(&chain_txs(&["A", "B"]), &config).unwrap_err();
        assert!(matches!(err, RingwatchError::ConfigError(_)));
    }

    fn mixed_ledger() -> Vec<Transaction> {
        let mut txs = chain_txs(&["A", "B", "C", "A"]);
        for i in 0..12 {
            txs.push(tx(&format!("F{}", i), &format!("M{}", i), "AGG", 900.0, i * HOUR_MS));
        }
        for i in 0..11 {
            txs.push(tx(&format!("G{}", i), "AGG", &format!("N{}", i), 850.0, (12 + i) * HOUR_MS));
        }
        txs.extend(chain_txs(&["O", "S1", "S2", "S3", "DST"]).into_iter().map(|mut t| {
            t.id = format!("L{}", t.id);
            t
        }));
        txs
    }

    #[test]
    fn test_deterministic_across_runs() {
        let txs = mixed_ledger();
        let config = AnalysisConfig::default();

        let first = analyze(&txs, &config).unwrap();
        let second = analyze(&txs, &config).unwrap();

        assert_eq!(first.accounts, second.accounts);
        assert_eq!(first.rings, second.rings);
        assert_eq!(first.summary.total_accounts, second.summary.total_accounts);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let txs = mixed_ledger();
        let sequential = analyze(&txs, &AnalysisConfig::default()).unwrap();
        let parallel = analyze(
            &txs,
            &AnalysisConfig {
                parallel_detectors: true,
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(sequential.rings, parallel.rings);
        assert_eq!(sequential.accounts, parallel.accounts);
    }

    #[test]
    fn test_mixed_ledger_patterns() {
        let result = analyze(&mixed_ledger(), &AnalysisConfig::default()).unwrap();

        assert_eq!(result.rings_of(PatternType::Cycle).count(), 1);
        assert_eq!(result.rings_of(PatternType::FanIn).count(), 1);
        assert_eq!(result.rings_of(PatternType::FanOut).count(), 1);
        assert_eq!(result.rings_of(PatternType::LayeringShell).count(), 2);

        // AGG is both aggregator and distributor: first ring wins.
        // 23 transfers also put it over the velocity threshold.
        let agg = result.account("AGG").unwrap();
        assert_eq!(agg.ring_id, "RING_002");
        assert_eq!(
            agg.detected_patterns,
            vec![
                PatternTag::SmurfingAggregation,
                PatternTag::SmurfingDistribution,
                PatternTag::HighVelocity
            ]
        );
        assert_eq!(agg.suspicion_score, 80.0);
    }

    #[test]
    fn test_scores_never_drop_below_floors() {
        let result = analyze(&mixed_ledger(), &AnalysisConfig::default()).unwrap();

        for ring in &result.rings {
            let floor = ring.pattern_type.account_floor();
            for member in &ring.members {
                let profile = result.account(member).unwrap();
                assert!(profile.suspicion_score >= floor);
                assert!(profile.suspicion_score <= 100.0);
            }
        }
    }

    #[test]
    fn test_batch_kernel_execute() {
        let kernel = AmlAnalyzer::new(AnalysisConfig {
            cycle_dedup: CycleDedup::Rotation,
            ..Default::default()
        });
        let output = kernel
            .execute(AnalysisInput::new(chain_txs(&["A", "B", "C", "A"])))
            .unwrap();
        assert_eq!(output.result.rings.len(), 1);

        let empty = AnalysisInput::new(Vec::new());
        assert!(kernel.validate_input(&empty).is_err());
        let err = kernel.execute(empty).unwrap_err();
        assert!(err.is_input_error());
    }

    #[test]
    fn test_analyze_with_graph() {
        let txs = chain_txs(&["A", "B", "C", "A"]);
        let (graph, result) = AmlAnalyzer::default().analyze_with_graph(&txs).unwrap();
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(result.summary.total_accounts, graph.node_count());
    }
}
