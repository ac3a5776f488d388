//! Ring compilation and risk scoring.
//!
//! Detector hits are turned into fraud rings in a fixed order (cycles, fan-in,
//! fan-out, shell chains). Ring ids are allocated sequentially and an account's
//! `ring_id` is the first ring that touched it, so this pass is sequential even
//! when the detectors ran in parallel.

use crate::config::AnalysisConfig;
use crate::graph::TransactionGraph;
use crate::types::{
    AccountId, AccountProfile, AnalysisResult, AnalysisSummary, Cycle, FanPattern, FanRole,
    FraudRing, PatternTag, PatternType, ShellChain, SmurfingPatterns,
};
use ringwatch_core::{kernel::KernelMetadata, traits::Kernel};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

/// Added to flagged accounts above the velocity threshold.
pub const VELOCITY_BONUS: f64 = 5.0;
/// Added to flagged accounts above the volume threshold.
pub const VOLUME_BONUS: f64 = 3.0;
/// Upper bound for every score.
pub const MAX_SCORE: f64 = 100.0;

/// A detected pattern instance handed to a [`RiskScorer`].
#[derive(Debug, Clone, Copy)]
pub enum PatternRef<'a> {
    /// Circular flow.
    Cycle(&'a Cycle),
    /// Fan-in or fan-out.
    Fan(&'a FanPattern),
    /// Layering chain.
    Shell(&'a ShellChain),
}

impl PatternRef<'_> {
    /// Ring type for this pattern.
    pub fn pattern_type(&self) -> PatternType {
        match self {
            PatternRef::Cycle(_) => PatternType::Cycle,
            PatternRef::Fan(fan) => fan.role.into(),
            PatternRef::Shell(_) => PatternType::LayeringShell,
        }
    }
}

/// Computes the severity of a ring from its pattern.
///
/// Implementations must be deterministic; analysis results are compared
/// across runs.
pub trait RiskScorer: Send + Sync {
    /// Ring risk in `[0, 100]`.
    fn ring_risk(&self, pattern: PatternRef<'_>) -> f64;
}

/// Default scorer: a deterministic function of pattern features.
///
/// | pattern | range | grows with |
/// |---|---|---|
/// | cycle | 95-100 | cycle length |
/// | fan in/out | 80-95 | counterparties beyond the threshold |
/// | shell chain | 70-90 | how close intermediates sit to the low end of the degree band |
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRiskScorer {
    min_cycle_length: usize,
    max_cycle_length: usize,
    fan_threshold: usize,
    shell_degree_min: usize,
    shell_degree_max: usize,
}

impl FeatureRiskScorer {
    /// Scorer calibrated to a configuration.
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            min_cycle_length: config.min_cycle_length,
            max_cycle_length: config.max_cycle_length,
            fan_threshold: config.fan_threshold,
            shell_degree_min: config.shell_degree_min,
            shell_degree_max: config.shell_degree_max,
        }
    }

    fn cycle_risk(&self, cycle: &Cycle) -> f64 {
        let span = self.max_cycle_length.saturating_sub(self.min_cycle_length);
        if span == 0 {
            return 95.0;
        }
        let position = cycle.len().saturating_sub(self.min_cycle_length) as f64 / span as f64;
        (95.0 + 5.0 * position).min(MAX_SCORE)
    }

    fn fan_risk(&self, fan: &FanPattern) -> f64 {
        let count = fan.counterparties.len().max(1) as f64;
        let excess = (1.0 - self.fan_threshold as f64 / count).clamp(0.0, 1.0);
        80.0 + 15.0 * excess
    }

    fn shell_risk(&self, chain: &ShellChain) -> f64 {
        if chain.intermediate_degrees.is_empty() {
            return 70.0;
        }
        let band = (self.shell_degree_max.saturating_sub(self.shell_degree_min) + 1) as f64;
        let quietness: f64 = chain
            .intermediate_degrees
            .iter()
            .map(|&d| {
                let slack = self.shell_degree_max.saturating_sub(d) + 1;
                (slack as f64 / band).min(1.0)
            })
            .sum::<f64>()
            / chain.intermediate_degrees.len() as f64;
        70.0 + 20.0 * quietness
    }
}

impl Default for FeatureRiskScorer {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}

impl RiskScorer for FeatureRiskScorer {
    fn ring_risk(&self, pattern: PatternRef<'_>) -> f64 {
        match pattern {
            PatternRef::Cycle(cycle) => self.cycle_risk(cycle),
            PatternRef::Fan(fan) => self.fan_risk(fan),
            PatternRef::Shell(chain) => self.shell_risk(chain),
        }
    }
}

/// Round to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Ring compilation kernel.
#[derive(Clone)]
pub struct RingCompiler {
    metadata: KernelMetadata,
    config: AnalysisConfig,
    scorer: Arc<dyn RiskScorer>,
}

impl std::fmt::Debug for RingCompiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RingCompiler")
            .field("metadata", &self.metadata)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for RingCompiler {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}

impl RingCompiler {
    /// Create a ring compiler with the default feature scorer.
    #[must_use]
    pub fn new(config: AnalysisConfig) -> Self {
        let scorer = Arc::new(FeatureRiskScorer::from_config(&config));
        Self::with_scorer(config, scorer)
    }

    /// Create a ring compiler with a custom scorer.
    #[must_use]
    pub fn with_scorer(config: AnalysisConfig, scorer: Arc<dyn RiskScorer>) -> Self {
        Self {
            metadata: KernelMetadata::new("aml/ring-compiler")
                .with_description("Ring assembly, account suspicion scoring and ranking"),
            config,
            scorer,
        }
    }

    /// Merge detector outputs into rings and ranked account profiles.
    ///
    /// `started` marks the beginning of the analysis; the summary reports the
    /// wall time from there to the end of compilation.
    pub fn compile(
        &self,
        graph: &TransactionGraph,
        cycles: &[Cycle],
        smurfing: &SmurfingPatterns,
        shells: &[ShellChain],
        started: Instant,
    ) -> AnalysisResult {
        let mut book = ProfileBook::default();
        let mut rings: Vec<FraudRing> = Vec::new();

        for cycle in cycles {
            let tag = PatternTag::CycleLength(cycle.len());
            self.open_ring(
                &mut rings,
                &mut book,
                cycle.members.clone(),
                PatternRef::Cycle(cycle),
                tag,
            );
        }

        for fan in smurfing.fan_in.iter().chain(&smurfing.fan_out) {
            let tag = match fan.role {
                FanRole::FanIn => PatternTag::SmurfingAggregation,
                FanRole::FanOut => PatternTag::SmurfingDistribution,
            };
            let mut members = Vec::with_capacity(fan.counterparties.len() + 1);
            members.push(fan.center.clone());
            members.extend(fan.counterparties.iter().cloned());
            self.open_ring(&mut rings, &mut book, members, PatternRef::Fan(fan), tag);
        }

        for chain in shells {
            self.open_ring(
                &mut rings,
                &mut book,
                chain.accounts.clone(),
                PatternRef::Shell(chain),
                PatternTag::ShellIntermediate,
            );
        }

        self.apply_activity_bonuses(graph, &mut book);

        let mut accounts = book.into_profiles();
        for profile in &mut accounts {
            profile.suspicion_score = round1(profile.suspicion_score);
        }
        // Stable: ties keep first-flagged order.
        accounts.sort_by(|a, b| b.suspicion_score.total_cmp(&a.suspicion_score));

        let summary = AnalysisSummary {
            total_accounts: graph.node_count(),
            flagged_accounts: accounts.len(),
            ring_count: rings.len(),
            elapsed_seconds: started.elapsed().as_secs_f64(),
        };

        tracing::debug!(
            kernel = "aml/ring-compiler",
            rings = summary.ring_count,
            flagged = summary.flagged_accounts,
            "ring compilation complete"
        );

        AnalysisResult {
            accounts,
            rings,
            summary,
        }
    }

    fn open_ring(
        &self,
        rings: &mut Vec<FraudRing>,
        book: &mut ProfileBook,
        members: Vec<AccountId>,
        pattern: PatternRef<'_>,
        tag: PatternTag,
    ) {
        let pattern_type = pattern.pattern_type();
        let ring_id = format!("RING_{:03}", rings.len() + 1);
        let risk_score = round1(self.scorer.ring_risk(pattern).clamp(0.0, MAX_SCORE));

        for account in &members {
            book.mark(account, &ring_id, tag, pattern_type.account_floor());
        }

        rings.push(FraudRing {
            id: ring_id,
            members,
            pattern_type,
            risk_score,
        });
    }

    fn apply_activity_bonuses(&self, graph: &TransactionGraph, book: &mut ProfileBook) {
        let stats = graph.node_stats();

        for profile in &mut book.profiles {
            let Some(stat) = graph.index_of(&profile.account_id).map(|i| stats[i]) else {
                continue;
            };
            if stat.velocity() > self.config.velocity_threshold {
                profile.detected_patterns.push(PatternTag::HighVelocity);
                profile.suspicion_score = (profile.suspicion_score + VELOCITY_BONUS).min(MAX_SCORE);
            }
            if stat.volume > self.config.volume_threshold {
                profile.detected_patterns.push(PatternTag::HighVolume);
                profile.suspicion_score = (profile.suspicion_score + VOLUME_BONUS).min(MAX_SCORE);
            }
        }
    }
}

impl Kernel for RingCompiler {
    fn metadata(&self) -> &KernelMetadata {
        &self.metadata
    }
}

/// Account profiles in first-flagged order.
#[derive(Default)]
struct ProfileBook {
    index: HashMap<AccountId, usize>,
    profiles: Vec<AccountProfile>,
}

impl ProfileBook {
    fn mark(&mut self, account: &str, ring_id: &str, tag: PatternTag, floor: f64) {
        let slot = match self.index.get(account) {
            Some(&slot) => slot,
            None => {
                self.profiles.push(AccountProfile {
                    account_id: account.to_string(),
                    suspicion_score: 0.0,
                    detected_patterns: Vec::new(),
                    ring_id: ring_id.to_string(),
                });
                self.index.insert(account.to_string(), self.profiles.len() - 1);
                self.profiles.len() - 1
            }
        };

        let profile = &mut self.profiles[slot];
        profile.detected_patterns.push(tag);
        profile.suspicion_score = profile.suspicion_score.max(floor);
    }

    fn into_profiles(self) -> Vec<AccountProfile> {
        self.profiles
    }
}
