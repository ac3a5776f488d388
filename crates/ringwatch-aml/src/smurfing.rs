//! Smurfing (fan-in / fan-out) detection.
//!
//! Transactions are bucketed into fixed, epoch-aligned windows of
//! `window_ms`. Windows do not slide: a burst that straddles a boundary is
//! split across two buckets and may miss the threshold in both.

use crate::config::AnalysisConfig;
use crate::graph::TransactionGraph;
use crate::types::{FanPattern, FanRole, SmurfingPatterns};
use ringwatch_core::{kernel::KernelMetadata, traits::Kernel};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Fan-in / fan-out detection kernel.
#[derive(Debug, Clone)]
pub struct SmurfingDetector {
    metadata: KernelMetadata,
}

impl Default for SmurfingDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl SmurfingDetector {
    /// Create a new smurfing detection kernel.
    #[must_use]
    pub fn new() -> Self {
        Self {
            metadata: KernelMetadata::new("aml/smurfing-detection")
                .with_description("Windowed fan-in/fan-out aggregation patterns"),
        }
    }

    /// Epoch-aligned window index of a millisecond timestamp.
    pub fn window_index(timestamp_ms: i64, window_ms: i64) -> i64 {
        timestamp_ms.div_euclid(window_ms)
    }

    /// Detect fan patterns.
    ///
    /// Windows are visited in ascending order; inside a window, centers and
    /// counterparties appear in the order their first transaction was seen.
    pub fn compute(graph: &TransactionGraph, config: &AnalysisConfig) -> SmurfingPatterns {
        let mut windows: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
        for (i, edge) in graph.edges().iter().enumerate() {
            let window = Self::window_index(edge.timestamp.timestamp_millis(), config.window_ms);
            windows.entry(window).or_default().push(i);
        }

        let mut patterns = SmurfingPatterns::default();

        for (&window, edge_ids) in &windows {
            let mut senders = Fans::default();
            let mut receivers = Fans::default();

            for &e in edge_ids {
                let edge = &graph.edges()[e];
                senders.add(edge.target, edge.source);
                receivers.add(edge.source, edge.target);
            }

            patterns
                .fan_in
                .extend(senders.patterns(graph, FanRole::FanIn, window, config.fan_threshold));
            patterns
                .fan_out
                .extend(receivers.patterns(graph, FanRole::FanOut, window, config.fan_threshold));
        }

        tracing::debug!(
            kernel = "aml/smurfing-detection",
            windows = windows.len(),
            fan_in = patterns.fan_in.len(),
            fan_out = patterns.fan_out.len(),
            "smurfing scan complete"
        );

        patterns
    }
}

impl Kernel for SmurfingDetector {
    fn metadata(&self) -> &KernelMetadata {
        &self.metadata
    }
}

/// Distinct counterparties per center inside one window, insertion ordered.
#[derive(Default)]
struct Fans {
    slots: HashMap<usize, usize>,
    centers: Vec<(usize, Vec<usize>, HashSet<usize>)>,
}

impl Fans {
    fn add(&mut self, center: usize, counterparty: usize) {
        let slot = *self.slots.entry(center).or_insert_with(|| {
            self.centers.push((center, Vec::new(), HashSet::new()));
            self.centers.len() - 1
        });
        let (_, ordered, seen) = &mut self.centers[slot];
        if seen.insert(counterparty) {
            ordered.push(counterparty);
        }
    }

    fn patterns<'a>(
        &'a self,
        graph: &'a TransactionGraph,
        role: FanRole,
        window: i64,
        threshold: usize,
    ) -> impl Iterator<Item = FanPattern> + 'a {
        self.centers
            .iter()
            .filter(move |(_, ordered, _)| ordered.len() >= threshold)
            .map(move |(center, ordered, _)| FanPattern {
                role,
                center: graph.account(*center).to_string(),
                counterparties: ordered
                    .iter()
                    .map(|&i| graph.account(i).to_string())
                    .collect(),
                window,
            })
    }
}
