//! Circular flow detection.
//!
//! Enumerates simple directed cycles of bounded length with a depth-limited
//! DFS from every account. Each start account owns its own search state, so
//! starts are independent of each other.

use crate::config::{AnalysisConfig, CycleDedup};
use crate::graph::TransactionGraph;
use crate::types::Cycle;
use ringwatch_core::{kernel::KernelMetadata, traits::Kernel};
use std::collections::HashSet;

/// Bounded simple-cycle detection kernel.
#[derive(Debug, Clone)]
pub struct CycleDetector {
    metadata: KernelMetadata,
}

impl Default for CycleDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl CycleDetector {
    /// Create a new cycle detection kernel.
    #[must_use]
    pub fn new() -> Self {
        Self {
            metadata: KernelMetadata::new("aml/cycle-detection")
                .with_description("Bounded simple cycle enumeration over the transaction graph"),
        }
    }

    /// Find cycles of `min_cycle_length..=max_cycle_length` accounts, deduplicated.
    ///
    /// Cycles come out in discovery order: start accounts in graph order, then
    /// adjacency order. The first cycle found for a duplicate key is kept.
    pub fn compute(graph: &TransactionGraph, config: &AnalysisConfig) -> Vec<Cycle> {
        let mut found = Found {
            policy: config.cycle_dedup,
            seen: HashSet::new(),
            cycles: Vec::new(),
        };

        for start in 0..graph.node_count() {
            let mut search = CycleSearch {
                graph,
                start,
                min_len: config.min_cycle_length,
                max_len: config.max_cycle_length,
                path: Vec::with_capacity(config.max_cycle_length),
                found: &mut found,
            };
            search.extend(start);
        }

        tracing::debug!(
            kernel = "aml/cycle-detection",
            cycles = found.cycles.len(),
            "cycle search complete"
        );

        found
            .cycles
            .into_iter()
            .map(|path| Cycle {
                members: path.iter().map(|&i| graph.account(i).to_string()).collect(),
            })
            .collect()
    }
}

impl Kernel for CycleDetector {
    fn metadata(&self) -> &KernelMetadata {
        &self.metadata
    }
}

/// Unique cycles in discovery order.
struct Found {
    policy: CycleDedup,
    seen: HashSet<Vec<usize>>,
    cycles: Vec<Vec<usize>>,
}

impl Found {
    fn record(&mut self, path: &[usize]) {
        if self.seen.insert(dedup_key(path, self.policy)) {
            self.cycles.push(path.to_vec());
        }
    }
}

/// DFS state for one start account.
struct CycleSearch<'a> {
    graph: &'a TransactionGraph,
    start: usize,
    min_len: usize,
    max_len: usize,
    path: Vec<usize>,
    found: &'a mut Found,
}

impl CycleSearch<'_> {
    fn extend(&mut self, node: usize) {
        let graph = self.graph;
        self.path.push(node);

        // Parallel transfers lead to the same walk; try each neighbour once.
        let mut tried = HashSet::new();
        for &next in graph.successors(node) {
            if !tried.insert(next) {
                continue;
            }
            if next == self.start {
                if self.path.len() >= self.min_len {
                    self.found.record(&self.path);
                }
            } else if self.path.len() < self.max_len && !self.path.contains(&next) {
                self.extend(next);
            }
        }

        self.path.pop();
    }
}

fn dedup_key(cycle: &[usize], policy: CycleDedup) -> Vec<usize> {
    match policy {
        CycleDedup::MemberSet => {
            let mut key = cycle.to_vec();
            key.sort_unstable();
            key
        }
        CycleDedup::Rotation => {
            let pivot = cycle
                .iter()
                .enumerate()
                .min_by_key(|(_, &node)| node)
                .map_or(0, |(i, _)| i);
            let mut key = cycle[pivot..].to_vec();
            key.extend_from_slice(&cycle[..pivot]);
            key
        }
    }
}
