//! Shell-company layering chain detection.
//!
//! A shell chain is a simple forward path of exactly `shell_chain_length`
//! accounts whose interior hops all have a degree inside the configured band.
//! The search never extends a path past that length.

use crate::config::AnalysisConfig;
use crate::graph::TransactionGraph;
use crate::types::ShellChain;
use ringwatch_core::{kernel::KernelMetadata, traits::Kernel};

/// Layering chain detection kernel.
#[derive(Debug, Clone)]
pub struct ShellChainDetector {
    metadata: KernelMetadata,
}

impl Default for ShellChainDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl ShellChainDetector {
    /// Create a new shell chain detection kernel.
    #[must_use]
    pub fn new() -> Self {
        Self {
            metadata: KernelMetadata::new("aml/shell-chain-detection")
                .with_description("Fixed-length paths through low-degree intermediaries"),
        }
    }

    /// Find shell chains.
    ///
    /// No de-duplication: parallel edges or overlapping starts can report the
    /// same ordered chain more than once.
    pub fn compute(graph: &TransactionGraph, config: &AnalysisConfig) -> Vec<ShellChain> {
        let degrees = graph.degrees(config.degree_mode);
        let mut chains = Vec::new();

        for start in 0..graph.node_count() {
            if graph.successors(start).is_empty() {
                continue;
            }
            let mut search = ChainSearch {
                graph,
                config,
                degrees: &degrees,
                path: Vec::with_capacity(config.shell_chain_length),
                found: &mut chains,
            };
            search.extend(start);
        }

        tracing::debug!(
            kernel = "aml/shell-chain-detection",
            chains = chains.len(),
            "shell chain search complete"
        );

        chains
    }
}

impl Kernel for ShellChainDetector {
    fn metadata(&self) -> &KernelMetadata {
        &self.metadata
    }
}

struct ChainSearch<'a> {
    graph: &'a TransactionGraph,
    config: &'a AnalysisConfig,
    degrees: &'a [usize],
    path: Vec<usize>,
    found: &'a mut Vec<ShellChain>,
}

impl ChainSearch<'_> {
    fn extend(&mut self, node: usize) {
        let graph = self.graph;
        self.path.push(node);

        if self.path.len() == self.config.shell_chain_length {
            self.classify();
        } else {
            for &next in graph.successors(node) {
                if !self.path.contains(&next) {
                    self.extend(next);
                }
            }
        }

        self.path.pop();
    }

    fn classify(&mut self) {
        let interior = &self.path[1..self.path.len() - 1];
        if !interior
            .iter()
            .all(|&hop| self.config.is_shell_degree(self.degrees[hop]))
        {
            return;
        }

        self.found.push(ShellChain {
            accounts: self
                .path
                .iter()
                .map(|&i| self.graph.account(i).to_string())
                .collect(),
            intermediate_degrees: interior.iter().map(|&hop| self.degrees[hop]).collect(),
        });
    }
}
