//! Transaction graph construction.
//!
//! The ledger is turned into a directed multigraph: one edge per transaction,
//! parallel edges kept. Accounts are interned to dense indices in first-seen
//! order (sender before receiver), and adjacency lists keep transaction order,
//! so every traversal over the graph is reproducible.

use crate::config::DegreeMode;
use crate::types::{AccountId, Transaction};
use chrono::{DateTime, Utc};
use ringwatch_core::{kernel::KernelMetadata, traits::Kernel};
use std::collections::{HashMap, HashSet};

/// One transaction as an edge between account indices.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphEdge {
    /// Sender index.
    pub source: usize,
    /// Receiver index.
    pub target: usize,
    /// Transferred amount.
    pub amount: f64,
    /// Transfer time.
    pub timestamp: DateTime<Utc>,
    /// Originating transaction id.
    pub transaction_id: String,
}

/// Activity totals for one account.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NodeStats {
    /// Transactions received.
    pub in_count: usize,
    /// Transactions sent.
    pub out_count: usize,
    /// Sum of amounts sent and received.
    pub volume: f64,
}

impl NodeStats {
    /// Transactions touching the account in either direction.
    pub fn velocity(&self) -> usize {
        self.in_count + self.out_count
    }
}

/// Read-only directed multigraph over a transaction set.
#[derive(Debug, Clone, Default)]
pub struct TransactionGraph {
    accounts: Vec<AccountId>,
    index: HashMap<AccountId, usize>,
    edges: Vec<GraphEdge>,
    forward: Vec<Vec<usize>>,
    reverse: Vec<Vec<usize>>,
}

impl TransactionGraph {
    /// Number of distinct accounts.
    pub fn node_count(&self) -> usize {
        self.accounts.len()
    }

    /// Number of edges (one per transaction).
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Account ids in first-seen order; position is the account index.
    pub fn accounts(&self) -> &[AccountId] {
        &self.accounts
    }

    /// Account id for an index.
    pub fn account(&self, index: usize) -> &str {
        &self.accounts[index]
    }

    /// Index for an account id.
    pub fn index_of(&self, account: &str) -> Option<usize> {
        self.index.get(account).copied()
    }

    /// All edges in transaction order.
    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    /// Receivers of `index`'s transfers, one entry per transaction.
    pub fn successors(&self, index: usize) -> &[usize] {
        &self.forward[index]
    }

    /// Senders of transfers into `index`, one entry per transaction.
    pub fn predecessors(&self, index: usize) -> &[usize] {
        &self.reverse[index]
    }

    /// Degree of an account under the given counting mode.
    pub fn degree(&self, index: usize, mode: DegreeMode) -> usize {
        match mode {
            DegreeMode::TransactionCount => self.forward[index].len() + self.reverse[index].len(),
            DegreeMode::DistinctNeighbors => {
                let out: HashSet<usize> = self.forward[index].iter().copied().collect();
                let inc: HashSet<usize> = self.reverse[index].iter().copied().collect();
                out.len() + inc.len()
            }
        }
    }

    /// Degrees of every account, indexed like [`accounts`](Self::accounts).
    pub fn degrees(&self, mode: DegreeMode) -> Vec<usize> {
        (0..self.node_count()).map(|i| self.degree(i, mode)).collect()
    }

    /// `(sender, receiver)` id pairs, one per edge.
    pub fn edge_pairs(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.edges
            .iter()
            .map(|e| (self.account(e.source), self.account(e.target)))
    }

    /// Per-account activity totals over the whole transaction set.
    pub fn node_stats(&self) -> Vec<NodeStats> {
        let mut stats = vec![NodeStats::default(); self.node_count()];
        for edge in &self.edges {
            stats[edge.source].out_count += 1;
            stats[edge.source].volume += edge.amount;
            stats[edge.target].in_count += 1;
            stats[edge.target].volume += edge.amount;
        }
        stats
    }

    fn intern(&mut self, account: &str) -> usize {
        if let Some(&idx) = self.index.get(account) {
            return idx;
        }
        let idx = self.accounts.len();
        self.accounts.push(account.to_string());
        self.index.insert(account.to_string(), idx);
        self.forward.push(Vec::new());
        self.reverse.push(Vec::new());
        idx
    }
}

/// Graph construction kernel.
#[derive(Debug, Clone)]
pub struct GraphBuilder {
    metadata: KernelMetadata,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphBuilder {
    /// Create a new graph builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            metadata: KernelMetadata::new("aml/graph-builder")
                .with_description("Directed transaction multigraph with dense account indices"),
        }
    }

    /// Build the multigraph for a transaction list. O(T).
    pub fn build(transactions: &[Transaction]) -> TransactionGraph {
        let mut graph = TransactionGraph {
            edges: Vec::with_capacity(transactions.len()),
            ..Default::default()
        };

        for tx in transactions {
            let source = graph.intern(&tx.sender);
            let target = graph.intern(&tx.receiver);

            graph.edges.push(GraphEdge {
                source,
                target,
                amount: tx.amount,
                timestamp: tx.timestamp,
                transaction_id: tx.id.clone(),
            });
            graph.forward[source].push(target);
            graph.reverse[target].push(source);
        }

        graph
    }
}

impl Kernel for GraphBuilder {
    fn metadata(&self) -> &KernelMetadata {
        &self.metadata
    }
}
