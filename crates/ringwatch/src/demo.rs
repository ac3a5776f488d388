//! Synthetic demo ledger.
//!
//! Fifty accounts exchanging random transfers during January 2026, with three
//! planted rings:
//!
//! - a 3-account cycle `ACC_00001 -> ACC_00002 -> ACC_00003 -> ACC_00001`
//! - eleven smurfs paying `ACC_00021`, which then pays eleven other accounts
//! - a layering chain `ACC_00043 -> ACC_00040 -> ACC_00041 -> ACC_00042 -> ACC_00044`
//!
//! The random background can touch the planted accounts, so only the cycle
//! and the two fans are guaranteed to survive detection.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ringwatch_aml::types::Transaction;
use ringwatch_core::error::Result;
use std::path::Path;

/// Number of accounts in the demo ledger.
pub const DEMO_ACCOUNTS: usize = 50;

/// Default number of random background transfers.
pub const DEFAULT_MESH_TRANSACTIONS: usize = 80;

/// 2026-01-01 00:00:00 UTC.
const JAN_2026: i64 = 1_767_225_600;

/// Seeded demo ledger generator.
#[derive(Debug, Clone)]
pub struct DemoGenerator {
    seed: u64,
    mesh_transactions: usize,
}

impl Default for DemoGenerator {
    fn default() -> Self {
        Self::new(42)
    }
}

impl DemoGenerator {
    /// Create a generator with the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            mesh_transactions: DEFAULT_MESH_TRANSACTIONS,
        }
    }

    /// Set the number of random background transfers.
    #[must_use]
    pub fn with_mesh_transactions(mut self, count: usize) -> Self {
        self.mesh_transactions = count;
        self
    }

    /// Generate the ledger. The same seed always yields the same ledger.
    pub fn generate(&self) -> Vec<Transaction> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut ledger = Ledger::default();

        for _ in 0..self.mesh_transactions {
            let sender = rng.gen_range(1..=DEMO_ACCOUNTS);
            let mut receiver = rng.gen_range(1..=DEMO_ACCOUNTS);
            while receiver == sender {
                receiver = rng.gen_range(1..=DEMO_ACCOUNTS);
            }
            let amount = (rng.gen_range(100.0..10_100.0_f64) * 100.0).round() / 100.0;
            let day = rng.gen_range(1..=28);
            let hour = rng.gen_range(0..24);
            let minute = rng.gen_range(0..60);
            ledger.push(sender, receiver, amount, at(day, hour, minute));
        }

        // Circular flow, one hop per hour.
        let ring = [1, 2, 3];
        for (i, &sender) in ring.iter().enumerate() {
            ledger.push(sender, ring[(i + 1) % ring.len()], 5000.0, at(15, 10 + i as i64, 0));
        }

        // Fan-in to the aggregator, then fan-out from it.
        let aggregator = 21;
        for (idx, smurf) in (10..=20).enumerate() {
            let (hour, minute) = fan_slot(9, idx);
            ledger.push(smurf, aggregator, 800.0, at(20, hour, minute));
        }
        for (idx, mule) in (22..=32).enumerate() {
            let (hour, minute) = fan_slot(14, idx);
            ledger.push(aggregator, mule, 750.0, at(20, hour, minute));
        }

        // Layering through three quiet intermediaries.
        let chain = [43, 40, 41, 42, 44];
        for (hop, pair) in chain.windows(2).enumerate() {
            let amount = 10_000.0 - 100.0 * hop as f64;
            ledger.push(pair[0], pair[1], amount, at(25, 9 + hop as i64, 0));
        }

        tracing::debug!(
            seed = self.seed,
            transactions = ledger.transactions.len(),
            "demo ledger generated"
        );

        ledger.transactions
    }

    /// Generate the ledger and write it as CSV.
    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<Vec<Transaction>> {
        let transactions = self.generate();
        let file = std::fs::File::create(path.as_ref())?;
        crate::ingest::write_transactions(file, &transactions)?;
        Ok(transactions)
    }
}

/// Demo account id, `ACC_00001` style.
pub fn account_id(n: usize) -> String {
    format!("ACC_{:05}", n)
}

#[derive(Default)]
struct Ledger {
    transactions: Vec<Transaction>,
}

impl Ledger {
    fn push(&mut self, sender: usize, receiver: usize, amount: f64, timestamp: DateTime<Utc>) {
        let id = format!("TXN_{:06}", self.transactions.len() + 1);
        self.transactions.push(Transaction::new(
            id,
            account_id(sender),
            account_id(receiver),
            amount,
            timestamp,
        ));
    }
}

/// Two transfers per hour starting at `first_hour`, five minutes apart.
fn fan_slot(first_hour: i64, idx: usize) -> (i64, i64) {
    (first_hour + (idx / 2) as i64, ((idx * 5) % 60) as i64)
}

fn at(day: i64, hour: i64, minute: i64) -> DateTime<Utc> {
    let secs = JAN_2026 + (day - 1) * 86_400 + hour * 3_600 + minute * 60;
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}
