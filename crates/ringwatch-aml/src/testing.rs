//! Ledger builders shared by the unit tests.

use crate::types::Transaction;
use chrono::{TimeZone, Utc};

pub const HOUR_MS: i64 = 3_600_000;

/// Single transfer at `ms` milliseconds after the epoch.
pub fn tx(id: &str, from: &str, to: &str, amount: f64, ms: i64) -> Transaction {
    Transaction::new(id, from, to, amount, Utc.timestamp_millis_opt(ms).unwrap())
}

/// Consecutive 100.00 transfers along `accounts`, one minute apart, ids `T1..Tn`.
pub fn chain_txs(accounts: &[&str]) -> Vec<Transaction> {
    accounts
        .windows(2)
        .enumerate()
        .map(|(i, pair)| {
            tx(
                &format!("T{}", i + 1),
                pair[0],
                pair[1],
                100.0,
                i as i64 * 60_000,
            )
        })
        .collect()
}
