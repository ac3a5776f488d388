//! CSV ledger ingestion.
//!
//! Expected header: `transaction_id,sender_id,receiver_id,amount,timestamp`.
//! Columns are located by header name, so extra columns and reordering are
//! tolerated.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use ringwatch_aml::types::Transaction;
use ringwatch_core::error::{Result, RingwatchError};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::Path;

/// Column names, in template order.
pub const COLUMNS: [&str; 5] = [
    "transaction_id",
    "sender_id",
    "receiver_id",
    "amount",
    "timestamp",
];

/// Sample ledger offered to users as a starting point.
pub const TEMPLATE: &str = "transaction_id,sender_id,receiver_id,amount,timestamp
TXN_000001,ACC_00123,ACC_00456,1500.00,2026-01-15 14:30:00
TXN_000002,ACC_00456,ACC_00789,1450.00,2026-01-15 15:45:00
";

/// Timestamp format used when writing ledgers.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// How malformed rows are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngestMode {
    /// Skip malformed rows and report them.
    #[default]
    Lenient,
    /// Fail on the first malformed row.
    Strict,
}

/// A row that was left out of the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRow {
    /// 1-based line number in the source.
    pub line: usize,
    /// Why the row was rejected.
    pub reason: String,
}

/// Outcome of reading a ledger.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestReport {
    /// Parsed transactions in file order.
    pub transactions: Vec<Transaction>,
    /// Rows skipped in lenient mode.
    pub skipped: Vec<SkippedRow>,
}

impl IngestReport {
    /// Returns true if every data row was accepted.
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Parse a timestamp.
///
/// Accepts `YYYY-MM-DD HH:MM:SS`, the ISO `T` form (optionally with
/// fractional seconds), RFC 3339 with an offset, and a bare `YYYY-MM-DD`.
/// Values without an offset are taken as UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }

    for format in [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Read a ledger from CSV.
pub fn read_transactions<R: Read>(reader: R, mode: IngestMode) -> Result<IngestReport> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers().map_err(csv_error)?.clone();
    let columns = ColumnMap::locate(&headers)?;

    let mut report = IngestReport::default();
    for (idx, record) in reader.records().enumerate() {
        // Header is line 1.
        let fallback = idx + 2;
        let (line, parsed) = match record {
            Ok(record) => (
                record.position().map_or(fallback, |p| p.line() as usize),
                columns.parse(&record),
            ),
            Err(e) => (
                e.position().map_or(fallback, |p| p.line() as usize),
                Err(e.to_string()),
            ),
        };

        match parsed {
            Ok(tx) => report.transactions.push(tx),
            Err(reason) => {
                if mode == IngestMode::Strict {
                    return Err(RingwatchError::parse(line, reason));
                }
                tracing::warn!(line, reason = %reason, "skipping malformed row");
                report.skipped.push(SkippedRow { line, reason });
            }
        }
    }

    if report.transactions.is_empty() {
        return Err(RingwatchError::invalid_input(
            "no valid transactions found in CSV",
        ));
    }

    tracing::debug!(
        transactions = report.transactions.len(),
        skipped = report.skipped.len(),
        "ledger ingested"
    );

    Ok(report)
}

/// Read a ledger from a CSV file.
pub fn read_file(path: impl AsRef<Path>, mode: IngestMode) -> Result<IngestReport> {
    let file = std::fs::File::open(path.as_ref())?;
    read_transactions(file, mode)
}

/// Write a ledger as CSV with the standard header.
pub fn write_transactions<W: Write>(writer: W, transactions: &[Transaction]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(COLUMNS).map_err(csv_error)?;

    for tx in transactions {
        let amount = format!("{:.2}", tx.amount);
        let timestamp = tx.timestamp.format(TIMESTAMP_FORMAT).to_string();
        writer
            .write_record([
                tx.id.as_str(),
                tx.sender.as_str(),
                tx.receiver.as_str(),
                amount.as_str(),
                timestamp.as_str(),
            ])
            .map_err(csv_error)?;
    }

    writer.flush()?;
    Ok(())
}

/// Header positions of the required columns.
struct ColumnMap {
    id: usize,
    sender: usize,
    receiver: usize,
    amount: usize,
    timestamp: usize,
}

impl ColumnMap {
    fn locate(headers: &csv::StringRecord) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(name))
                .ok_or_else(|| RingwatchError::parse(1, format!("missing column: {}", name)))
        };

        Ok(Self {
            id: find(COLUMNS[0])?,
            sender: find(COLUMNS[1])?,
            receiver: find(COLUMNS[2])?,
            amount: find(COLUMNS[3])?,
            timestamp: find(COLUMNS[4])?,
        })
    }

    fn parse(&self, record: &csv::StringRecord) -> std::result::Result<Transaction, String> {
        let id = field(record, self.id, COLUMNS[0])?;
        let sender = field(record, self.sender, COLUMNS[1])?;
        let receiver = field(record, self.receiver, COLUMNS[2])?;

        let raw_amount = field(record, self.amount, COLUMNS[3])?;
        let amount: f64 = raw_amount
            .parse()
            .map_err(|_| format!("invalid amount: {}", raw_amount))?;
        if !amount.is_finite() || amount < 0.0 {
            return Err(format!("invalid amount: {}", raw_amount));
        }

        let raw_timestamp = field(record, self.timestamp, COLUMNS[4])?;
        let timestamp = parse_timestamp(raw_timestamp)
            .ok_or_else(|| format!("invalid timestamp: {}", raw_timestamp))?;

        Ok(Transaction::new(id, sender, receiver, amount, timestamp))
    }
}

fn field<'r>(
    record: &'r csv::StringRecord,
    index: usize,
    name: &str,
) -> std::result::Result<&'r str, String> {
    match record.get(index) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(format!("missing {}", name)),
    }
}

fn csv_error(err: csv::Error) -> RingwatchError {
    let line = err.position().map_or(0, |p| p.line() as usize);
    if err.is_io_error() {
        if let csv::ErrorKind::Io(io) = err.into_kind() {
            return RingwatchError::IoError(io);
        }
        return RingwatchError::parse(line, "I/O failure");
    }
    RingwatchError::parse(line, err.to_string())
}
