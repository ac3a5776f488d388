//! Integration tests for ringwatch
//!
//! These tests run whole workflows: CSV in, analysis, JSON out.

use ringwatch::prelude::*;
use std::collections::HashSet;

fn member_set(ring: &FraudRing) -> HashSet<&str> {
    ring.members.iter().map(String::as_str).collect()
}

// ============================================================================
// Catalog Tests
// ============================================================================

#[test]
fn test_catalog_kernels() {
    let kernels = ringwatch::catalog::kernels();
    assert_eq!(kernels.len(), 6);

    for kernel in &kernels {
        assert!(!kernel.description.is_empty(), "{} has no description", kernel.id);
    }
}

// ============================================================================
// Ingest -> Analyze -> Export
// ============================================================================

const LEDGER: &str = "transaction_id,sender_id,receiver_id,amount,timestamp
T1,A,B,5000.00,2026-01-15 10:00:00
T2,B,C,4900.00,2026-01-15 11:00:00
T3,C,A,4800.00,2026-01-15 12:00:00
T4,X,Y,120.00,2026-01-16 09:30:00
T5,X,Y,oops,2026-01-16 09:45:00
";

#[test]
fn test_csv_to_report() {
    let ingest = ringwatch::ingest::read_transactions(LEDGER.as_bytes(), IngestMode::Lenient)
        .unwrap();
    assert_eq!(ingest.transactions.len(), 4);
    assert_eq!(ingest.skipped.len(), 1);
    assert_eq!(ingest.skipped[0].line, 6);

    let result = analyze(&ingest.transactions, &AnalysisConfig::default()).unwrap();
    assert_eq!(result.summary.total_accounts, 5);
    assert_eq!(result.rings.len(), 1);
    assert_eq!(result.rings[0].id, "RING_001");
    assert_eq!(result.rings[0].risk_score, 95.0);
    assert_eq!(member_set(&result.rings[0]), HashSet::from(["A", "B", "C"]));
    assert!(result.account("X").is_none());

    let report = AnalysisReport::from(&result);
    assert_eq!(report.summary.fraud_rings_detected, 1);
    assert_eq!(report.summary.suspicious_accounts_flagged, 3);
    assert!(report
        .suspicious_accounts
        .iter()
        .all(|a| a.suspicion_score == 85.0 && a.ring_id == "RING_001"));
}

#[test]
fn test_strict_ingest_rejects_ledger() {
    let err = ringwatch::ingest::read_transactions(LEDGER.as_bytes(), IngestMode::Strict)
        .unwrap_err();
    assert!(err.is_input_error());
}

#[test]
fn test_duplicate_ids_fail_analysis() {
    let csv = "transaction_id,sender_id,receiver_id,amount,timestamp
T1,A,B,10,2026-01-15
T1,B,C,10,2026-01-15
";
    let ingest = ringwatch::ingest::read_transactions(csv.as_bytes(), IngestMode::Strict).unwrap();
    let err = analyze(&ingest.transactions, &AnalysisConfig::default()).unwrap_err();
    assert!(matches!(err, RingwatchError::InvalidInput(_)));
}

#[test]
fn test_json_file_export() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.json");

    let ingest = ringwatch::ingest::read_transactions(LEDGER.as_bytes(), IngestMode::Lenient)
        .unwrap();
    let result = analyze(&ingest.transactions, &AnalysisConfig::default()).unwrap();
    AnalysisReport::from(&result).write_json(&path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["fraud_rings"][0]["pattern_type"], "cycle");
    assert_eq!(value["summary"]["total_accounts_analyzed"], 5);
}

// ============================================================================
// Demo Ledger
// ============================================================================

#[test]
fn test_demo_ledger_detection() {
    let ledger = ringwatch::demo::DemoGenerator::new(2026).generate();
    let result = analyze(&ledger, &AnalysisConfig::default()).unwrap();

    let planted_cycle = HashSet::from(["ACC_00001", "ACC_00002", "ACC_00003"]);
    assert!(result
        .rings_of(PatternType::Cycle)
        .any(|r| member_set(r) == planted_cycle));

    let fan_in = result
        .rings_of(PatternType::FanIn)
        .find(|r| r.members[0] == "ACC_00021")
        .expect("planted fan-in not detected");
    assert!(fan_in.members.len() >= 12);

    assert!(result
        .rings_of(PatternType::FanOut)
        .any(|r| r.members[0] == "ACC_00021"));

    let aggregator = result.account("ACC_00021").unwrap();
    assert!(aggregator
        .detected_patterns
        .contains(&PatternTag::SmurfingAggregation));
    assert!(aggregator
        .detected_patterns
        .contains(&PatternTag::SmurfingDistribution));
}

#[test]
fn test_quiet_demo_finds_shell_chain() {
    let ledger = ringwatch::demo::DemoGenerator::new(1)
        .with_mesh_transactions(0)
        .generate();
    let result = analyze(&ledger, &AnalysisConfig::default()).unwrap();

    let shells: Vec<&FraudRing> = result.rings_of(PatternType::LayeringShell).collect();
    assert_eq!(shells.len(), 2);
    assert_eq!(
        shells[0].members,
        vec!["ACC_00043", "ACC_00040", "ACC_00041", "ACC_00042"]
    );
    assert_eq!(
        shells[1].members,
        vec!["ACC_00040", "ACC_00041", "ACC_00042", "ACC_00044"]
    );

    // cycle, fan-in, fan-out, two shell chains
    assert_eq!(result.rings.len(), 5);
    assert_eq!(result.summary.total_accounts, 3 + 1 + 11 + 11 + 5);
}

#[test]
fn test_demo_csv_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("demo.csv");

    let written = ringwatch::demo::DemoGenerator::new(5).write_csv(&path).unwrap();
    let ingest = ringwatch::ingest::read_file(&path, IngestMode::Strict).unwrap();

    assert_eq!(ingest.transactions, written);
}

#[test]
fn test_demo_analysis_is_deterministic() {
    let ledger = ringwatch::demo::DemoGenerator::default().generate();
    let config = AnalysisConfig::default();

    let first = analyze(&ledger, &config).unwrap();
    let second = analyze(&ledger, &config).unwrap();
    let parallel = analyze(
        &ledger,
        &AnalysisConfig {
            parallel_detectors: true,
            ..Default::default()
        },
    )
    .unwrap();

    assert_eq!(first.accounts, second.accounts);
    assert_eq!(first.rings, second.rings);
    assert_eq!(first.rings, parallel.rings);
    assert_eq!(first.accounts, parallel.accounts);
}

// ============================================================================
// Configuration Files
// ============================================================================

#[test]
fn test_config_file_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ringwatch.toml");

    let config = RingwatchConfig::default().with_analysis(AnalysisConfig {
        fan_threshold: 5,
        degree_mode: DegreeMode::DistinctNeighbors,
        ..Default::default()
    });
    config.to_file(&path).unwrap();

    let loaded = RingwatchConfig::from_file(&path).unwrap();
    assert_eq!(loaded, config);
    assert!(loaded.validate().is_ok());
}

#[test]
fn test_config_thresholds_change_results() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ringwatch.toml");
    std::fs::write(&path, "[analysis]\nfan_threshold = 3\n").unwrap();
    let config = RingwatchConfig::from_file(&path).unwrap();

    let csv = "transaction_id,sender_id,receiver_id,amount,timestamp
T1,S1,HUB,900,2026-01-15 10:00:00
T2,S2,HUB,900,2026-01-15 11:00:00
T3,S3,HUB,900,2026-01-15 12:00:00
";
    let ingest = ringwatch::ingest::read_transactions(csv.as_bytes(), IngestMode::Strict).unwrap();

    let strict = analyze(&ingest.transactions, &AnalysisConfig::default()).unwrap();
    assert!(strict.rings.is_empty());

    let relaxed = analyze(&ingest.transactions, &config.analysis).unwrap();
    assert_eq!(relaxed.rings.len(), 1);
    assert_eq!(relaxed.rings[0].pattern_type, PatternType::FanIn);
    assert_eq!(relaxed.rings[0].members, vec!["HUB", "S1", "S2", "S3"]);
}

#[test]
fn test_missing_config_file() {
    let err = RingwatchConfig::from_file("/nonexistent/ringwatch.toml").unwrap_err();
    assert!(matches!(err, RingwatchError::ConfigError(_)));
}
