// SPDX-License-Identifier: PMPL-1.0-or-later
//! Integration tests for conformancebot

use conformancebot::config::load_config;
use conformancebot::report::{generate_report, OutputFormat};
use conformancebot::{scanner, Engine, EngineConfig, Severity};
use std::path::Path;
use tempfile::TempDir;

#[test]
fn test_scan_clean_fixture() {
    let report = scanner::scan_file(
        &Engine::new(),
        Path::new("tests/fixtures/goldmaster/gm-001-clean.html"),
        &EngineConfig::default(),
    )
    .expect("scan should succeed");

    assert!(report.is_empty(), "Clean fixture should have no findings, got {:?}", report.rule_ids());
    assert!(!report.has_failures());
}

#[test]
fn test_scan_mixed_fixture() {
    let report = scanner::scan_file(
        &Engine::new(),
        Path::new("tests/fixtures/goldmaster/gm-021-mixed.html"),
        &EngineConfig::default(),
    )
    .expect("scan should succeed");

    assert_eq!(report.len(), 3);
    assert!(report.has_failures());
}

#[test]
fn test_unparseable_frame_is_a_warning() {
    let report = scanner::scan_file(
        &Engine::new(),
        Path::new("tests/fixtures/goldmaster/gm-020-unparseable-frame.html"),
        &EngineConfig::default(),
    )
    .expect("scan should succeed");

    assert_eq!(report.by_severity(Severity::Warn).len(), 1);
    assert!(!report.has_failures());
    let text = generate_report(&report, OutputFormat::Text);
    assert!(text.contains("RESULT: PASS WITH WARNINGS"));
}

#[test]
fn test_truncated_chain_reports_flag() {
    let report = scanner::scan_file(
        &Engine::new(),
        Path::new("tests/fixtures/goldmaster/gm-023-frame-chain-truncated.html"),
        &EngineConfig::default(),
    )
    .expect("scan should succeed");
    assert!(report.truncated);

    let sarif = generate_report(&report, OutputFormat::Sarif);
    let parsed: serde_json::Value = serde_json::from_str(&sarif).expect("valid SARIF JSON");
    assert_eq!(parsed["runs"][0]["properties"]["truncated"], true);
}

#[test]
fn test_scan_directory_of_fixtures() {
    let reports = scanner::scan_directory(
        &Engine::new(),
        Path::new("tests/fixtures/goldmaster"),
        &EngineConfig::default(),
    )
    .expect("directory scan should succeed");

    assert!(reports.len() >= 42);
    let mut paths: Vec<_> = reports.iter().map(|r| r.path.clone()).collect();
    let listed = paths.clone();
    paths.sort();
    assert_eq!(paths, listed);
}

#[test]
fn test_config_file_restricts_rules() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("conformance.yaml");
    std::fs::write(&path, "enabledRules:\n  - missing-alt-text\nmaxDepth: 2\n").unwrap();
    let config = load_config(&path).unwrap();

    let report = scanner::scan_file(
        &Engine::new(),
        Path::new("tests/fixtures/goldmaster/gm-021-mixed.html"),
        &config,
    )
    .unwrap();
    assert_eq!(report.rule_ids().into_iter().collect::<Vec<_>>(), vec!["missing-alt-text"]);
}

#[test]
fn test_report_formats() {
    let report = scanner::scan_file(
        &Engine::new(),
        Path::new("tests/fixtures/goldmaster/gm-018-duplicate-id.html"),
        &EngineConfig::default(),
    )
    .unwrap();

    let text = generate_report(&report, OutputFormat::Text);
    assert!(text.contains("[duplicate-id]"));
    assert!(text.contains("RESULT: FAIL"));

    let json: serde_json::Value = serde_json::from_str(&generate_report(&report, OutputFormat::Json)).unwrap();
    assert_eq!(json["rules"][0]["locator"], "/html[1]/body[1]/main[1]/p[2]");
    assert_eq!(json["rules"][0]["severity"], "fail");
}
