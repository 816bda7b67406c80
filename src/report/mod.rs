// SPDX-License-Identifier: PMPL-1.0-or-later
//! Report aggregation and rendering.
//!
//! The [`Aggregator`] merges per-scope, per-rule findings, drops exact
//! duplicates of `(rule id, scope path, locator)` and orders the rest by that
//! same key, so identical inputs always give byte-identical reports.
//!
//! Supports multiple output formats:
//! - Text: human-readable findings grouped by severity
//! - JSON: the `{ rules, truncated }` shape used by gold-master expectations
//! - SARIF: Static Analysis Results Interchange Format for IDE/CI integration

use crate::error::Result;
use crate::finding::{Finding, FindingKey, Severity};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Output format for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// Structured JSON
    Json,
    /// SARIF for IDE/CI integration
    Sarif,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Sarif => write!(f, "sarif"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "sarif" => Ok(OutputFormat::Sarif),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}

/// Result of one evaluation pass
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Report {
    /// Unique findings ordered by rule id, scope path, locator
    pub rules: Vec<Finding>,
    /// Frame descent stopped at the depth bound somewhere
    pub truncated: bool,
}

impl Report {
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Distinct rule ids present in the report
    pub fn rule_ids(&self) -> BTreeSet<String> {
        self.rules.iter().map(|f| f.rule_id.clone()).collect()
    }

    pub fn by_severity(&self, severity: Severity) -> Vec<&Finding> {
        self.rules.iter().filter(|f| f.severity == severity).collect()
    }

    pub fn by_rule(&self, rule_id: &str) -> Vec<&Finding> {
        self.rules.iter().filter(|f| f.rule_id == rule_id).collect()
    }

    pub fn has_failures(&self) -> bool {
        self.rules.iter().any(|f| f.severity == Severity::Fail)
    }

    /// Serialize to the gold-master JSON shape
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Collects findings and produces a [`Report`]
#[derive(Debug, Default)]
pub struct Aggregator {
    findings: BTreeMap<FindingKey, Finding>,
    truncated: bool,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a finding. The first finding seen for a key is kept.
    pub fn add(&mut self, finding: Finding) {
        self.findings.entry(finding.key()).or_insert(finding);
    }

    pub fn extend<I: IntoIterator<Item = Finding>>(&mut self, findings: I) {
        for finding in findings {
            self.add(finding);
        }
    }

    pub fn mark_truncated(&mut self) {
        self.truncated = true;
    }

    pub fn finish(self) -> Report {
        Report {
            rules: self.findings.into_values().collect(),
            truncated: self.truncated,
        }
    }
}

/// Generate a report rendering
pub fn generate_report(report: &Report, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => generate_text_report(report),
        OutputFormat::Json => generate_json_report(report),
        OutputFormat::Sarif => generate_sarif_report(report),
    }
}

/// Generate human-readable text report
fn generate_text_report(report: &Report) -> String {
    let mut output = String::new();

    output.push_str("=== Conformancebot Rule Evaluation Report ===\n\n");

    if report.is_empty() {
        output.push_str("No rule violations found. All checks passed.\n");
    } else {
        let failures = report.by_severity(Severity::Fail).len();
        let warnings = report.by_severity(Severity::Warn).len();
        output.push_str(&format!(
            "Found {} issue(s): {} failure(s), {} warning(s)\n\n",
            report.len(),
            failures,
            warnings
        ));

        for severity in &[Severity::Fail, Severity::Warn] {
            let sev_findings = report.by_severity(*severity);
            if sev_findings.is_empty() {
                continue;
            }

            output.push_str(&format!("--- {} ({}) ---\n", severity, sev_findings.len()));

            for finding in sev_findings {
                output.push_str(&format!("[{}] {}\n", finding.rule_id, finding.message));
                output.push_str(&format!("  Scope: {}\n", finding.scope_path));
                output.push_str(&format!("  Location: {}\n", finding.locator));
                output.push('\n');
            }
        }
    }

    if report.truncated {
        output.push_str("NOTE: frame nesting exceeded the depth bound; deeper frames were not evaluated\n");
    }

    if report.has_failures() {
        output.push_str("RESULT: FAIL\n");
    } else if !report.is_empty() {
        output.push_str("RESULT: PASS WITH WARNINGS\n");
    } else {
        output.push_str("RESULT: PASS\n");
    }

    output
}

/// Generate JSON report
fn generate_json_report(report: &Report) -> String {
    report
        .to_json()
        .unwrap_or_else(|e| format!("{{\"error\": \"Failed to serialize report: {}\"}}", e))
}

/// SARIF report structure (simplified)
#[derive(Debug, Serialize)]
struct SarifReport {
    #[serde(rename = "$schema")]
    schema: String,
    version: String,
    runs: Vec<SarifRun>,
}

#[derive(Debug, Serialize)]
struct SarifRun {
    tool: SarifTool,
    results: Vec<SarifResult>,
    properties: SarifRunProperties,
}

#[derive(Debug, Serialize)]
struct SarifRunProperties {
    truncated: bool,
}

#[derive(Debug, Serialize)]
struct SarifTool {
    driver: SarifDriver,
}

#[derive(Debug, Serialize)]
struct SarifDriver {
    name: String,
    version: String,
    #[serde(rename = "informationUri")]
    information_uri: String,
}

#[derive(Debug, Serialize)]
struct SarifResult {
    #[serde(rename = "ruleId")]
    rule_id: String,
    level: String,
    message: SarifMessage,
    locations: Vec<SarifLocation>,
}

#[derive(Debug, Serialize)]
struct SarifMessage {
    text: String,
}

#[derive(Debug, Serialize)]
struct SarifLocation {
    #[serde(rename = "logicalLocations")]
    logical_locations: Vec<SarifLogicalLocation>,
}

#[derive(Debug, Serialize)]
struct SarifLogicalLocation {
    #[serde(rename = "fullyQualifiedName")]
    fully_qualified_name: String,
    kind: String,
}

/// Generate SARIF report
fn generate_sarif_report(report: &Report) -> String {
    let results: Vec<SarifResult> = report
        .rules
        .iter()
        .map(|f| {
            let level = match f.severity {
                Severity::Fail => "error",
                Severity::Warn => "warning",
            };

            SarifResult {
                rule_id: f.rule_id.clone(),
                level: level.to_string(),
                message: SarifMessage { text: f.message.clone() },
                locations: vec![SarifLocation {
                    logical_locations: vec![SarifLogicalLocation {
                        fully_qualified_name: format!("{}{}", f.scope_path, f.locator),
                        kind: "element".to_string(),
                    }],
                }],
            }
        })
        .collect();

    let sarif = SarifReport {
        schema: "https://json.schemastore.org/sarif-2.1.0.json".to_string(),
        version: "2.1.0".to_string(),
        runs: vec![SarifRun {
            tool: SarifTool {
                driver: SarifDriver {
                    name: "conformancebot".to_string(),
                    version: env!("CARGO_PKG_VERSION").to_string(),
                    information_uri: "https://github.com/hyperpolymath/gitbot-fleet".to_string(),
                },
            },
            results,
            properties: SarifRunProperties { truncated: report.truncated },
        }],
    };

    serde_json::to_string_pretty(&sarif)
        .unwrap_or_else(|e| format!("{{\"error\": \"Failed to serialize SARIF report: {}\"}}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finding::{Locator, ScopePath};

    fn finding(rule: &str, path: &[usize], steps: &[(&str, usize)]) -> Finding {
        let mut locator = Locator::root();
        for (tag, index) in steps {
            locator.push(tag, *index);
        }
        Finding::new(rule, Severity::Fail, "message")
            .with_locator(locator)
            .with_scope_path(ScopePath(path.to_vec()))
    }

    #[test]
    fn test_aggregator_orders_and_dedups() {
        let mut agg = Aggregator::new();
        agg.add(finding("missing-label", &[0], &[("input", 1)]));
        agg.add(finding("focus-visible", &[], &[("style", 1)]));
        agg.add(finding("missing-label", &[], &[("input", 2)]));
        agg.add(finding("missing-label", &[], &[("input", 10)]));
        agg.add(finding("missing-label", &[0], &[("input", 1)]));
        let report = agg.finish();
        let keys: Vec<String> = report.rules.iter().map(|f| format!("{} {}", f.rule_id, f.location_string())).collect();
        assert_eq!(
            keys,
            vec![
                "focus-visible [] /style[1]",
                "missing-label [] /input[2]",
                "missing-label [] /input[10]",
                "missing-label [0] /input[1]",
            ]
        );
    }

    #[test]
    fn test_text_report_empty() {
        let report = Report::default();
        let text = generate_report(&report, OutputFormat::Text);
        assert!(text.contains("No rule violations found"));
        assert!(text.contains("RESULT: PASS"));
    }

    #[test]
    fn test_text_report_with_findings() {
        let mut agg = Aggregator::new();
        agg.add(finding("missing-label", &[], &[("input", 1)]));
        agg.mark_truncated();
        let text = generate_report(&agg.finish(), OutputFormat::Text);
        assert!(text.contains("[missing-label] message"));
        assert!(text.contains("depth bound"));
        assert!(text.contains("RESULT: FAIL"));
    }

    #[test]
    fn test_json_report_shape() {
        let mut agg = Aggregator::new();
        agg.add(finding("duplicate-id", &[1, 0], &[("html", 1), ("body", 1), ("p", 1)]));
        let json = generate_report(&agg.finish(), OutputFormat::Json);
        let parsed: serde_json::Value = serde_json::from_str(&json).expect("valid JSON");
        assert_eq!(parsed["truncated"], false);
        assert_eq!(parsed["rules"][0]["id"], "duplicate-id");
        assert_eq!(parsed["rules"][0]["scopePath"], serde_json::json!([1, 0]));
        assert_eq!(parsed["rules"][0]["locator"], "/html[1]/body[1]/p[1]");
    }

    #[test]
    fn test_sarif_report() {
        let mut agg = Aggregator::new();
        agg.add(finding("missing-label", &[], &[("input", 1)]));
        let sarif = generate_report(&agg.finish(), OutputFormat::Sarif);
        let parsed: serde_json::Value = serde_json::from_str(&sarif).expect("valid JSON");
        assert_eq!(parsed["version"], "2.1.0");
        assert_eq!(parsed["runs"][0]["results"][0]["level"], "error");
        assert_eq!(
            parsed["runs"][0]["results"][0]["locations"][0]["logicalLocations"][0]["fullyQualifiedName"],
            "[]/input[1]"
        );
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("sarif".parse::<OutputFormat>().unwrap(), OutputFormat::Sarif);
        assert!("xml".parse::<OutputFormat>().is_err());
    }
}
