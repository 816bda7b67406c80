// SPDX-License-Identifier: PMPL-1.0-or-later
//! Gold-master corpus replay.
//!
//! Every `*.html`/`*.htm` fixture under the corpus root is paired with
//! `<stem>.expectations.json`:
//!
//! ```json
//! { "rules": ["orphaned-form-label"], "truncated": false,
//!   "findings": [{ "id": "orphaned-form-label", "scopePath": [], "locator": "/html[1]/body[1]/label[1]" }] }
//! ```
//!
//! `rules` is compared as a set. `truncated` and `findings` are compared
//! only when the expectations file records them.

use crate::config::EngineConfig;
use crate::engine::Engine;
use crate::error::{EngineError, Result};
use crate::report::Report;
use crate::scanner;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Suffix of the expectations file paired with a fixture
pub const EXPECTATIONS_SUFFIX: &str = ".expectations.json";

/// Recorded expectations for one fixture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expectations {
    /// Rule ids the report must contain, exactly
    pub rules: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub truncated: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub findings: Option<Vec<ExpectedFinding>>,
}

/// Finding-level expectation
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpectedFinding {
    pub id: String,
    #[serde(default)]
    pub scope_path: Vec<usize>,
    pub locator: String,
}

impl Expectations {
    /// Read and validate an expectations file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut expectations: Expectations =
            serde_json::from_str(&content).map_err(|e| EngineError::Expectations {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        if let Some(blank) = expectations.rules.iter().find(|id| id.trim().is_empty()) {
            return Err(EngineError::Expectations {
                path: path.to_path_buf(),
                reason: format!("blank rule id {:?}", blank),
            });
        }
        expectations.normalize();
        Ok(expectations)
    }

    /// Trim rule ids; the set collapses duplicates that differ only in padding
    fn normalize(&mut self) {
        self.rules = std::mem::take(&mut self.rules)
            .into_iter()
            .map(|id| id.trim().to_string())
            .collect();
        if let Some(ref mut findings) = self.findings {
            for finding in findings.iter_mut() {
                finding.id = finding.id.trim().to_string();
                finding.locator = finding.locator.trim().to_string();
            }
        }
    }

    /// Differences between these expectations and a produced report
    pub fn compare(&self, report: &Report) -> Vec<String> {
        let mut diffs = Vec::new();
        let actual = report.rule_ids();

        for id in self.rules.difference(&actual) {
            diffs.push(format!("missing rule {}", id));
        }
        for id in actual.difference(&self.rules) {
            diffs.push(format!("unexpected rule {}", id));
        }

        if let Some(truncated) = self.truncated {
            if truncated != report.truncated {
                diffs.push(format!("truncated: expected {}, got {}", truncated, report.truncated));
            }
        }

        if let Some(ref findings) = self.findings {
            let expected: BTreeSet<&ExpectedFinding> = findings.iter().collect();
            let produced: Vec<ExpectedFinding> = report
                .rules
                .iter()
                .map(|f| ExpectedFinding {
                    id: f.rule_id.clone(),
                    scope_path: f.scope_path.ordinals().to_vec(),
                    locator: f.locator.to_string(),
                })
                .collect();
            let produced: BTreeSet<&ExpectedFinding> = produced.iter().collect();

            for f in expected.difference(&produced) {
                diffs.push(format!("missing finding {}", f));
            }
            for f in produced.difference(&expected) {
                diffs.push(format!("unexpected finding {}", f));
            }
        }

        diffs
    }
}

impl fmt::Display for ExpectedFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.scope_path.iter().map(|o| o.to_string()).collect();
        write!(f, "{} [{}] {}", self.id, parts.join(","), self.locator)
    }
}

/// Outcome of replaying one fixture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseStatus {
    Match,
    Mismatch,
    /// No expectations file next to the fixture
    Missing,
    /// Expectations or fixture could not be read
    Invalid,
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaseStatus::Match => write!(f, "MATCH"),
            CaseStatus::Mismatch => write!(f, "MISMATCH"),
            CaseStatus::Missing => write!(f, "MISSING"),
            CaseStatus::Invalid => write!(f, "INVALID"),
        }
    }
}

/// One replayed fixture
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseResult {
    pub fixture: PathBuf,
    pub status: CaseStatus,
    /// Rule ids the engine produced
    pub rules: BTreeSet<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

/// Per-status counts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CorpusTotals {
    pub documents: usize,
    pub matched: usize,
    pub mismatched: usize,
    pub missing: usize,
    pub invalid: usize,
}

/// Result of replaying a whole corpus
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CorpusSummary {
    pub generated_at: DateTime<Utc>,
    pub root: PathBuf,
    pub totals: CorpusTotals,
    pub cases: Vec<CaseResult>,
}

impl CorpusSummary {
    /// Cases that did not match
    pub fn failures(&self) -> Vec<&CaseResult> {
        self.cases.iter().filter(|c| c.status != CaseStatus::Match).collect()
    }

    pub fn is_success(&self) -> bool {
        self.failures().is_empty()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Expectations path for a fixture
pub fn expectations_path(fixture: &Path) -> PathBuf {
    let stem = fixture
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    fixture.with_file_name(format!("{}{}", stem, EXPECTATIONS_SUFFIX))
}

/// Fixture documents under a corpus root, in path order
pub fn discover_fixtures(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && scanner::is_scannable(e.path()))
        .map(|e| e.into_path())
        .collect()
}

/// Replay one fixture
pub fn run_case(engine: &Engine, fixture: &Path, config: &EngineConfig) -> CaseResult {
    let mut case = CaseResult {
        fixture: fixture.to_path_buf(),
        status: CaseStatus::Invalid,
        rules: BTreeSet::new(),
        details: Vec::new(),
    };

    let report = match scanner::scan_file(engine, fixture, config) {
        Ok(report) => report,
        Err(e) => {
            case.details.push(e.to_string());
            return case;
        }
    };
    case.rules = report.rule_ids();

    let expectations_file = expectations_path(fixture);
    if !expectations_file.exists() {
        case.status = CaseStatus::Missing;
        case.details.push(format!("no {}", expectations_file.display()));
        return case;
    }

    match Expectations::load(&expectations_file) {
        Ok(expectations) => {
            case.details = expectations.compare(&report);
            case.status = if case.details.is_empty() {
                CaseStatus::Match
            } else {
                CaseStatus::Mismatch
            };
        }
        Err(e) => case.details.push(e.to_string()),
    }

    debug!(fixture = %fixture.display(), status = %case.status, "Replayed fixture");
    case
}

/// Replay every fixture under `root`
pub fn run_corpus(engine: &Engine, root: &Path, config: &EngineConfig) -> Result<CorpusSummary> {
    config.validate(engine.registry())?;
    if !root.is_dir() {
        return Err(EngineError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("corpus root {} is not a directory", root.display()),
        )));
    }

    info!("Replaying corpus: {}", root.display());

    let mut totals = CorpusTotals::default();
    let mut cases = Vec::new();
    for fixture in discover_fixtures(root) {
        let case = run_case(engine, &fixture, config);
        totals.documents += 1;
        match case.status {
            CaseStatus::Match => totals.matched += 1,
            CaseStatus::Mismatch => totals.mismatched += 1,
            CaseStatus::Missing => totals.missing += 1,
            CaseStatus::Invalid => totals.invalid += 1,
        }
        if case.status != CaseStatus::Match {
            warn!(fixture = %fixture.display(), status = %case.status, "Gold-master case failed");
        }
        cases.push(case);
    }

    info!(
        documents = totals.documents,
        matched = totals.matched,
        "Corpus replay complete"
    );

    Ok(CorpusSummary {
        generated_at: Utc::now(),
        root: root.to_path_buf(),
        totals,
        cases,
    })
}

/// Render a summary as text
pub fn format_summary(summary: &CorpusSummary) -> String {
    let mut output = String::new();

    output.push_str("=== Conformancebot Gold-Master Summary ===\n\n");
    output.push_str(&format!("Root: {}\n", summary.root.display()));
    output.push_str(&format!("Generated: {}\n\n", summary.generated_at.to_rfc3339()));

    let t = &summary.totals;
    output.push_str(&format!(
        "Documents: {}  Matched: {}  Mismatched: {}  Missing: {}  Invalid: {}\n\n",
        t.documents, t.matched, t.mismatched, t.missing, t.invalid
    ));

    for case in summary.failures() {
        output.push_str(&format!("[{}] {}\n", case.status, case.fixture.display()));
        for detail in &case.details {
            output.push_str(&format!("  - {}\n", detail));
        }
    }

    if summary.is_success() {
        output.push_str("RESULT: PASS\n");
    } else {
        output.push_str("RESULT: FAIL\n");
    }

    output
}
