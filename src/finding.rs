// SPDX-License-Identifier: PMPL-1.0-or-later
//! Finding types shared by the resolver, the rules and the report.
//!
//! A finding is identified by the triple `(rule id, scope path, locator)`;
//! the report aggregator uses exactly that triple for deduplication and
//! ordering, so every field of [`FindingKey`] must be totally ordered.

use serde::{Serialize, Serializer};
use std::fmt;

/// Rule id for frames whose content could not be parsed.
pub const UNPARSEABLE_FRAME: &str = "unparseable-frame";

/// Rule id for rules that failed while evaluating a scope.
pub const RULE_EVALUATION_ERROR: &str = "rule-evaluation-error";

/// Severity levels for findings
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Conformance failure
    Fail,
    /// Needs review, or the engine could not fully evaluate something
    Warn,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Fail => write!(f, "FAIL"),
            Severity::Warn => write!(f, "WARN"),
        }
    }
}

/// One step of a locator: an element tag and its 1-based position among
/// same-tag siblings.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LocatorStep {
    pub tag: String,
    pub index: usize,
}

/// Stable path from a scope root to a node, e.g. `/html[1]/body[1]/input[2]`.
///
/// `detail` narrows the location below element granularity (a stylesheet
/// selector, or the id of a failed rule) and renders after a `|`.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Locator {
    pub steps: Vec<LocatorStep>,
    pub detail: Option<String>,
}

impl Locator {
    /// Locator with no steps (the scope itself)
    pub fn root() -> Self {
        Self::default()
    }

    /// Append a step
    pub fn push(&mut self, tag: &str, index: usize) {
        self.steps.push(LocatorStep { tag: tag.to_string(), index });
    }

    /// Attach a sub-element detail
    pub fn with_detail(mut self, detail: &str) -> Self {
        self.detail = Some(detail.to_string());
        self
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.steps.is_empty() {
            write!(f, "/")?;
        }
        for step in &self.steps {
            write!(f, "/{}[{}]", step.tag, step.index)?;
        }
        if let Some(ref detail) = self.detail {
            write!(f, "|{}", detail)?;
        }
        Ok(())
    }
}

impl Serialize for Locator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Frame ordinals from the main document down to a scope; empty for the
/// main document.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ScopePath(pub Vec<usize>);

impl ScopePath {
    /// Path of the main document
    pub fn main() -> Self {
        Self::default()
    }

    /// Path of the `ordinal`-th frame inside this scope
    pub fn child(&self, ordinal: usize) -> Self {
        let mut path = self.0.clone();
        path.push(ordinal);
        Self(path)
    }

    /// Nesting depth (0 for the main document)
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// Frame ordinals
    pub fn ordinals(&self) -> &[usize] {
        &self.0
    }
}

impl fmt::Display for ScopePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|o| o.to_string()).collect();
        write!(f, "[{}]", parts.join(","))
    }
}

/// A single reported rule violation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    /// Rule identifier (e.g. "missing-label")
    #[serde(rename = "id")]
    pub rule_id: String,
    /// Severity level
    pub severity: Severity,
    /// Human-readable message
    pub message: String,
    /// Location of the offending node inside its scope
    pub locator: Locator,
    /// Scope the node belongs to
    pub scope_path: ScopePath,
}

impl Finding {
    /// Create a new finding located at the scope root of the main document
    pub fn new(rule_id: &str, severity: Severity, message: &str) -> Self {
        Self {
            rule_id: rule_id.to_string(),
            severity,
            message: message.to_string(),
            locator: Locator::root(),
            scope_path: ScopePath::main(),
        }
    }

    /// Set the locator
    pub fn with_locator(mut self, locator: Locator) -> Self {
        self.locator = locator;
        self
    }

    /// Set the scope path
    pub fn with_scope_path(mut self, scope_path: ScopePath) -> Self {
        self.scope_path = scope_path;
        self
    }

    /// Deduplication and ordering key
    pub fn key(&self) -> FindingKey {
        FindingKey {
            rule_id: self.rule_id.clone(),
            scope_path: self.scope_path.clone(),
            locator: self.locator.clone(),
        }
    }

    /// Location string for display
    pub fn location_string(&self) -> String {
        format!("{} {}", self.scope_path, self.locator)
    }
}

/// `(rule id, scope path, locator)`: two findings with equal keys are duplicates.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FindingKey {
    pub rule_id: String,
    pub scope_path: ScopePath,
    pub locator: Locator,
}
