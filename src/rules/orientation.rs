// SPDX-License-Identifier: PMPL-1.0-or-later
//! Orientation rule - WCAG 1.3.4 Orientation
//!
//! Content must not be restricted to a single display orientation.
//! Detects:
//! - viewport directives that disable scaling (`user-scalable=no`)
//! - orientation meta directives (`screen-orientation`, `x5-orientation`)
//! - scripts calling the orientation lock APIs
//! - `@media (orientation: …)` rules that rotate the page
//!
//! A stylesheet that lays out both portrait and landscape without rotating
//! either is an alternative, and suppresses every lock finding.

use crate::config::EngineConfig;
use crate::error::Result;
use crate::finding::{Finding, Severity};
use crate::frames::Scope;
use crate::rules::{finding_at, Rule};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

static USER_SCALABLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)user-scalable\s*=\s*(?:no|0)\b").expect("valid regex"));

static LOCK_API_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bscreen\s*\.\s*orientation\s*\.\s*lock\s*\(|\b(?:moz|ms)?lockorientation\s*\(").expect("valid regex")
});

static ORIENTATION_MEDIA_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)orientation\s*:\s*(portrait|landscape)").expect("valid regex"));

/// Orientation locked to portrait or landscape
pub struct OrientationLock;

impl Rule for OrientationLock {
    fn id(&self) -> &str {
        "orientation-lock"
    }

    fn name(&self) -> &str {
        "Orientation Lock"
    }

    fn criterion(&self) -> &str {
        "1.3.4"
    }

    fn description(&self) -> &str {
        "Content must be operable in both portrait and landscape orientation"
    }

    fn evaluate(&self, scope: &Scope, _config: &EngineConfig) -> Result<Vec<Finding>> {
        let mut findings = Vec::new();
        let mut portrait = false;
        let mut landscape = false;
        let mut rotated = false;

        for meta in scope.by_tag("meta") {
            let name = meta.attr("name").unwrap_or("").trim().to_ascii_lowercase();
            let content = meta.attr("content").unwrap_or("");
            let message = match name.as_str() {
                "viewport" if USER_SCALABLE_RE.is_match(content) => {
                    "Viewport disables user scaling, which prevents adapting content to the device orientation."
                }
                "screen-orientation" | "x5-orientation" if !content.trim().is_empty() => {
                    "Meta directive locks the screen orientation."
                }
                _ => continue,
            };
            findings.push(finding_at(self, &meta, message));
        }

        for script in scope.by_tag("script") {
            if LOCK_API_RE.is_match(&script.text_content()) {
                findings.push(finding_at(
                    self,
                    &script,
                    "Script locks the screen orientation without offering the other orientation.",
                ));
            }
        }

        for rule in &scope.document.stylesheet.rules {
            let Some(ref media) = rule.media else {
                continue;
            };
            let Some(caps) = ORIENTATION_MEDIA_RE.captures(media) else {
                continue;
            };
            let rotates = rule
                .value("transform")
                .is_some_and(|t| t.to_ascii_lowercase().contains("rotate"));
            if !rotates {
                match caps[1].to_ascii_lowercase().as_str() {
                    "portrait" => portrait = true,
                    _ => landscape = true,
                }
                continue;
            }
            rotated = true;
            let locator = scope.node(rule.origin).locator().with_detail(&rule.selector);
            findings.push(
                Finding::new(
                    self.id(),
                    Severity::Fail,
                    &format!(
                        "\"{}\" is rotated in {} orientation, forcing a single orientation.",
                        rule.selector,
                        caps[1].to_ascii_lowercase()
                    ),
                )
                .with_locator(locator)
                .with_scope_path(scope.path.clone()),
            );
        }

        if portrait && landscape && !rotated {
            debug!(scope = %scope.path, "Both orientations styled, lock findings suppressed");
            return Ok(Vec::new());
        }

        Ok(findings)
    }
}
