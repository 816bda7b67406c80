// SPDX-License-Identifier: PMPL-1.0-or-later
//! Focus rules - WCAG 2.4.7 Focus Visible, 2.4.3 Focus Order
//!
//! - Stylesheet rules that strip the outline from a focus state while no
//!   rule for the same selector draws a replacement indicator
//! - Hidden elements that keyboard focus or in-page links can still reach

use crate::config::EngineConfig;
use crate::document::CssRule;
use crate::error::Result;
use crate::finding::{Finding, Severity};
use crate::frames::Scope;
use crate::heuristics::parse_length;
use crate::rules::{finding_at, is_focusable, Rule};
use std::collections::HashSet;

const FOCUS_PSEUDO: &[&str] = &[":focus", ":focus-visible", ":focus-within"];

fn is_zero_length(token: &str) -> bool {
    parse_length(token).is_some_and(|l| l.to_px(16.0) == Some(0.0))
}

/// Whether a declaration removes the focus outline
fn removes_outline(property: &str, value: &str) -> bool {
    let value = value.trim().to_ascii_lowercase();
    match property {
        "outline" => value.split_whitespace().any(|t| t == "none" || is_zero_length(t)),
        "outline-width" => is_zero_length(&value),
        "outline-style" => value == "none",
        "outline-color" => value == "transparent",
        _ => false,
    }
}

/// Whether a declaration draws an alternative focus indicator
fn compensates(property: &str, value: &str) -> bool {
    let value = value.trim().to_ascii_lowercase();
    if value == "none" || value == "0" || value == "transparent" || value == "inherit" || value == "initial" {
        return false;
    }
    property == "box-shadow"
        || property.starts_with("border")
        || property.starts_with("background")
        || property.starts_with("text-decoration")
}

/// Focus style removed without a replacement
pub struct FocusVisible;

impl FocusVisible {
    fn is_violation(scope: &Scope, rule: &CssRule) -> bool {
        let selector = rule.selector.to_ascii_lowercase();
        if !FOCUS_PSEUDO.iter().any(|p| selector.contains(p)) {
            return false;
        }
        if !rule.declarations.iter().any(|d| removes_outline(&d.property, &d.value)) {
            return false;
        }
        !scope
            .document
            .stylesheet
            .rules_for_selector(&rule.selector)
            .flat_map(|r| r.declarations.iter())
            .any(|d| compensates(&d.property, &d.value))
    }
}

impl Rule for FocusVisible {
    fn id(&self) -> &str {
        "focus-visible"
    }

    fn name(&self) -> &str {
        "Focus Visible"
    }

    fn criterion(&self) -> &str {
        "2.4.7"
    }

    fn description(&self) -> &str {
        "Removing the focus outline requires a replacement focus indicator"
    }

    fn evaluate(&self, scope: &Scope, _config: &EngineConfig) -> Result<Vec<Finding>> {
        let mut findings = Vec::new();
        for rule in &scope.document.stylesheet.rules {
            if !Self::is_violation(scope, rule) {
                continue;
            }
            let locator = scope.node(rule.origin).locator().with_detail(&rule.selector);
            findings.push(
                Finding::new(
                    self.id(),
                    Severity::Fail,
                    &format!(
                        "\"{}\" removes the focus outline without providing another visible focus style.",
                        rule.selector
                    ),
                )
                .with_locator(locator)
                .with_scope_path(scope.path.clone()),
            );
        }
        Ok(findings)
    }
}

/// Hidden element that is focusable or targeted by in-page navigation
pub struct HiddenFocusable;

impl HiddenFocusable {
    /// Lower-cased ids targeted by `href="#id"` or `aria-controls`
    fn referenced_ids(scope: &Scope) -> HashSet<String> {
        let mut ids = HashSet::new();
        for node in scope.elements() {
            if let Some(target) = node.attr("href").and_then(|h| h.trim().strip_prefix('#')) {
                if !target.is_empty() {
                    ids.insert(target.to_lowercase());
                }
            }
            if let Some(controls) = node.attr("aria-controls") {
                ids.extend(controls.split_whitespace().map(str::to_lowercase));
            }
        }
        ids
    }
}

impl Rule for HiddenFocusable {
    fn id(&self) -> &str {
        "hidden-focusable"
    }

    fn name(&self) -> &str {
        "Hidden Focusable Element"
    }

    fn criterion(&self) -> &str {
        "2.4.3"
    }

    fn description(&self) -> &str {
        "Hidden content must not receive keyboard focus or be the target of navigation"
    }

    fn evaluate(&self, scope: &Scope, _config: &EngineConfig) -> Result<Vec<Finding>> {
        let referenced = Self::referenced_ids(scope);
        let mut findings = Vec::new();
        for node in scope.elements() {
            let focusable = is_focusable(&node);
            let targeted = node
                .non_empty_attr("id")
                .is_some_and(|id| referenced.contains(&id.to_lowercase()));
            if !(focusable || targeted) || !node.is_rendered() || !node.is_hidden() {
                continue;
            }
            let message = if focusable {
                format!("Hidden <{}> can still receive keyboard focus.", node.tag())
            } else {
                format!("Hidden <{}> is the target of an in-page link or aria-controls.", node.tag())
            };
            findings.push(finding_at(self, &node, &message));
        }
        Ok(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::testutil::{locators, page, run, styled_page};

    #[test]
    fn test_outline_none_on_focus() {
        let html = styled_page("button:focus { outline: none; }", "<button>Go</button>");
        let findings = run(&FocusVisible, &html);
        assert_eq!(locators(&findings), vec!["/html[1]/head[1]/style[1]|button:focus"]);
    }

    #[test]
    fn test_box_shadow_compensates() {
        let html = styled_page(
            "a:focus-visible { outline: 0 } a:focus-visible { box-shadow: 0 0 0 3px #005fcc }",
            "<a href=\"/\">x</a>",
        );
        assert!(run(&FocusVisible, &html).is_empty());
    }

    #[test]
    fn test_outline_removed_outside_focus_is_ignored() {
        let html = styled_page("button { outline: none }", "<button>Go</button>");
        assert!(run(&FocusVisible, &html).is_empty());
    }

    #[test]
    fn test_outline_width_zero() {
        assert!(removes_outline("outline-width", "0px"));
        assert!(removes_outline("outline", "0 solid"));
        assert!(!removes_outline("outline", "2px solid #000"));
        assert!(!compensates("box-shadow", "none"));
    }

    #[test]
    fn test_hidden_focusable_elements() {
        let html = styled_page(
            ".hidden { display: none }",
            r#"<div class="hidden"><a href="/a">A</a><span>text</span></div>
               <div aria-hidden="true"><button>B</button><a href="/c" tabindex="-1">C</a></div>
               <input type="text" hidden aria-label="D">
               <a href="/e">E</a>"#,
        );
        let findings = run(&HiddenFocusable, &html);
        assert_eq!(
            locators(&findings),
            vec![
                "/html[1]/body[1]/div[1]/a[1]",
                "/html[1]/body[1]/div[2]/button[1]",
                "/html[1]/body[1]/input[1]",
            ]
        );
    }

    #[test]
    fn test_hidden_link_target() {
        let html = page(r##"<a href="#panel">Open</a><div id="panel" hidden>Panel</div><div id="free" hidden></div>"##);
        let findings = run(&HiddenFocusable, &html);
        assert_eq!(locators(&findings), vec!["/html[1]/body[1]/div[1]"]);
        assert!(findings[0].message.contains("target"));
    }
}
