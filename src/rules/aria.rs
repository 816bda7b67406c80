// SPDX-License-Identifier: PMPL-1.0-or-later
//! ARIA role rule - WCAG 4.1.2 Name, Role, Value

use crate::config::EngineConfig;
use crate::error::Result;
use crate::finding::Finding;
use crate::frames::Scope;
use crate::rules::{finding_at, Rule};

/// Concrete WAI-ARIA roles
const ARIA_ROLES: &[&str] = &[
    "alert", "alertdialog", "application", "article", "banner", "button", "cell", "checkbox",
    "columnheader", "combobox", "complementary", "contentinfo", "definition", "dialog", "directory",
    "document", "feed", "figure", "form", "grid", "gridcell", "group", "heading", "img", "link",
    "list", "listbox", "listitem", "log", "main", "marquee", "math", "menu", "menubar", "menuitem",
    "menuitemcheckbox", "menuitemradio", "navigation", "none", "note", "option", "presentation",
    "progressbar", "radio", "radiogroup", "region", "row", "rowgroup", "rowheader", "scrollbar",
    "search", "searchbox", "separator", "slider", "spinbutton", "status", "switch", "tab", "table",
    "tablist", "tabpanel", "term", "textbox", "timer", "toolbar", "tooltip", "tree", "treegrid",
    "treeitem",
];

fn is_known_role(token: &str) -> bool {
    ARIA_ROLES.contains(&token.to_ascii_lowercase().as_str())
}

/// `role` tokens that are not ARIA roles
pub struct InvalidAriaRole;

impl Rule for InvalidAriaRole {
    fn id(&self) -> &str {
        "invalid-aria-role"
    }

    fn name(&self) -> &str {
        "Invalid ARIA Role"
    }

    fn criterion(&self) -> &str {
        "4.1.2"
    }

    fn description(&self) -> &str {
        "Every token of a role attribute must be a defined ARIA role"
    }

    fn evaluate(&self, scope: &Scope, _config: &EngineConfig) -> Result<Vec<Finding>> {
        let mut findings = Vec::new();
        for node in scope.elements() {
            let Some(role) = node.attr("role") else {
                continue;
            };
            let invalid: Vec<&str> = role.split_whitespace().filter(|t| !is_known_role(t)).collect();
            if invalid.is_empty() {
                continue;
            }
            findings.push(finding_at(
                self,
                &node,
                &format!("Invalid ARIA role(s): {}.", invalid.join(", ")),
            ));
        }
        Ok(findings)
    }
}
