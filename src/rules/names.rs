// SPDX-License-Identifier: PMPL-1.0-or-later
//! Accessible name rules - WCAG 4.1.2 Name, Role, Value, 2.4.4 Link Purpose
//!
//! Buttons and links are named by their text, an image's alt text,
//! aria-label, a resolvable aria-labelledby or a title. Buttons can also be
//! named by a label.

use crate::config::EngineConfig;
use crate::error::Result;
use crate::finding::Finding;
use crate::frames::{NodeRef, Scope};
use crate::rules::{finding_at, has_image_alt, has_label_association, Rule};

/// `<input>` types rendered as buttons
const BUTTON_INPUT_TYPES: &[&str] = &["button", "submit", "reset", "image"];

fn button_input_type(node: &NodeRef<'_>) -> Option<String> {
    if node.tag() != "input" {
        return None;
    }
    let kind = node.attr("type")?.trim().to_ascii_lowercase();
    BUTTON_INPUT_TYPES.contains(&kind.as_str()).then_some(kind)
}

fn has_aria_name(scope: &Scope, node: &NodeRef<'_>) -> bool {
    node.non_empty_attr("aria-label").is_some()
        || node
            .attr("aria-labelledby")
            .is_some_and(|ids| ids.split_whitespace().any(|id| scope.element_by_id(id).is_some()))
        || node.non_empty_attr("title").is_some()
}

/// Button without an accessible name
pub struct UnlabeledButton;

impl UnlabeledButton {
    fn is_named(scope: &Scope, node: &NodeRef<'_>) -> bool {
        if node.non_empty_attr("title").is_some() || has_label_association(scope, node) {
            return true;
        }
        match button_input_type(node).as_deref() {
            Some("image") => node.non_empty_attr("alt").is_some(),
            Some(_) => node.non_empty_attr("value").is_some(),
            None => !node.text_content().trim().is_empty() || has_image_alt(node),
        }
    }
}

impl Rule for UnlabeledButton {
    fn id(&self) -> &str {
        "unlabeled-button"
    }

    fn name(&self) -> &str {
        "Unlabeled Button"
    }

    fn criterion(&self) -> &str {
        "4.1.2"
    }

    fn description(&self) -> &str {
        "Buttons need text, a value, alt text or an ARIA name"
    }

    fn evaluate(&self, scope: &Scope, _config: &EngineConfig) -> Result<Vec<Finding>> {
        let mut findings = Vec::new();
        for node in scope.elements() {
            if node.tag() != "button" && button_input_type(&node).is_none() {
                continue;
            }
            if Self::is_named(scope, &node) {
                continue;
            }
            findings.push(finding_at(self, &node, "Button has no accessible name."));
        }
        Ok(findings)
    }
}

/// Link without text or another accessible name
pub struct MissingLinkText;

impl Rule for MissingLinkText {
    fn id(&self) -> &str {
        "missing-link-text"
    }

    fn name(&self) -> &str {
        "Missing Link Text"
    }

    fn criterion(&self) -> &str {
        "2.4.4"
    }

    fn description(&self) -> &str {
        "Links need text, an image with alt text or an ARIA name describing their purpose"
    }

    fn evaluate(&self, scope: &Scope, _config: &EngineConfig) -> Result<Vec<Finding>> {
        Ok(scope
            .by_tag("a")
            .filter(|a| a.has_attr("href"))
            .filter(|a| a.text_content().trim().is_empty() && !has_image_alt(a) && !has_aria_name(scope, a))
            .map(|a| finding_at(self, &a, "Link has no accessible text."))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::testutil::{locators, page, run};

    #[test]
    fn test_buttons() {
        let html = page(
            r#"<button>Save</button>
               <button aria-label="Close">&times;</button>
               <button><img src="x.png" alt="Search"></button>
               <button><svg></svg></button>
               <input type="submit" value="Send">
               <input type="submit">
               <input type="image" src="go.png" alt="Go">
               <label for="b">Reset form</label><input type="reset" id="b">
               <button title="Menu"></button>
               <input type="text">"#,
        );
        let findings = run(&UnlabeledButton, &html);
        assert_eq!(
            locators(&findings),
            vec!["/html[1]/body[1]/button[4]", "/html[1]/body[1]/input[2]"]
        );
    }

    #[test]
    fn test_links() {
        let html = page(
            r#"<span id="t">Terms</span>
               <a href="/">Home</a>
               <a href="/a"><img src="a.png" alt="Account"></a>
               <a href="/b" aria-labelledby="t"></a>
               <a href="/c"><img src="c.png"></a>
               <a href="/d" aria-labelledby="missing"> </a>
               <a id="anchor"></a>"#,
        );
        let findings = run(&MissingLinkText, &html);
        assert_eq!(
            locators(&findings),
            vec!["/html[1]/body[1]/a[4]", "/html[1]/body[1]/a[5]"]
        );
    }
}
