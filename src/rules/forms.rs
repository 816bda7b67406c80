// SPDX-License-Identifier: PMPL-1.0-or-later
//! Form labelling rules - WCAG 1.3.1 Info and Relationships, 3.3.2 Labels or Instructions
//!
//! - Every form control has an accessible name (label[for], wrapping label,
//!   aria-label or aria-labelledby). A placeholder is not a label.
//! - Every label is attached to a control.
//! - Every fieldset names its group with a legend.

use crate::config::EngineConfig;
use crate::error::Result;
use crate::finding::Finding;
use crate::frames::{NodeRef, Scope};
use crate::rules::{finding_at, has_label_association, is_form_control, Rule};

/// Controls a `<label>` can point at
const LABELABLE: &[&str] = &["input", "select", "textarea", "button", "meter", "output", "progress"];

fn is_labelable(node: &NodeRef<'_>) -> bool {
    LABELABLE.contains(&node.tag())
        && !(node.tag() == "input"
            && node.attr("type").is_some_and(|t| t.trim().eq_ignore_ascii_case("hidden")))
}

/// Form control missing an accessible name
pub struct MissingLabel;

impl Rule for MissingLabel {
    fn id(&self) -> &str {
        "missing-label"
    }

    fn name(&self) -> &str {
        "Missing Form Label"
    }

    fn criterion(&self) -> &str {
        "3.3.2"
    }

    fn description(&self) -> &str {
        "Form controls need a label, aria-label or aria-labelledby; placeholder text alone is not a label"
    }

    fn evaluate(&self, scope: &Scope, _config: &EngineConfig) -> Result<Vec<Finding>> {
        let mut findings = Vec::new();
        for control in scope.elements().filter(is_form_control) {
            if has_label_association(scope, &control) {
                continue;
            }
            let message = if control.non_empty_attr("placeholder").is_some() {
                format!(
                    "<{}> relies only on placeholder text for labeling. Placeholders disappear when typing and are not labels.",
                    control.tag()
                )
            } else {
                format!(
                    "<{}> has no associated label. Every form control needs a <label>, aria-label, or aria-labelledby.",
                    control.tag()
                )
            };
            findings.push(finding_at(self, &control, &message));
        }
        Ok(findings)
    }
}

/// Label that is not attached to any control
pub struct OrphanedFormLabel;

impl Rule for OrphanedFormLabel {
    fn id(&self) -> &str {
        "orphaned-form-label"
    }

    fn name(&self) -> &str {
        "Orphaned Form Label"
    }

    fn criterion(&self) -> &str {
        "1.3.1"
    }

    fn description(&self) -> &str {
        "Labels must wrap a control or reference an existing control with for"
    }

    fn evaluate(&self, scope: &Scope, _config: &EngineConfig) -> Result<Vec<Finding>> {
        let mut findings = Vec::new();
        for label in scope.by_tag("label") {
            let message = match label.non_empty_attr("for") {
                Some(target) => match scope.element_by_id(target) {
                    Some(control) if is_labelable(&control) => continue,
                    Some(_) => format!("<label for=\"{}\"> points at an element that is not a form control.", target),
                    None => format!("<label for=\"{}\"> points at no element in this document.", target),
                },
                None => {
                    if label.descendants().any(|d| is_labelable(&d)) {
                        continue;
                    }
                    "<label> has no for attribute and wraps no form control.".to_string()
                }
            };
            findings.push(finding_at(self, &label, &message));
        }
        Ok(findings)
    }
}

/// Fieldset without a descriptive legend
pub struct MissingFieldsetLegend;

impl Rule for MissingFieldsetLegend {
    fn id(&self) -> &str {
        "missing-fieldset-legend"
    }

    fn name(&self) -> &str {
        "Missing Fieldset Legend"
    }

    fn criterion(&self) -> &str {
        "1.3.1"
    }

    fn description(&self) -> &str {
        "Fieldsets need a legend with text describing the group"
    }

    fn evaluate(&self, scope: &Scope, _config: &EngineConfig) -> Result<Vec<Finding>> {
        let mut findings = Vec::new();
        for fieldset in scope.by_tag("fieldset") {
            let legend = fieldset.element_children().find(|c| c.tag() == "legend");
            let message = match legend {
                Some(legend) if !legend.text_content().trim().is_empty() => continue,
                Some(_) => "<fieldset> has an empty <legend>.",
                None => "<fieldset> has no <legend> describing the group.",
            };
            findings.push(finding_at(self, &fieldset, message));
        }
        Ok(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::testutil::{locators, page, run};

    #[test]
    fn test_label_for_association() {
        let html = page(r#"<label for="field">Name</label><input id="field" type="text">"#);
        assert!(run(&MissingLabel, &html).is_empty());
        assert!(run(&OrphanedFormLabel, &html).is_empty());
    }

    #[test]
    fn test_orphaned_label_and_unlabeled_input() {
        let html = page(r#"<label>Email</label><input type="email" id="email">"#);
        let orphaned = run(&OrphanedFormLabel, &html);
        assert_eq!(locators(&orphaned), vec!["/html[1]/body[1]/label[1]"]);
        let missing = run(&MissingLabel, &html);
        assert_eq!(locators(&missing), vec!["/html[1]/body[1]/input[1]"]);
    }

    #[test]
    fn test_wrapping_label() {
        let html = page(r#"<label>Search <input type="search"></label>"#);
        assert!(run(&MissingLabel, &html).is_empty());
        assert!(run(&OrphanedFormLabel, &html).is_empty());
    }

    #[test]
    fn test_placeholder_is_not_a_label() {
        let html = page(r#"<input type="text" placeholder="Your name">"#);
        let findings = run(&MissingLabel, &html);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("placeholder"));
    }

    #[test]
    fn test_aria_names_and_exempt_types() {
        let html = page(
            r#"<span id="lbl">Qty</span><input aria-labelledby="lbl">
               <input aria-label="Code"><input type="hidden"><input type="submit" value="Go">
               <textarea aria-labelledby="nowhere"></textarea>"#,
        );
        let findings = run(&MissingLabel, &html);
        assert_eq!(locators(&findings), vec!["/html[1]/body[1]/textarea[1]"]);
    }

    #[test]
    fn test_label_for_non_control() {
        let html = page(r#"<label for="x">X</label><div id="x"></div>"#);
        assert_eq!(run(&OrphanedFormLabel, &html).len(), 1);
    }

    #[test]
    fn test_fieldset_legends() {
        let html = page(
            r#"<fieldset><legend>Shipping</legend><input aria-label="Street"></fieldset>
               <fieldset><legend> </legend></fieldset>
               <fieldset><input aria-label="Card"></fieldset>"#,
        );
        let findings = run(&MissingFieldsetLegend, &html);
        assert_eq!(
            locators(&findings),
            vec!["/html[1]/body[1]/fieldset[2]", "/html[1]/body[1]/fieldset[3]"]
        );
        assert!(findings[0].message.contains("empty"));
    }
}
