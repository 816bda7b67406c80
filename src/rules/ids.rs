// SPDX-License-Identifier: PMPL-1.0-or-later
//! Duplicate id rule - WCAG 4.1.1 Parsing

use crate::config::EngineConfig;
use crate::error::Result;
use crate::finding::Finding;
use crate::frames::Scope;
use crate::rules::{finding_at, Rule};
use std::collections::HashSet;

/// Element reusing an id already taken earlier in the scope
pub struct DuplicateId;

impl Rule for DuplicateId {
    fn id(&self) -> &str {
        "duplicate-id"
    }

    fn name(&self) -> &str {
        "Duplicate Id"
    }

    fn criterion(&self) -> &str {
        "4.1.1"
    }

    fn description(&self) -> &str {
        "Element ids must be unique so labels and ARIA references resolve"
    }

    fn evaluate(&self, scope: &Scope, _config: &EngineConfig) -> Result<Vec<Finding>> {
        let mut seen = HashSet::new();
        let mut findings = Vec::new();
        for node in scope.elements() {
            let Some(id) = node.non_empty_attr("id") else {
                continue;
            };
            if !seen.insert(id) {
                findings.push(finding_at(self, &node, &format!("id=\"{}\" is already used earlier in the document.", id)));
            }
        }
        Ok(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::testutil::{locators, page, run};

    #[test]
    fn test_second_occurrence_flagged() {
        let html = page(r#"<div id="a"></div><p id="a"></p><span id="b"></span><span id="a"></span>"#);
        let findings = run(&DuplicateId, &html);
        assert_eq!(locators(&findings), vec!["/html[1]/body[1]/p[1]", "/html[1]/body[1]/span[2]"]);
    }
}
