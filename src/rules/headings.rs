// SPDX-License-Identifier: PMPL-1.0-or-later
//! Heading rules - WCAG 2.4.6 Headings and Labels, 1.3.1 Info and Relationships

use crate::config::EngineConfig;
use crate::error::Result;
use crate::finding::Finding;
use crate::frames::{NodeRef, Scope};
use crate::rules::{finding_at, has_image_alt, is_page, page_anchor, Rule};

const HEADING_TAGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

fn is_heading(node: &NodeRef<'_>) -> bool {
    HEADING_TAGS.contains(&node.tag())
        || node
            .attr("role")
            .is_some_and(|r| r.split_whitespace().any(|r| r.eq_ignore_ascii_case("heading")))
}

/// Heading element with nothing to announce
pub struct EmptyHeading;

impl Rule for EmptyHeading {
    fn id(&self) -> &str {
        "empty-heading"
    }

    fn name(&self) -> &str {
        "Empty Heading"
    }

    fn criterion(&self) -> &str {
        "2.4.6"
    }

    fn description(&self) -> &str {
        "Headings need text content or an image with alt text"
    }

    fn evaluate(&self, scope: &Scope, _config: &EngineConfig) -> Result<Vec<Finding>> {
        Ok(scope
            .elements()
            .filter(|n| HEADING_TAGS.contains(&n.tag()))
            .filter(|h| h.text_content().trim().is_empty() && !has_image_alt(h))
            .map(|h| finding_at(self, &h, &format!("<{}> has no content.", h.tag())))
            .collect())
    }
}

/// Page without any heading
pub struct MissingHeadingStructure;

impl Rule for MissingHeadingStructure {
    fn id(&self) -> &str {
        "missing-heading-structure"
    }

    fn name(&self) -> &str {
        "Missing Heading Structure"
    }

    fn criterion(&self) -> &str {
        "1.3.1"
    }

    fn description(&self) -> &str {
        "Pages need at least one heading to convey their structure"
    }

    fn evaluate(&self, scope: &Scope, _config: &EngineConfig) -> Result<Vec<Finding>> {
        if !is_page(scope) || scope.elements().any(|n| is_heading(&n)) {
            return Ok(Vec::new());
        }
        Ok(vec![finding_at(self, &page_anchor(scope), "Document has no heading structure.")])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::testutil::{locators, page, run};

    #[test]
    fn test_empty_headings() {
        let html = page(r#"<h1>Title</h1><h2> </h2><h3><img src="logo.png" alt="Acme"></h3><h4><img src="x.png"></h4>"#);
        let findings = run(&EmptyHeading, &html);
        assert_eq!(
            locators(&findings),
            vec!["/html[1]/body[1]/h2[1]", "/html[1]/body[1]/h4[1]"]
        );
    }

    #[test]
    fn test_heading_structure() {
        assert!(run(&MissingHeadingStructure, &page("<h2>Section</h2>")).is_empty());
        assert!(run(&MissingHeadingStructure, &page(r#"<div role="heading" aria-level="1">T</div>"#)).is_empty());
        let findings = run(&MissingHeadingStructure, &page("<p>No headings here.</p>"));
        assert_eq!(locators(&findings), vec!["/html[1]/body[1]"]);
        assert!(run(&MissingHeadingStructure, "<p>fragment</p>").is_empty());
    }
}
