// SPDX-License-Identifier: PMPL-1.0-or-later
//! Page-level rules - WCAG 2.4.2 Page Titled, 3.1.1 Language of Page, 2.4.1 Bypass Blocks
//!
//! These describe the top-level document as a whole. Frame scopes and
//! markup fragments are skipped.

use crate::config::EngineConfig;
use crate::error::Result;
use crate::finding::Finding;
use crate::frames::{NodeRef, Scope};
use crate::rules::{finding_at, is_focusable, is_page, page_anchor, Rule};

/// Document without a non-empty `<title>`
pub struct MissingPageTitle;

impl Rule for MissingPageTitle {
    fn id(&self) -> &str {
        "missing-page-title"
    }

    fn name(&self) -> &str {
        "Missing Page Title"
    }

    fn criterion(&self) -> &str {
        "2.4.2"
    }

    fn description(&self) -> &str {
        "Documents need a non-empty title describing their purpose"
    }

    fn evaluate(&self, scope: &Scope, _config: &EngineConfig) -> Result<Vec<Finding>> {
        if !is_page(scope) {
            return Ok(Vec::new());
        }
        let titles: Vec<NodeRef<'_>> = scope
            .by_tag("title")
            .filter(|t| t.closest("svg").is_none())
            .collect();
        if titles.iter().any(|t| !t.text_content().trim().is_empty()) {
            return Ok(Vec::new());
        }
        let finding = match titles.first() {
            Some(title) => finding_at(self, title, "Document title is empty."),
            None => {
                let anchor = scope.by_tag("head").next().unwrap_or_else(|| page_anchor(scope));
                finding_at(self, &anchor, "Document has no <title>.")
            }
        };
        Ok(vec![finding])
    }
}

/// `<html>` without `lang` or `xml:lang`
pub struct MissingDocumentLanguage;

impl Rule for MissingDocumentLanguage {
    fn id(&self) -> &str {
        "missing-document-language"
    }

    fn name(&self) -> &str {
        "Missing Document Language"
    }

    fn criterion(&self) -> &str {
        "3.1.1"
    }

    fn description(&self) -> &str {
        "The html element must declare the page language"
    }

    fn evaluate(&self, scope: &Scope, _config: &EngineConfig) -> Result<Vec<Finding>> {
        if !is_page(scope) {
            return Ok(Vec::new());
        }
        let Some(html) = scope.by_tag("html").next() else {
            return Ok(Vec::new());
        };
        if html.non_empty_attr("lang").is_some() || html.non_empty_attr("xml:lang").is_some() {
            return Ok(Vec::new());
        }
        Ok(vec![finding_at(self, &html, "Document language is missing or empty.")])
    }
}

/// In-page link labelled as a skip link
fn is_skip_link(node: &NodeRef<'_>) -> bool {
    if node.tag() != "a" || !node.attr("href").is_some_and(|h| h.trim().starts_with('#')) {
        return false;
    }
    let label = node
        .non_empty_attr("aria-label")
        .or_else(|| node.non_empty_attr("title"))
        .map(str::to_string)
        .unwrap_or_else(|| node.text_content());
    label.to_lowercase().contains("skip")
}

/// No skip link, or one that is not the first focusable element
pub struct MissingSkipLink;

impl Rule for MissingSkipLink {
    fn id(&self) -> &str {
        "missing-skip-link"
    }

    fn name(&self) -> &str {
        "Missing Skip Link"
    }

    fn criterion(&self) -> &str {
        "2.4.1"
    }

    fn description(&self) -> &str {
        "The first focusable element should be a link that skips to the main content"
    }

    fn evaluate(&self, scope: &Scope, _config: &EngineConfig) -> Result<Vec<Finding>> {
        if !is_page(scope) {
            return Ok(Vec::new());
        }
        let focusable: Vec<NodeRef<'_>> = scope.elements().filter(is_focusable).collect();
        let finding = match focusable.iter().position(is_skip_link) {
            Some(0) => return Ok(Vec::new()),
            Some(_) => finding_at(self, &focusable[0], "Skip link is not the first focusable element."),
            None => finding_at(self, &page_anchor(scope), "Document has no skip link to the main content."),
        };
        Ok(vec![finding])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::testutil::{locators, run};

    #[test]
    fn test_title_present_empty_and_missing() {
        let ok = "<!DOCTYPE html><html lang=\"en\"><head><title>Home</title></head><body></body></html>";
        assert!(run(&MissingPageTitle, ok).is_empty());

        let empty = "<!DOCTYPE html><html><head><title>  </title></head><body></body></html>";
        assert_eq!(locators(&run(&MissingPageTitle, empty)), vec!["/html[1]/head[1]/title[1]"]);

        let missing = "<!DOCTYPE html><html><head></head><body><svg><title>Icon</title></svg></body></html>";
        assert_eq!(locators(&run(&MissingPageTitle, missing)), vec!["/html[1]/head[1]"]);
    }

    #[test]
    fn test_document_language() {
        assert!(run(&MissingDocumentLanguage, "<!DOCTYPE html><html lang=\"de\"><body></body></html>").is_empty());
        assert!(run(&MissingDocumentLanguage, "<!DOCTYPE html><html xml:lang=\"fr\"><body></body></html>").is_empty());
        let findings = run(&MissingDocumentLanguage, "<!DOCTYPE html><html lang=\" \"><body></body></html>");
        assert_eq!(locators(&findings), vec!["/html[1]"]);
    }

    #[test]
    fn test_fragments_are_not_pages() {
        assert!(run(&MissingPageTitle, "<p>frame body</p>").is_empty());
        assert!(run(&MissingDocumentLanguage, "<p>frame body</p>").is_empty());
        assert!(run(&MissingSkipLink, "<p>frame body</p>").is_empty());
    }

    #[test]
    fn test_skip_link_first() {
        let html = "<!DOCTYPE html><html><body><a href=\"#main\">Skip to content</a>\
                    <nav><a href=\"/\">Home</a></nav><main id=\"main\"></main></body></html>";
        assert!(run(&MissingSkipLink, html).is_empty());
    }

    #[test]
    fn test_skip_link_after_other_focusable() {
        let html = "<!DOCTYPE html><html><body><nav><a href=\"/\">Home</a></nav>\
                    <a href=\"#main\" aria-label=\"Skip navigation\">&darr;</a><main id=\"main\"></main></body></html>";
        let findings = run(&MissingSkipLink, html);
        assert_eq!(locators(&findings), vec!["/html[1]/body[1]/nav[1]/a[1]"]);
    }

    #[test]
    fn test_no_skip_link() {
        let html = "<!DOCTYPE html><html><body><a href=\"/\">Home</a><a href=\"#top\">Back to top</a></body></html>";
        let findings = run(&MissingSkipLink, html);
        assert_eq!(locators(&findings), vec!["/html[1]/body[1]"]);
    }
}
