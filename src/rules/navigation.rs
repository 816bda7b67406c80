// SPDX-License-Identifier: PMPL-1.0-or-later
//! Landmark rules - WCAG 2.4.1 Bypass Blocks, 1.3.1 Info and Relationships, 2.4.5 Multiple Ways

use crate::config::EngineConfig;
use crate::error::Result;
use crate::finding::Finding;
use crate::frames::{NodeRef, Scope};
use crate::rules::{finding_at, normalize_text, page_anchor, Rule};
use std::collections::{BTreeSet, HashMap};

fn has_role(node: &NodeRef<'_>, role: &str) -> bool {
    node.attr("role")
        .is_some_and(|r| r.split_whitespace().any(|r| r.eq_ignore_ascii_case(role)))
}

fn is_main_landmark(node: &NodeRef<'_>) -> bool {
    node.tag() == "main" || has_role(node, "main")
}

fn is_nav_landmark(node: &NodeRef<'_>) -> bool {
    node.tag() == "nav" || has_role(node, "navigation")
}

/// Lower-cased, whitespace-collapsed link text
fn link_label(link: &NodeRef<'_>) -> String {
    normalize_text(&link.text_content()).to_lowercase()
}

/// Search field, search landmark or site map link: another way to find pages
fn has_alternative_navigation(scope: &Scope) -> bool {
    scope.elements().any(|n| {
        let search_input = n.tag() == "input"
            && (n.attr("type").is_some_and(|t| t.trim().eq_ignore_ascii_case("search"))
                || n.attr("aria-label").is_some_and(|l| l.to_lowercase().contains("search")));
        let sitemap = n.tag() == "a" && {
            let label = link_label(&n);
            label.contains("sitemap") || label.contains("site map")
        };
        search_input || sitemap || has_role(&n, "search")
    })
}

/// Landmark order, focus order and consistent labelling of navigation
pub struct NavigationStructure;

impl NavigationStructure {
    fn landmarks(&self, scope: &Scope, navs: &[NodeRef<'_>]) -> Option<Finding> {
        let Some(main) = scope.elements().find(is_main_landmark) else {
            return Some(finding_at(self, &page_anchor(scope), "Document has no main landmark (<main> or role=\"main\")."));
        };
        if navs.iter().any(|n| n.id < main.id) {
            return None;
        }
        if navs.is_empty() && has_alternative_navigation(scope) {
            return None;
        }
        Some(finding_at(self, &main, "No navigation landmark precedes the main content."))
    }

    fn positive_tabindex(&self, scope: &Scope) -> Vec<Finding> {
        scope
            .elements()
            .filter_map(|n| {
                let value = n.attr("tabindex")?.trim().parse::<i32>().ok().filter(|v| *v > 0)?;
                Some(finding_at(
                    self,
                    &n,
                    &format!("tabindex=\"{}\" overrides the document focus order.", value),
                ))
            })
            .collect()
    }

    /// Navigation regions repeating an earlier region's links in another order
    fn reordered(&self, navs: &[NodeRef<'_>]) -> Vec<Finding> {
        let sequences: Vec<Vec<String>> = navs
            .iter()
            .map(|nav| {
                nav.descendants()
                    .filter(|d| d.tag() == "a")
                    .map(|a| link_label(&a))
                    .filter(|l| !l.is_empty())
                    .collect()
            })
            .collect();
        let mut findings = Vec::new();
        for (i, sequence) in sequences.iter().enumerate().skip(1) {
            let mut sorted = sequence.clone();
            sorted.sort();
            let reordered = sequences[..i].iter().any(|earlier| {
                let mut other = earlier.clone();
                other.sort();
                other == sorted && earlier != sequence
            });
            if reordered {
                findings.push(finding_at(
                    self,
                    &navs[i],
                    "Navigation repeats an earlier navigation region's links in a different order.",
                ));
            }
        }
        findings
    }

    /// Links to one destination carrying different labels
    fn inconsistent_labels(&self, scope: &Scope) -> Vec<Finding> {
        let mut labels: HashMap<&str, String> = HashMap::new();
        let mut findings = Vec::new();
        for link in scope.by_tag("a") {
            let Some(href) = link.non_empty_attr("href") else {
                continue;
            };
            let label = link_label(&link);
            if label.is_empty() {
                continue;
            }
            let first = labels.entry(href).or_insert_with(|| label.clone());
            if *first != label {
                findings.push(finding_at(
                    self,
                    &link,
                    &format!("Link to \"{}\" is labelled \"{}\" here but \"{}\" earlier.", href, label, first),
                ));
            }
        }
        findings
    }
}

impl Rule for NavigationStructure {
    fn id(&self) -> &str {
        "navigation-structure"
    }

    fn name(&self) -> &str {
        "Navigation Structure"
    }

    fn criterion(&self) -> &str {
        "2.4.1"
    }

    fn description(&self) -> &str {
        "Documents need a main landmark preceded by navigation, a natural focus order and consistent link labels"
    }

    fn evaluate(&self, scope: &Scope, _config: &EngineConfig) -> Result<Vec<Finding>> {
        if scope.is_fragment() {
            return Ok(Vec::new());
        }
        let navs: Vec<NodeRef<'_>> = scope.elements().filter(is_nav_landmark).collect();
        let mut findings: Vec<Finding> = self.landmarks(scope, &navs).into_iter().collect();
        findings.extend(self.positive_tabindex(scope));
        findings.extend(self.reordered(&navs));
        findings.extend(self.inconsistent_labels(scope));
        Ok(findings)
    }
}

/// Hidden navigation whose links are not offered anywhere visible
pub struct HiddenNavigation;

fn nav_links(nav: &NodeRef<'_>) -> BTreeSet<(String, String)> {
    nav.descendants()
        .filter(|d| d.tag() == "a")
        .filter_map(|a| {
            let href = a.non_empty_attr("href")?;
            Some((href.to_string(), normalize_text(&a.text_content()).to_lowercase()))
        })
        .collect()
}

impl Rule for HiddenNavigation {
    fn id(&self) -> &str {
        "hidden-navigation"
    }

    fn name(&self) -> &str {
        "Hidden Navigation"
    }

    fn criterion(&self) -> &str {
        "2.4.5"
    }

    fn description(&self) -> &str {
        "Links in hidden navigation landmarks must also be reachable from a visible one"
    }

    fn evaluate(&self, scope: &Scope, _config: &EngineConfig) -> Result<Vec<Finding>> {
        let navs: Vec<NodeRef<'_>> = scope.elements().filter(is_nav_landmark).collect();
        if navs.len() < 2 {
            return Ok(Vec::new());
        }
        let (hidden, visible): (Vec<_>, Vec<_>) = navs.into_iter().partition(|n| n.is_hidden());
        let offered: BTreeSet<(String, String)> = visible.iter().flat_map(nav_links).collect();

        let mut findings = Vec::new();
        for nav in hidden {
            let links = nav_links(&nav);
            let unreachable = links.iter().filter(|l| !offered.contains(*l)).count();
            if unreachable == 0 {
                continue;
            }
            findings.push(finding_at(
                self,
                &nav,
                &format!(
                    "Hidden navigation contains {} link(s) that no visible navigation provides.",
                    unreachable
                ),
            ));
        }
        Ok(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::testutil::{locators, page, run, styled_page};

    #[test]
    fn test_nav_before_main_passes() {
        let html = page(r#"<nav><a href="/">Home</a></nav><main><h1>x</h1></main>"#);
        assert!(run(&NavigationStructure, &html).is_empty());
    }

    #[test]
    fn test_nav_inside_main_is_flagged() {
        let html = page(r#"<main><nav><a href="/">Home</a></nav><h1>x</h1></main>"#);
        let findings = run(&NavigationStructure, &html);
        assert_eq!(locators(&findings), vec!["/html[1]/body[1]/main[1]"]);
    }

    #[test]
    fn test_missing_main_flagged_at_body() {
        let html = page(r#"<div role="navigation"></div><div>content</div>"#);
        let findings = run(&NavigationStructure, &html);
        assert_eq!(locators(&findings), vec!["/html[1]/body[1]"]);
    }

    #[test]
    fn test_fragment_is_skipped() {
        assert!(run(&NavigationStructure, "<p>frame body</p>").is_empty());
    }

    #[test]
    fn test_search_offers_alternative_to_navigation() {
        let html = page(r#"<main><h1>x</h1><input type="search" aria-label="Search site"></main>"#);
        assert!(run(&NavigationStructure, &html).is_empty());
        let html = page(r#"<main><h1>x</h1><a href="/map">Site map</a></main>"#);
        assert!(run(&NavigationStructure, &html).is_empty());
    }

    #[test]
    fn test_positive_tabindex() {
        let html = page(
            r#"<nav><a href="/">Home</a></nav><main><button tabindex="3">Go</button><div tabindex="0">x</div></main>"#,
        );
        let findings = run(&NavigationStructure, &html);
        assert_eq!(locators(&findings), vec!["/html[1]/body[1]/main[1]/button[1]"]);
    }

    #[test]
    fn test_repeated_navigation_in_other_order() {
        let html = page(
            r#"<nav><a href="/">Home</a><a href="/about">About</a></nav>
               <main><h1>x</h1></main>
               <nav><a href="/about">About</a><a href="/">Home</a></nav>
               <nav><a href="/help">Help</a></nav>"#,
        );
        let findings = run(&NavigationStructure, &html);
        assert_eq!(locators(&findings), vec!["/html[1]/body[1]/nav[2]"]);
    }

    #[test]
    fn test_same_destination_different_labels() {
        let html = page(
            r#"<nav><a href="/">Home</a></nav><main><a href="/">Start page</a><a href="/">home</a></main>"#,
        );
        let findings = run(&NavigationStructure, &html);
        assert_eq!(locators(&findings), vec!["/html[1]/body[1]/main[1]/a[1]"]);
        assert!(findings[0].message.contains("\"start page\""));
    }

    #[test]
    fn test_hidden_nav_with_unique_links() {
        let html = styled_page(
            ".hidden { display: none }",
            r#"<nav class="hidden"><a href="/about">About</a></nav><nav><a href="/">Home</a></nav><main></main>"#,
        );
        let findings = run(&HiddenNavigation, &html);
        assert_eq!(locators(&findings), vec!["/html[1]/body[1]/nav[1]"]);
    }

    #[test]
    fn test_hidden_nav_duplicated_by_visible_nav() {
        let html = page(
            r#"<nav hidden><a href="/">Home</a></nav><nav><a href="/">Home</a></nav><main></main>"#,
        );
        assert!(run(&HiddenNavigation, &html).is_empty());
    }
}
