// SPDX-License-Identifier: PMPL-1.0-or-later
//! Text scaling rules - WCAG 1.4.4 Resize Text, 1.4.12 Text Spacing
//!
//! Spacing below the minimums passes when a `@media` rule for a larger
//! viewport or zoom level restores a compliant value. `print` and
//! `max-width` style conditions never restore.

use crate::config::EngineConfig;
use crate::document::css::{parse_declarations, Declaration};
use crate::error::Result;
use crate::finding::{Finding, Severity};
use crate::frames::{NodeRef, Scope};
use crate::heuristics::{is_fixed_length, line_height_ratio, parse_length, spacing_em};
use crate::rules::{finding_at, Rule};

const TEXT_SIZE_ADJUST: &[&str] = &["text-size-adjust", "-webkit-text-size-adjust"];

/// Properties users override under 1.4.12
const SPACING_PROPERTIES: &[&str] = &["line-height", "letter-spacing", "word-spacing"];

/// Spacing properties a declaration list pins with `!important`
fn important_spacing(declarations: &[Declaration]) -> Vec<&str> {
    let mut pinned: Vec<&str> = Vec::new();
    for decl in declarations.iter().filter(|d| d.important) {
        let property = decl.property.as_str();
        if SPACING_PROPERTIES.contains(&property) && !pinned.contains(&property) {
            pinned.push(property);
        }
    }
    pinned
}

/// Box that cannot grow with its text
fn is_rigid_box(node: &NodeRef<'_>) -> bool {
    let Some(style) = node.style() else {
        return false;
    };
    let fixed = ["width", "max-width"]
        .iter()
        .any(|p| style.declared(p).is_some_and(is_fixed_length));
    let no_wrap = style
        .get("white-space")
        .is_some_and(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "nowrap" | "pre"));
    fixed || no_wrap
}

/// Small fixed font in a rigid box, or text zoom disabled
pub struct TextResize;

impl Rule for TextResize {
    fn id(&self) -> &str {
        "text-resize"
    }

    fn name(&self) -> &str {
        "Resize Text"
    }

    fn criterion(&self) -> &str {
        "1.4.4"
    }

    fn description(&self) -> &str {
        "Text must scale to 200% without clipping inside fixed-size containers"
    }

    fn evaluate(&self, scope: &Scope, config: &EngineConfig) -> Result<Vec<Finding>> {
        let mut findings = Vec::new();
        for node in scope.elements() {
            let Some(style) = node.style() else {
                continue;
            };

            if TEXT_SIZE_ADJUST
                .iter()
                .any(|p| style.declared(p).is_some_and(|v| v.trim().eq_ignore_ascii_case("none")))
            {
                findings.push(finding_at(
                    self,
                    &node,
                    "text-size-adjust: none prevents text from being resized.",
                ));
                continue;
            }

            if node.own_text().trim().is_empty() || !node.is_rendered() {
                continue;
            }
            let fixed_font = style
                .declared("font-size")
                .and_then(parse_length)
                .is_some_and(|l| l.is_fixed());
            let font_px = style.font_size_px();
            if !fixed_font || font_px >= config.min_resizable_font_px {
                continue;
            }
            if std::iter::once(node).chain(node.ancestors()).any(|n| is_rigid_box(&n)) {
                findings.push(finding_at(
                    self,
                    &node,
                    &format!(
                        "Fixed {}px text inside a fixed-width or non-wrapping container will clip at 200% zoom.",
                        font_px
                    ),
                ));
            }
        }
        Ok(findings)
    }
}

/// Spacing below the 1.4.12 minimums
pub struct TextSpacing;

impl TextSpacing {
    fn line_height_violation(node: &NodeRef<'_>, config: &EngineConfig) -> Option<String> {
        let style = node.style()?;
        let font_px = style.font_size_px();
        let ratio = line_height_ratio(style.declared("line-height")?, font_px)?;
        if ratio >= config.min_line_height_ratio {
            return None;
        }
        let restored = style
            .enlarged_values("line-height")
            .filter_map(|v| line_height_ratio(v, font_px))
            .any(|r| r >= config.min_line_height_ratio);
        if restored {
            return None;
        }
        Some(format!(
            "line-height is {:.2}x the font size, below the {}x minimum.",
            ratio, config.min_line_height_ratio
        ))
    }

    fn spacing_violation(node: &NodeRef<'_>, property: &str, min_em: f64) -> Option<String> {
        let style = node.style()?;
        let value = style.declared(property)?;
        let font_px = style.font_size_px();
        let em = spacing_em(value, font_px)?;
        if em >= min_em {
            return None;
        }
        let restored = style
            .enlarged_values(property)
            .filter_map(|v| spacing_em(v, font_px))
            .any(|e| e >= min_em);
        if restored {
            return None;
        }
        if em < 0.0 {
            Some(format!("{} is negative ({}).", property, value))
        } else {
            Some(format!(
                "{} is {:.2}em ({}), below the {}em minimum.",
                property, em, value, min_em
            ))
        }
    }

    fn no_wrap_violation(node: &NodeRef<'_>) -> Option<String> {
        let value = node.style()?.declared("white-space")?;
        if !value.trim().eq_ignore_ascii_case("nowrap") {
            return None;
        }
        Some("white-space: nowrap keeps text from reflowing when spacing is increased.".to_string())
    }

    fn inline_important_violation(node: &NodeRef<'_>) -> Option<String> {
        let declarations = parse_declarations(node.attr("style")?);
        let pinned = important_spacing(&declarations);
        if pinned.is_empty() {
            return None;
        }
        Some(format!(
            "{} declared !important, which blocks user spacing overrides.",
            pinned.join(", ")
        ))
    }
}

impl Rule for TextSpacing {
    fn id(&self) -> &str {
        "text-spacing"
    }

    fn name(&self) -> &str {
        "Text Spacing"
    }

    fn criterion(&self) -> &str {
        "1.4.12"
    }

    fn description(&self) -> &str {
        "Line height, letter and word spacing must meet the minimums and stay overridable by the user"
    }

    fn evaluate(&self, scope: &Scope, config: &EngineConfig) -> Result<Vec<Finding>> {
        let mut findings = Vec::new();
        for node in scope.elements() {
            if !node.is_rendered() || node.text_content().trim().is_empty() {
                continue;
            }
            let problems: Vec<String> = [
                Self::line_height_violation(&node, config),
                Self::spacing_violation(&node, "letter-spacing", config.min_letter_spacing_em),
                Self::spacing_violation(&node, "word-spacing", config.min_word_spacing_em),
                Self::no_wrap_violation(&node),
                Self::inline_important_violation(&node),
            ]
            .into_iter()
            .flatten()
            .collect();
            if problems.is_empty() {
                continue;
            }
            findings.push(finding_at(self, &node, &problems.join(" ")));
        }

        for rule in &scope.document.stylesheet.rules {
            let pinned = important_spacing(&rule.declarations);
            if pinned.is_empty() {
                continue;
            }
            let locator = scope.node(rule.origin).locator().with_detail(&rule.selector);
            findings.push(
                Finding::new(
                    self.id(),
                    Severity::Fail,
                    &format!(
                        "\"{}\" declares {} !important, which blocks user spacing overrides.",
                        rule.selector,
                        pinned.join(", ")
                    ),
                )
                .with_locator(locator)
                .with_scope_path(scope.path.clone()),
            );
        }
        Ok(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::testutil::{locators, page, run, styled_page};

    #[test]
    fn test_small_text_in_fixed_container() {
        let html = styled_page(
            ".fixed { width: 1200px }",
            r#"<div class="fixed"><p style="font-size: 10px">Tiny print</p></div>"#,
        );
        let findings = run(&TextResize, &html);
        assert_eq!(locators(&findings), vec!["/html[1]/body[1]/div[1]/p[1]"]);
    }

    #[test]
    fn test_small_text_in_fluid_container_passes() {
        let html = page(r#"<div style="width: 80%"><p style="font-size: 10px">Tiny print</p></div>"#);
        assert!(run(&TextResize, &html).is_empty());
    }

    #[test]
    fn test_relative_font_passes() {
        let html = page(r#"<p style="font-size: 0.6em; white-space: nowrap">Relative</p>"#);
        assert!(run(&TextResize, &html).is_empty());
    }

    #[test]
    fn test_text_size_adjust_none() {
        let html = styled_page("body { -webkit-text-size-adjust: none }", "<p>x</p>");
        assert_eq!(locators(&run(&TextResize, &html)), vec!["/html[1]/body[1]"]);
    }

    #[test]
    fn test_tight_spacing() {
        let html = styled_page("p { line-height: 1; letter-spacing: -0.5px }", "<p>Cramped</p>");
        let findings = run(&TextSpacing, &html);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("letter-spacing"));
    }

    #[test]
    fn test_media_override_restores_spacing() {
        let html = styled_page(
            "p { line-height: 1.2 } @media (min-width: 1px) { p { line-height: 1.6 } }",
            "<p>Restored</p>",
        );
        assert!(run(&TextSpacing, &html).is_empty());
    }

    #[test]
    fn test_comfortable_spacing_passes() {
        let html = styled_page("p { line-height: 1.5; word-spacing: 0.16em }", "<p>Fine</p>");
        assert!(run(&TextSpacing, &html).is_empty());
    }

    #[test]
    fn test_print_media_does_not_restore() {
        let html = styled_page(
            "p { line-height: 1.0; letter-spacing: -2px } @media print { p { line-height: 2; letter-spacing: 0.2em } }",
            "<p>Printed</p>",
        );
        let findings = run(&TextSpacing, &html);
        assert_eq!(locators(&findings), vec!["/html[1]/body[1]/p[1]"]);
        assert!(findings[0].message.contains("line-height"));
        assert!(findings[0].message.contains("letter-spacing is negative"));
    }

    #[test]
    fn test_narrow_viewport_media_does_not_restore() {
        let html = styled_page(
            "p { line-height: 1.1 } @media (max-width: 600px) { p { line-height: 1.8 } }",
            "<p>Narrow</p>",
        );
        assert_eq!(run(&TextSpacing, &html).len(), 1);
    }

    #[test]
    fn test_sub_minimum_spacing() {
        let html = styled_page(
            ".a { letter-spacing: 0.05em } .b { word-spacing: 1px } .c { letter-spacing: 2px }",
            r#"<p class="a">Letters</p><p class="b">Words</p><p class="c">Fine</p>"#,
        );
        let findings = run(&TextSpacing, &html);
        assert_eq!(locators(&findings), vec!["/html[1]/body[1]/p[1]", "/html[1]/body[1]/p[2]"]);
        assert!(findings[0].message.contains("below the 0.12em minimum"));
        assert!(findings[1].message.contains("below the 0.16em minimum"));
    }

    #[test]
    fn test_spacing_thresholds_are_configurable() {
        let html = styled_page(".a { letter-spacing: 0.05em }", r#"<p class="a">Letters</p>"#);
        let scope = crate::frames::Scope::new(
            crate::finding::ScopePath::main(),
            crate::document::Document::parse(&html),
        );
        let config = EngineConfig {
            min_letter_spacing_em: 0.04,
            ..EngineConfig::default()
        };
        assert!(TextSpacing.evaluate(&scope, &config).unwrap().is_empty());
    }

    #[test]
    fn test_important_spacing_blocks_overrides() {
        let html = styled_page(
            "p { line-height: 1.6 !important; word-spacing: 0.2em !important }",
            r#"<p>Pinned</p><div style="letter-spacing: 0.2em !important">Inline</div>"#,
        );
        let findings = run(&TextSpacing, &html);
        assert_eq!(
            locators(&findings),
            vec!["/html[1]/body[1]/div[1]", "/html[1]/head[1]/style[1]|p"]
        );
        assert!(findings[1].message.contains("line-height, word-spacing"));
    }

    #[test]
    fn test_nowrap_text_is_flagged() {
        let html = styled_page(".nowrap { white-space: nowrap }", r#"<section class="nowrap"><h2>Help</h2></section><div class="nowrap"></div>"#);
        let findings = run(&TextSpacing, &html);
        assert_eq!(locators(&findings), vec!["/html[1]/body[1]/section[1]"]);
    }
}
