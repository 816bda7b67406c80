// SPDX-License-Identifier: PMPL-1.0-or-later
//! Reflow rules - WCAG 1.4.10 Reflow
//!
//! Content must reflow into a 320 CSS px wide viewport without scrolling
//! in two dimensions. Flags boxes pinned wider than that, text that is
//! kept from wrapping and elements taken out of the flow by an inline
//! `position`.

use crate::config::EngineConfig;
use crate::document::css::parse_declarations;
use crate::error::Result;
use crate::finding::Finding;
use crate::frames::{NodeRef, Scope};
use crate::heuristics::{parse_length, REFLOW_WIDTH_PX};
use crate::rules::{finding_at, Rule};

/// Elements whose `width` attribute sizes replaced content, not layout
const REPLACED: &[&str] = &["img", "iframe", "frame", "video", "canvas", "svg", "embed", "object", "input"];

/// `white-space` values that disable wrapping
const NON_WRAPPING: &[&str] = &["nowrap", "pre"];

/// Fixed width in px above the reflow viewport, from a declaration
fn fixed_width_px(value: &str, font_px: f64) -> Option<f64> {
    let length = parse_length(value)?;
    if !length.is_fixed() {
        return None;
    }
    length.to_px(font_px).filter(|px| *px > REFLOW_WIDTH_PX)
}

/// Fixed width in px above the reflow viewport, from a `width` attribute
fn width_attribute_px(node: &NodeRef<'_>) -> Option<f64> {
    if REPLACED.contains(&node.tag()) {
        return None;
    }
    let value = node.non_empty_attr("width")?;
    if value.ends_with('%') {
        return None;
    }
    let px: f64 = value.trim_end_matches("px").trim().parse().ok()?;
    (px > REFLOW_WIDTH_PX).then_some(px)
}

/// Box pinned wider than the reflow viewport
pub struct FixedWidthLayout;

impl Rule for FixedWidthLayout {
    fn id(&self) -> &str {
        "fixed-width-layout"
    }

    fn name(&self) -> &str {
        "Fixed Width Layout"
    }

    fn criterion(&self) -> &str {
        "1.4.10"
    }

    fn description(&self) -> &str {
        "Layout boxes must not be fixed wider than a 320px viewport"
    }

    fn evaluate(&self, scope: &Scope, _config: &EngineConfig) -> Result<Vec<Finding>> {
        let mut findings = Vec::new();
        for node in scope.elements() {
            let Some(style) = node.style() else {
                continue;
            };
            if !node.is_rendered() {
                continue;
            }
            let font_px = style.font_size_px();
            let declared = ["width", "min-width"].into_iter().find_map(|property| {
                let value = style.declared(property)?;
                fixed_width_px(value, font_px).map(|_| format!("{}: {}", property, value))
            });
            let source = declared.or_else(|| width_attribute_px(&node).map(|px| format!("width=\"{}\"", px)));
            let Some(source) = source else {
                continue;
            };
            findings.push(finding_at(
                self,
                &node,
                &format!(
                    "<{}> has a fixed width ({}) wider than the {}px reflow viewport.",
                    node.tag(),
                    source,
                    REFLOW_WIDTH_PX
                ),
            ));
        }
        Ok(findings)
    }
}

/// Element that keeps its text from wrapping
pub struct NonWrappingContainer;

impl Rule for NonWrappingContainer {
    fn id(&self) -> &str {
        "non-wrapping-container"
    }

    fn name(&self) -> &str {
        "Non-wrapping Container"
    }

    fn criterion(&self) -> &str {
        "1.4.10"
    }

    fn description(&self) -> &str {
        "Containers must let their text wrap (no white-space: nowrap or pre)"
    }

    fn evaluate(&self, scope: &Scope, _config: &EngineConfig) -> Result<Vec<Finding>> {
        let mut findings = Vec::new();
        for node in scope.elements() {
            let Some(value) = node.style().and_then(|s| s.declared("white-space")) else {
                continue;
            };
            let value = value.trim().to_ascii_lowercase();
            if !NON_WRAPPING.contains(&value.as_str()) || !node.is_rendered() {
                continue;
            }
            findings.push(finding_at(
                self,
                &node,
                &format!("<{}> prevents text wrapping (white-space: {}).", node.tag(), value),
            ));
        }
        Ok(findings)
    }
}

/// Element positioned out of the flow by its `style` attribute
pub struct AbsolutePositioning;

impl Rule for AbsolutePositioning {
    fn id(&self) -> &str {
        "absolute-positioning"
    }

    fn name(&self) -> &str {
        "Absolute Positioning"
    }

    fn criterion(&self) -> &str {
        "1.4.10"
    }

    fn description(&self) -> &str {
        "Inline position: absolute or fixed keeps content from reflowing"
    }

    fn evaluate(&self, scope: &Scope, _config: &EngineConfig) -> Result<Vec<Finding>> {
        let mut findings = Vec::new();
        for node in scope.elements() {
            let Some(style) = node.attr("style") else {
                continue;
            };
            // last declaration wins
            let Some(position) = parse_declarations(style)
                .into_iter()
                .rev()
                .find(|d| d.property == "position")
                .map(|d| d.value.trim().to_ascii_lowercase())
            else {
                continue;
            };
            if position != "absolute" && position != "fixed" {
                continue;
            }
            findings.push(finding_at(self, &node, &format!("Element uses position: {}.", position)));
        }
        Ok(findings)
    }
}
