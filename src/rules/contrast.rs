// SPDX-License-Identifier: PMPL-1.0-or-later
//! Color contrast rule - WCAG 1.4.3 Contrast (Minimum)
//!
//! Resolves the foreground of each text-bearing element and the background
//! it sits on (walking up to the nearest opaque background, blending
//! translucent layers, worst stop of a gradient) and compares the ratio
//! against the normal or large-text threshold.
//! - 4.5:1 for normal text
//! - 3:1 for large text (24px, or 18.66px bold)

use crate::config::EngineConfig;
use crate::error::Result;
use crate::finding::Finding;
use crate::frames::{NodeRef, Scope};
use crate::heuristics::{blend, contrast_ratio, extract_colors, is_bold, is_large_text, parse_color, Rgba};
use crate::rules::{finding_at, Rule};

/// Gradient or image layer declared on an element, if any
fn image_layer(node: &NodeRef<'_>) -> Option<String> {
    let style = node.style()?;
    ["background-image", "background"]
        .iter()
        .filter_map(|p| style.get(p))
        .map(str::to_ascii_lowercase)
        .find(|v| v.contains("gradient(") || v.contains("url("))
}

/// Candidate backgrounds behind `node`, `None` when undeterminable
pub fn resolve_backgrounds(node: &NodeRef<'_>) -> Option<Vec<Rgba>> {
    let mut layers: Vec<Rgba> = Vec::new();
    let mut base: Vec<Rgba> = vec![Rgba::WHITE];

    for current in std::iter::once(*node).chain(node.ancestors()) {
        if let Some(image) = image_layer(&current) {
            if !image.contains("gradient(") {
                return None;
            }
            let stops = extract_colors(&image);
            if stops.is_empty() {
                return None;
            }
            base = stops.into_iter().map(|stop| blend(stop, Rgba::WHITE)).collect();
            break;
        }
        let Some(value) = current.style().and_then(|s| s.get("background-color")) else {
            continue;
        };
        let color = parse_color(value)?;
        if color.is_transparent() {
            continue;
        }
        if color.is_opaque() {
            base = vec![color];
            break;
        }
        layers.push(color);
    }

    Some(
        base.into_iter()
            .map(|bottom| layers.iter().rev().fold(bottom, |acc, layer| blend(*layer, acc)))
            .collect(),
    )
}

/// Foreground color: computed `color`, black when nothing sets it
fn resolve_foreground(node: &NodeRef<'_>) -> Option<Rgba> {
    match node.style().and_then(|s| s.get("color")) {
        Some(value) => parse_color(value),
        None => Some(Rgba::BLACK),
    }
}

/// Text contrast below the threshold
pub struct InsufficientContrast;

impl Rule for InsufficientContrast {
    fn id(&self) -> &str {
        "insufficient-contrast"
    }

    fn name(&self) -> &str {
        "Insufficient Contrast"
    }

    fn criterion(&self) -> &str {
        "1.4.3"
    }

    fn description(&self) -> &str {
        "Text must contrast with its background by at least 4.5:1 (3:1 for large text)"
    }

    fn evaluate(&self, scope: &Scope, config: &EngineConfig) -> Result<Vec<Finding>> {
        let mut findings = Vec::new();
        for node in scope.elements() {
            if node.own_text().trim().is_empty() || !node.is_rendered() || node.is_hidden() {
                continue;
            }
            let Some(style) = node.style() else {
                continue;
            };
            let Some(fg) = resolve_foreground(&node) else {
                continue;
            };
            let Some(backgrounds) = resolve_backgrounds(&node) else {
                continue;
            };
            let ratio = backgrounds
                .iter()
                .map(|bg| contrast_ratio(blend(fg, *bg), *bg))
                .fold(f64::INFINITY, f64::min);
            if !ratio.is_finite() {
                continue;
            }
            let large = is_large_text(style.font_size_px(), style.get("font-weight").is_some_and(is_bold));
            let threshold = if large {
                config.contrast_threshold_large
            } else {
                config.contrast_threshold_normal
            };
            if ratio < threshold {
                findings.push(finding_at(
                    self,
                    &node,
                    &format!(
                        "Text contrast ratio {:.2}:1 is below the {}:1 minimum for {} text.",
                        ratio,
                        threshold,
                        if large { "large" } else { "normal" }
                    ),
                ));
            }
        }
        Ok(findings)
    }
}
