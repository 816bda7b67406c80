// SPDX-License-Identifier: PMPL-1.0-or-later
//! Style cascade: resolves the declarations that apply to one element
//! into its computed style.

use super::css::{CssRule, Declaration};
use crate::heuristics::{compute_font_size, extract_colors, length::DEFAULT_FONT_PX};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

/// Media features that only match at a larger viewport or zoom level
static ENLARGING_MEDIA_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\bmin-(?:width|height|device-width|device-height|resolution|device-pixel-ratio)\b|(?:^|[\s(])resolution\b|\(\s*(?:width|height)\s*>",
    )
    .expect("valid regex")
});

static NON_SCREEN_MEDIA_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:print|speech)\b").expect("valid regex"));

/// Whether a media condition applies when the viewport grows or the page is zoomed
pub fn is_enlarging_media(media: &str) -> bool {
    ENLARGING_MEDIA_RE.is_match(media) && !NON_SCREEN_MEDIA_RE.is_match(media)
}

/// Properties whose computed value passes from parent to child
pub const INHERITED_PROPERTIES: &[&str] = &[
    "color",
    "font-size",
    "font-weight",
    "font-style",
    "line-height",
    "letter-spacing",
    "word-spacing",
    "visibility",
    "white-space",
    "text-size-adjust",
    "-webkit-text-size-adjust",
];

fn is_inherited(property: &str) -> bool {
    INHERITED_PROPERTIES.contains(&property)
}

/// A declaration from a matching `@media` rule
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalDeclaration {
    pub media: String,
    pub property: String,
    pub value: String,
}

/// Resolved style of one element
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComputedStyle {
    /// Computed values, including inherited ones
    pub computed: BTreeMap<String, String>,
    /// Winning declarations made on the element itself
    pub declared: BTreeMap<String, String>,
    /// Declarations from matching conditional rules, in source order
    pub conditional: Vec<ConditionalDeclaration>,
}

impl ComputedStyle {
    /// Computed value of a property
    pub fn get(&self, property: &str) -> Option<&str> {
        self.computed.get(property).map(String::as_str)
    }

    /// Value declared on the element itself
    pub fn declared(&self, property: &str) -> Option<&str> {
        self.declared.get(property).map(String::as_str)
    }

    /// Computed font size in px
    pub fn font_size_px(&self) -> f64 {
        self.get("font-size")
            .and_then(|v| v.trim_end_matches("px").parse::<f64>().ok())
            .unwrap_or(DEFAULT_FONT_PX)
    }

    /// Conditional values for a property from media that match at a larger
    /// viewport or zoom level
    pub fn enlarged_values<'a>(&'a self, property: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.conditional
            .iter()
            .filter(move |c| c.property == property && is_enlarging_media(&c.media))
            .map(|c| c.value.as_str())
    }

    pub fn is_display_none(&self) -> bool {
        self.get("display").is_some_and(|v| v.eq_ignore_ascii_case("none"))
    }

    pub fn is_visibility_hidden(&self) -> bool {
        self.get("visibility")
            .is_some_and(|v| v.eq_ignore_ascii_case("hidden") || v.eq_ignore_ascii_case("collapse"))
    }
}

/// Sort key: (important, inline, specificity, source order)
type CascadeKey = (bool, bool, (u32, u32, u32), usize);

/// Compute the style of one element.
///
/// `matched` are the unconditional rules whose selector matches the element,
/// `conditional` the matching `@media` rules.
pub fn compute_style(
    matched: &[&CssRule],
    conditional: &[&CssRule],
    inline: Option<&[Declaration]>,
    parent: Option<&ComputedStyle>,
) -> ComputedStyle {
    let mut candidates: Vec<(CascadeKey, &Declaration)> = Vec::new();
    for rule in matched {
        let specificity = rule.specificity();
        for decl in &rule.declarations {
            candidates.push(((decl.important, false, specificity, rule.order), decl));
        }
    }
    if let Some(inline) = inline {
        for (i, decl) in inline.iter().enumerate() {
            candidates.push(((decl.important, true, (0, 0, 0), i), decl));
        }
    }
    candidates.sort_by(|a, b| a.0.cmp(&b.0));

    let mut declared: BTreeMap<String, String> = BTreeMap::new();
    for (_, decl) in candidates {
        let value = decl.value.trim().to_string();
        if decl.property == "background" {
            declared.insert("background-color".to_string(), background_color_of(&value));
        }
        declared.insert(decl.property.clone(), value);
    }

    let parent_font = parent.map(ComputedStyle::font_size_px).unwrap_or(DEFAULT_FONT_PX);
    let mut computed: BTreeMap<String, String> = BTreeMap::new();
    if let Some(parent) = parent {
        for (property, value) in &parent.computed {
            if is_inherited(property) {
                computed.insert(property.clone(), value.clone());
            }
        }
    }

    let mut own: BTreeMap<String, String> = BTreeMap::new();
    for (property, value) in &declared {
        match value.to_ascii_lowercase().as_str() {
            "inherit" => match parent.and_then(|p| p.get(property)) {
                Some(inherited) => {
                    computed.insert(property.clone(), inherited.to_string());
                }
                None => {
                    computed.remove(property);
                }
            },
            "initial" => {
                computed.remove(property);
            }
            "unset" => {
                if !is_inherited(property) {
                    computed.remove(property);
                }
            }
            _ => {
                computed.insert(property.clone(), value.clone());
                own.insert(property.clone(), value.clone());
            }
        }
    }

    let font_px = match computed.get("font-size") {
        Some(value) if own.contains_key("font-size") => compute_font_size(value, parent_font),
        Some(value) => value.trim_end_matches("px").parse::<f64>().ok(),
        None => None,
    };
    match font_px {
        Some(px) => computed.insert("font-size".to_string(), format_px(px)),
        None => computed.remove("font-size"),
    };

    let conditional = conditional
        .iter()
        .flat_map(|rule| {
            let media = rule.media.clone().unwrap_or_default();
            rule.declarations.iter().map(move |d| ConditionalDeclaration {
                media: media.clone(),
                property: d.property.clone(),
                value: d.value.clone(),
            })
        })
        .collect();

    ComputedStyle { computed, declared: own, conditional }
}

/// `background` shorthand resets `background-color`
fn background_color_of(shorthand: &str) -> String {
    if shorthand.to_ascii_lowercase().contains("gradient(") {
        return "transparent".to_string();
    }
    if extract_colors(shorthand).is_empty() {
        "transparent".to_string()
    } else {
        shorthand
            .split_whitespace()
            .rev()
            .find(|token| crate::heuristics::parse_color(token).is_some())
            .map(str::to_string)
            .unwrap_or_else(|| shorthand.to_string())
    }
}

fn format_px(px: f64) -> String {
    let rounded = (px * 1000.0).round() / 1000.0;
    format!("{}px", rounded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::css::{parse_declarations, Stylesheet};

    fn sheet(css: &str) -> Stylesheet {
        let mut sheet = Stylesheet::default();
        sheet.add_source(css, 0, None);
        sheet
    }

    #[test]
    fn test_specificity_and_order() {
        let sheet = sheet("p { color: red } .note { color: blue } p { color: green }");
        let rules: Vec<&CssRule> = sheet.rules.iter().collect();
        let style = compute_style(&rules, &[], None, None);
        assert_eq!(style.get("color"), Some("blue"));
    }

    #[test]
    fn test_inline_and_important() {
        let sheet = sheet("p { color: red !important; background: #fff }");
        let rules: Vec<&CssRule> = sheet.rules.iter().collect();
        let inline = parse_declarations("color: black; background: #000");
        let style = compute_style(&rules, &[], Some(&inline), None);
        assert_eq!(style.get("color"), Some("red"));
        assert_eq!(style.get("background-color"), Some("#000"));
    }

    #[test]
    fn test_inheritance_and_font_size() {
        let parent_decls = parse_declarations("font-size: 20px; color: #333; display: flex");
        let parent = compute_style(&[], &[], Some(&parent_decls), None);
        let child_decls = parse_declarations("font-size: 0.5em");
        let child = compute_style(&[], &[], Some(&child_decls), Some(&parent));
        assert_eq!(child.get("color"), Some("#333"));
        assert_eq!(child.get("display"), None);
        assert_eq!(child.font_size_px(), 10.0);
        assert_eq!(child.declared("font-size"), Some("0.5em"));
    }

    #[test]
    fn test_css_wide_keywords() {
        let parent = compute_style(&[], &[], Some(&parse_declarations("color: navy")), None);
        let child = compute_style(
            &[],
            &[],
            Some(&parse_declarations("color: initial; background-color: inherit")),
            Some(&parent),
        );
        assert_eq!(child.get("color"), None);
        assert_eq!(child.get("background-color"), None);
    }

    #[test]
    fn test_gradient_background_clears_color() {
        let decls = parse_declarations("background: linear-gradient(#fff, #000)");
        let style = compute_style(&[], &[], Some(&decls), None);
        assert_eq!(style.get("background-color"), Some("transparent"));
        assert!(style.get("background").is_some());
    }

    #[test]
    fn test_enlarging_media() {
        assert!(is_enlarging_media("(min-width: 600px)"));
        assert!(is_enlarging_media("screen and (min-resolution: 2dppx)"));
        assert!(is_enlarging_media("(width >= 40em)"));
        assert!(!is_enlarging_media("print"));
        assert!(!is_enlarging_media("print and (min-width: 10cm)"));
        assert!(!is_enlarging_media("(max-width: 600px)"));
        assert!(!is_enlarging_media("(max-resolution: 1dppx)"));
        assert!(!is_enlarging_media("(orientation: landscape)"));
    }

    #[test]
    fn test_enlarged_values_skip_other_media() {
        let mut sheet = Stylesheet::default();
        sheet.add_source(
            "@media print { p { line-height: 2 } } @media (min-width: 40em) { p { line-height: 1.8 } }",
            0,
            None,
        );
        let rules: Vec<&CssRule> = sheet.rules.iter().collect();
        let style = compute_style(&[], &rules, None, None);
        assert_eq!(style.enlarged_values("line-height").collect::<Vec<_>>(), vec!["1.8"]);
    }
}
