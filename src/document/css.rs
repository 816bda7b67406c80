// SPDX-License-Identifier: PMPL-1.0-or-later
//! Minimal stylesheet parser for `<style>` contents and inline `style`
//! attributes.
//!
//! Only what the cascade needs is kept: selectors (one per rule, comma
//! groups are split), declarations with their `!important` flag, and the
//! `@media` condition a rule sits under. Other at-rules are skipped.

use super::NodeId;
use once_cell::sync::Lazy;
use regex::Regex;

/// `@media` blocks nested deeper than this are ignored.
const MAX_MEDIA_NESTING: usize = 8;

static COMMENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)/\*.*?\*/").expect("valid regex"));

/// One `property: value` pair
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub property: String,
    pub value: String,
    pub important: bool,
}

/// A style rule with a single selector
#[derive(Debug, Clone, PartialEq)]
pub struct CssRule {
    pub selector: String,
    pub declarations: Vec<Declaration>,
    /// Enclosing `@media` condition, if any
    pub media: Option<String>,
    /// The `<style>` element the rule came from
    pub origin: NodeId,
    /// Source order across the whole document
    pub order: usize,
}

impl CssRule {
    /// Last declared value for a property in this rule
    pub fn value(&self, property: &str) -> Option<&str> {
        self.declarations
            .iter()
            .rev()
            .find(|d| d.property == property)
            .map(|d| d.value.as_str())
    }

    /// Whether the rule declares the property at all
    pub fn declares(&self, property: &str) -> bool {
        self.declarations.iter().any(|d| d.property == property)
    }

    /// Selector specificity as (ids, classes/attributes/pseudo-classes, types)
    pub fn specificity(&self) -> (u32, u32, u32) {
        specificity(&self.selector)
    }
}

/// All rules of a document, in source order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stylesheet {
    pub rules: Vec<CssRule>,
}

impl Stylesheet {
    /// Append the rules of one stylesheet text
    pub fn add_source(&mut self, css: &str, origin: NodeId, media: Option<String>) {
        let css = COMMENT_RE.replace_all(css, " ");
        let mut order = self.rules.len();
        parse_block(&css, origin, media, 0, &mut order, &mut self.rules);
    }

    /// Rules with the given selector text
    pub fn rules_for_selector<'a>(&'a self, selector: &'a str) -> impl Iterator<Item = &'a CssRule> + 'a {
        self.rules.iter().filter(move |r| r.selector == selector)
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Index of the `}` matching the `{` at `open`, or the end of input.
fn matching_brace(text: &str, open: usize) -> usize {
    let mut depth = 0usize;
    for (i, ch) in text[open..].char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return open + i;
                }
            }
            _ => {}
        }
    }
    text.len()
}

fn parse_block(
    text: &str,
    origin: NodeId,
    media: Option<String>,
    nesting: usize,
    order: &mut usize,
    out: &mut Vec<CssRule>,
) {
    let mut pos = 0;
    while pos < text.len() {
        let rest = &text[pos..];
        let Some(open_rel) = rest.find(['{', ';']) else {
            break;
        };
        let prelude = rest[..open_rel].trim();
        if rest[open_rel..].starts_with(';') {
            // statement at-rules such as @import and @charset
            pos += open_rel + 1;
            continue;
        }
        let open = pos + open_rel;
        let close = matching_brace(text, open);
        let body = &text[(open + 1).min(close)..close];
        pos = (close + 1).min(text.len());

        if let Some(condition) = prelude.strip_prefix("@media") {
            if nesting < MAX_MEDIA_NESTING {
                let condition = condition.trim().to_string();
                let combined = match media {
                    Some(ref outer) => format!("{} and {}", outer, condition),
                    None => condition,
                };
                parse_block(body, origin, Some(combined), nesting + 1, order, out);
            }
            continue;
        }
        if prelude.starts_with('@') || prelude.is_empty() {
            continue;
        }

        let declarations = parse_declarations(body);
        for selector in split_top_level(prelude, ',') {
            let selector = selector.trim();
            if selector.is_empty() {
                continue;
            }
            out.push(CssRule {
                selector: selector.to_string(),
                declarations: declarations.clone(),
                media: media.clone(),
                origin,
                order: *order,
            });
            *order += 1;
        }
    }
}

/// Split on `sep` outside parentheses and brackets
fn split_top_level(text: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, ch) in text.char_indices() {
        match ch {
            '(' | '[' => depth += 1,
            ')' | ']' => depth -= 1,
            c if c == sep && depth <= 0 => {
                parts.push(&text[start..i]);
                start = i + ch.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

/// Parse a declaration list (a rule body or a `style` attribute)
pub fn parse_declarations(body: &str) -> Vec<Declaration> {
    split_top_level(body, ';')
        .into_iter()
        .filter_map(|decl| {
            let (property, value) = decl.split_once(':')?;
            let property = property.trim().to_ascii_lowercase();
            let mut value = value.trim().to_string();
            if property.is_empty() || value.is_empty() {
                return None;
            }
            let important = match value.to_ascii_lowercase().rfind("!important") {
                Some(idx) => {
                    value.truncate(idx);
                    value = value.trim().to_string();
                    true
                }
                None => false,
            };
            Some(Declaration { property, value, important })
        })
        .collect()
}

fn skip_ident(chars: &[char], mut i: usize) -> usize {
    while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '-' || chars[i] == '_') {
        i += 1;
    }
    i
}

fn skip_parens(chars: &[char], mut i: usize) -> usize {
    if i >= chars.len() || chars[i] != '(' {
        return i;
    }
    let mut depth = 0;
    while i < chars.len() {
        match chars[i] {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return i + 1;
                }
            }
            _ => {}
        }
        i += 1;
    }
    i
}

/// Approximate selector specificity from the selector text
pub fn specificity(selector: &str) -> (u32, u32, u32) {
    let chars: Vec<char> = selector.chars().collect();
    let (mut ids, mut classes, mut types) = (0, 0, 0);
    let mut compound_start = true;
    let mut i = 0;
    while i < chars.len() {
        let ch = chars[i];
        match ch {
            '#' => {
                ids += 1;
                i = skip_ident(&chars, i + 1);
            }
            '.' => {
                classes += 1;
                i = skip_ident(&chars, i + 1);
            }
            '[' => {
                classes += 1;
                while i < chars.len() && chars[i] != ']' {
                    i += 1;
                }
                i += 1;
            }
            ':' if chars.get(i + 1) == Some(&':') => {
                types += 1;
                i = skip_parens(&chars, skip_ident(&chars, i + 2));
            }
            ':' => {
                classes += 1;
                i = skip_parens(&chars, skip_ident(&chars, i + 1));
            }
            ' ' | '>' | '+' | '~' => {
                compound_start = true;
                i += 1;
                continue;
            }
            c if c.is_alphabetic() && compound_start => {
                types += 1;
                i = skip_ident(&chars, i);
            }
            _ => i += 1,
        }
        compound_start = false;
    }
    (ids, classes, types)
}
