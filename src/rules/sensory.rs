// SPDX-License-Identifier: PMPL-1.0-or-later
//! Sensory characteristics rule - WCAG 1.3.3 Sensory Characteristics
//!
//! Instructions must not identify their target only by color, shape or
//! position ("click the red button", "use the menu on the left").

use crate::config::EngineConfig;
use crate::error::Result;
use crate::finding::Finding;
use crate::frames::Scope;
use crate::rules::{finding_at, normalize_text, Rule};
use once_cell::sync::Lazy;
use regex::Regex;

static INSTRUCTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:click|tap|press|select|choose|use|push|touch|hit|activate)\b").expect("valid regex")
});

static COLOR_SHAPE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:red|green|blue|yellow|orange|purple|pink|gr[ae]y|black|white|round|square|circular|triangular|rectangular|star-shaped)\s+(?:button|link|icon|box|circle|square|arrow|shape|tab|key|one)s?\b",
    )
    .expect("valid regex")
});

static POSITION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:button|link|icon|box|menu|sidebar|option|panel|column|arrow)s?\s+(?:on|to|at|in)\s+the\s+(?:left|right|top|bottom)\b|\b(?:left|right)[- ]hand\s+(?:side|column|menu|panel)\b|\b(?:top|bottom)[- ](?:left|right)\s+corner\b",
    )
    .expect("valid regex")
});

/// Quoted control names or explicit labels give a non-sensory fallback
static FALLBACK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)["“”«»]|\b(?:labell?ed|named|titled|marked)\b"#).expect("valid regex")
});

/// Which sensory cue the instruction relies on, if any
pub fn sensory_cue(text: &str) -> Option<&'static str> {
    if !INSTRUCTION_RE.is_match(text) || FALLBACK_RE.is_match(text) {
        return None;
    }
    if COLOR_SHAPE_RE.is_match(text) {
        Some("color or shape")
    } else if POSITION_RE.is_match(text) {
        Some("position")
    } else {
        None
    }
}

/// Instruction relying on a sensory characteristic
pub struct SensoryCharacteristics;

impl Rule for SensoryCharacteristics {
    fn id(&self) -> &str {
        "sensory-characteristics"
    }

    fn name(&self) -> &str {
        "Sensory Characteristics"
    }

    fn criterion(&self) -> &str {
        "1.3.3"
    }

    fn description(&self) -> &str {
        "Instructions must not rely solely on color, shape or position"
    }

    fn evaluate(&self, scope: &Scope, _config: &EngineConfig) -> Result<Vec<Finding>> {
        let mut findings = Vec::new();
        for node in scope.elements() {
            let text = normalize_text(&node.own_text());
            if text.is_empty() || !node.is_rendered() {
                continue;
            }
            if let Some(cue) = sensory_cue(&text) {
                findings.push(finding_at(
                    self,
                    &node,
                    &format!("Instruction identifies its target only by {}: \"{}\".", cue, text),
                ));
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
    fn test_sensory_cue_patterns() {
        assert_eq!(sensory_cue("Click the red button to continue."), Some("color or shape"));
        assert_eq!(sensory_cue("Use the menu on the left to filter."), Some("position"));
        assert_eq!(sensory_cue("Press the round button."), Some("color or shape"));
        assert_eq!(sensory_cue("Click the red button labeled \"Submit\"."), None);
        assert_eq!(sensory_cue("The red button is decorative."), None);
        assert_eq!(sensory_cue("Select your country from the list."), None);
    }

    #[test]
    fn test_instruction_paragraph_flagged() {
        let html = page("<main><p>Click the red button to continue.</p><button>Continue</button></main>");
        let findings = run(&SensoryCharacteristics, &html);
        assert_eq!(locators(&findings), vec!["/html[1]/body[1]/main[1]/p[1]"]);
    }
}
