// SPDX-License-Identifier: PMPL-1.0-or-later
//! Configuration handling for conformancebot
//!
//! The configuration is an explicit value handed to every scan; nothing
//! here is global.

use crate::error::{EngineError, Result};
use crate::heuristics;
use crate::rules::RuleRegistry;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::debug;

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    /// Active rule ids; `None` enables every registered rule
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled_rules: Option<BTreeSet<String>>,

    /// Deepest frame nesting the resolver descends into
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Minimum contrast ratio for normal text
    #[serde(default = "default_contrast_normal")]
    pub contrast_threshold_normal: f64,

    /// Minimum contrast ratio for large or bold text
    #[serde(default = "default_contrast_large")]
    pub contrast_threshold_large: f64,

    /// Pixel font sizes below this are flagged inside fixed-width boxes
    #[serde(default = "default_min_font")]
    pub min_resizable_font_px: f64,

    /// Minimum line-height as a multiple of the font size
    #[serde(default = "default_line_height")]
    pub min_line_height_ratio: f64,

    /// Minimum declared letter-spacing, in em
    #[serde(default = "default_letter_spacing")]
    pub min_letter_spacing_em: f64,

    /// Minimum declared word-spacing, in em
    #[serde(default = "default_word_spacing")]
    pub min_word_spacing_em: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            enabled_rules: None,
            max_depth: default_max_depth(),
            contrast_threshold_normal: default_contrast_normal(),
            contrast_threshold_large: default_contrast_large(),
            min_resizable_font_px: default_min_font(),
            min_line_height_ratio: default_line_height(),
            min_letter_spacing_em: default_letter_spacing(),
            min_word_spacing_em: default_word_spacing(),
        }
    }
}

fn default_max_depth() -> usize {
    16
}

fn default_contrast_normal() -> f64 {
    heuristics::CONTRAST_NORMAL
}

fn default_contrast_large() -> f64 {
    heuristics::CONTRAST_LARGE
}

fn default_min_font() -> f64 {
    heuristics::MIN_RESIZABLE_FONT_PX
}

fn default_line_height() -> f64 {
    heuristics::MIN_LINE_HEIGHT_RATIO
}

fn default_letter_spacing() -> f64 {
    heuristics::MIN_LETTER_SPACING_EM
}

fn default_word_spacing() -> f64 {
    heuristics::MIN_WORD_SPACING_EM
}

impl EngineConfig {
    /// Restrict the scan to the given rule ids
    pub fn with_enabled_rules<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enabled_rules = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    /// Set the frame depth bound
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Whether a rule id is active under this configuration
    pub fn is_enabled(&self, rule_id: &str) -> bool {
        match self.enabled_rules {
            Some(ref ids) => ids.contains(rule_id),
            None => true,
        }
    }

    /// Reject unknown rule ids, a zero depth bound and non-positive thresholds
    pub fn validate(&self, registry: &RuleRegistry) -> Result<()> {
        if let Some(ref ids) = self.enabled_rules {
            if let Some(unknown) = ids.iter().find(|id| registry.find(id).is_none()) {
                return Err(EngineError::UnknownRule(unknown.clone()));
            }
        }
        if self.max_depth == 0 {
            return Err(EngineError::Config("maxDepth must be at least 1".to_string()));
        }
        let thresholds = [
            ("contrastThresholdNormal", self.contrast_threshold_normal),
            ("contrastThresholdLarge", self.contrast_threshold_large),
            ("minResizableFontPx", self.min_resizable_font_px),
            ("minLineHeightRatio", self.min_line_height_ratio),
            ("minLetterSpacingEm", self.min_letter_spacing_em),
            ("minWordSpacingEm", self.min_word_spacing_em),
        ];
        for (name, value) in thresholds {
            if !(value.is_finite() && value > 0.0) {
                return Err(EngineError::Config(format!("{} must be positive, got {}", name, value)));
            }
        }
        Ok(())
    }
}

/// Load configuration from a path. A missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<EngineConfig> {
    if !path.exists() {
        debug!("Config file not found at {}, using defaults", path.display());
        return Ok(EngineConfig::default());
    }

    let content = std::fs::read_to_string(path)?;

    let config: EngineConfig = match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => toml::from_str(&content)?,
        Some("json") => serde_json::from_str(&content)?,
        _ => serde_yaml::from_str(&content)?,
    };

    debug!(?config, "Loaded configuration");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.max_depth, 16);
        assert_eq!(config.contrast_threshold_normal, 4.5);
        assert_eq!(config.contrast_threshold_large, 3.0);
        assert!(config.is_enabled("missing-label"));
        assert!(config.validate(&RuleRegistry::standard()).is_ok());
    }

    #[test]
    fn test_camel_case_keys() {
        let json = r#"{"enabledRules": ["focus-visible"], "maxDepth": 3}"#;
        let config: EngineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.max_depth, 3);
        assert!(config.is_enabled("focus-visible"));
        assert!(!config.is_enabled("missing-label"));
        assert_eq!(config.contrast_threshold_normal, 4.5);
    }

    #[test]
    fn test_validate_rejects_unknown_rule() {
        let config = EngineConfig::default().with_enabled_rules(["no-such-rule"]);
        let err = config.validate(&RuleRegistry::standard()).unwrap_err();
        assert!(matches!(err, EngineError::UnknownRule(id) if id == "no-such-rule"));
    }

    #[test]
    fn test_validate_rejects_bad_bounds() {
        let registry = RuleRegistry::standard();
        assert!(EngineConfig::default().with_max_depth(0).validate(&registry).is_err());
        let config = EngineConfig {
            contrast_threshold_normal: -1.0,
            ..EngineConfig::default()
        };
        assert!(config.validate(&registry).is_err());
        let config = EngineConfig {
            min_word_spacing_em: 0.0,
            ..EngineConfig::default()
        };
        assert!(config.validate(&registry).is_err());
    }

    #[test]
    fn test_load_config_formats() {
        let dir = TempDir::new().unwrap();

        let missing = load_config(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(missing, EngineConfig::default());

        let toml_path = dir.path().join("conformance.toml");
        std::fs::write(&toml_path, "maxDepth = 4\nenabledRules = [\"duplicate-id\"]\n").unwrap();
        let config = load_config(&toml_path).unwrap();
        assert_eq!(config.max_depth, 4);
        assert!(config.is_enabled("duplicate-id"));

        let yaml_path = dir.path().join("conformance.yml");
        std::fs::write(&yaml_path, "contrastThresholdNormal: 7.0\nminLetterSpacingEm: 0.1\n").unwrap();
        let config = load_config(&yaml_path).unwrap();
        assert_eq!(config.contrast_threshold_normal, 7.0);
        assert_eq!(config.min_letter_spacing_em, 0.1);
        assert_eq!(config.min_word_spacing_em, 0.16);
        assert!(config.enabled_rules.is_none());
    }
}
