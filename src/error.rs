// SPDX-License-Identifier: PMPL-1.0-or-later
//! Error types for conformancebot

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the rule evaluation engine
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown rule id: {0}")]
    UnknownRule(String),

    #[error("Invalid expectations in {}: {reason}", path.display())]
    Expectations { path: PathBuf, reason: String },

    #[error("Rule {rule} failed: {reason}")]
    Rule { rule: String, reason: String },
}

pub type Result<T> = std::result::Result<T, EngineError>;
