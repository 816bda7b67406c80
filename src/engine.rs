// SPDX-License-Identifier: PMPL-1.0-or-later
//! Rule dispatch.
//!
//! Every enabled rule runs against every resolved scope. Pairs are evaluated
//! in parallel with rayon and collected back in pair order; the aggregator
//! then fixes the final ordering. A rule that returns an error or panics is
//! contained at this boundary and reported as `rule-evaluation-error`.

use crate::config::EngineConfig;
use crate::document::{Document, DocumentProvider, HtmlProvider};
use crate::error::Result;
use crate::finding::{Finding, Locator, Severity, RULE_EVALUATION_ERROR};
use crate::frames::{self, ResolvedScopes, Scope};
use crate::report::{Aggregator, Report};
use crate::rules::{Rule, RuleRegistry};
use rayon::prelude::*;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{debug, info, warn};

/// Rule evaluation engine: a registry plus a document provider
pub struct Engine {
    registry: RuleRegistry,
    provider: Box<dyn DocumentProvider>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Engine with every built-in rule and the HTML provider
    pub fn new() -> Self {
        Self {
            registry: RuleRegistry::standard(),
            provider: Box::new(HtmlProvider::new()),
        }
    }

    pub fn with_registry(mut self, registry: RuleRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_provider(mut self, provider: Box<dyn DocumentProvider>) -> Self {
        self.provider = provider;
        self
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// Parse and evaluate markup
    pub fn scan(&self, markup: &str, config: &EngineConfig) -> Result<Report> {
        config.validate(&self.registry)?;
        let document = self.provider.parse_document(markup);
        Ok(self.evaluate_document(document, config))
    }

    /// Evaluate an already parsed document. The configuration is assumed valid.
    pub fn evaluate_document(&self, document: Document, config: &EngineConfig) -> Report {
        let resolved = frames::resolve(document, self.provider.as_ref(), config.max_depth);
        debug!(
            scopes = resolved.scopes.len(),
            truncated = resolved.truncated,
            "Resolved frame scopes"
        );
        evaluate_scopes(resolved, &self.registry, config)
    }
}

/// Dispatch every enabled rule over every scope and aggregate the results
pub fn evaluate_scopes(resolved: ResolvedScopes, registry: &RuleRegistry, config: &EngineConfig) -> Report {
    let rules: Vec<&dyn Rule> = registry.enabled(config).collect();
    let pairs: Vec<(&Scope, &dyn Rule)> = resolved
        .scopes
        .iter()
        .flat_map(|scope| rules.iter().map(move |rule| (scope, *rule)))
        .collect();

    let results: Vec<Vec<Finding>> = pairs
        .par_iter()
        .map(|(scope, rule)| run_rule(*rule, scope, config))
        .collect();

    let mut aggregator = Aggregator::new();
    aggregator.extend(resolved.findings);
    for findings in results {
        aggregator.extend(findings);
    }
    if resolved.truncated {
        aggregator.mark_truncated();
    }
    let report = aggregator.finish();
    info!(
        findings = report.len(),
        rules = rules.len(),
        scopes = resolved.scopes.len(),
        "Evaluation complete"
    );
    report
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Evaluate one rule on one scope, turning errors and panics into a finding
fn run_rule(rule: &dyn Rule, scope: &Scope, config: &EngineConfig) -> Vec<Finding> {
    let outcome = catch_unwind(AssertUnwindSafe(|| rule.evaluate(scope, config)));
    let reason = match outcome {
        Ok(Ok(findings)) => return findings,
        Ok(Err(e)) => e.to_string(),
        Err(payload) => format!("panicked: {}", panic_message(payload.as_ref())),
    };
    warn!(rule = rule.id(), path = %scope.path, %reason, "Rule evaluation failed");
    vec![Finding::new(
        RULE_EVALUATION_ERROR,
        Severity::Fail,
        &format!("Rule {} failed to evaluate: {}", rule.id(), reason),
    )
    .with_locator(Locator::root().with_detail(rule.id()))
    .with_scope_path(scope.path.clone())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;

    struct FailingRule;

    impl Rule for FailingRule {
        fn id(&self) -> &str {
            "always-fails"
        }
        fn name(&self) -> &str {
            "Always Fails"
        }
        fn criterion(&self) -> &str {
            "0.0.0"
        }
        fn description(&self) -> &str {
            "Returns an error for every scope"
        }
        fn evaluate(&self, _scope: &Scope, _config: &EngineConfig) -> Result<Vec<Finding>> {
            Err(EngineError::Rule {
                rule: self.id().to_string(),
                reason: "boom".to_string(),
            })
        }
    }

    #[test]
    fn test_scan_clean_document() {
        let markup = r##"<!DOCTYPE html><html lang="en"><head><title>x</title></head>
            <body><a href="#main">Skip to content</a><nav><a href="/">Home</a></nav>
            <main id="main"><h1>Hi</h1></main></body></html>"##;
        let report = Engine::new().scan(markup, &EngineConfig::default()).unwrap();
        assert!(report.is_empty(), "unexpected findings: {:?}", report.rules);
        assert!(!report.truncated);
    }

    #[test]
    fn test_rule_error_becomes_finding() {
        let mut registry = RuleRegistry::empty();
        registry.register(Box::new(FailingRule));
        let engine = Engine::new().with_registry(registry);
        let report = engine.scan("<p>x</p>", &EngineConfig::default()).unwrap();
        assert_eq!(report.len(), 1);
        let finding = &report.rules[0];
        assert_eq!(finding.rule_id, RULE_EVALUATION_ERROR);
        assert_eq!(finding.locator.to_string(), "/|always-fails");
        assert!(finding.message.contains("always-fails"));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = EngineConfig::default().with_enabled_rules(["not-a-rule"]);
        assert!(Engine::new().scan("<p>x</p>", &config).is_err());
    }
}
