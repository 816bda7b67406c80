// SPDX-License-Identifier: PMPL-1.0-or-later
//! Rule checks implementing WCAG-style conformance criteria.
//!
//! Each rule is a stateless unit struct behind the [`Rule`] trait. The set
//! of built-in rules is closed and enumerated by [`RuleId`]; the registry
//! holds the boxed rules and dispatch only ever goes through the trait.

pub mod aria;
pub mod contrast;
pub mod events;
pub mod focus;
pub mod forms;
pub mod frames;
pub mod headings;
pub mod ids;
pub mod images;
pub mod names;
pub mod navigation;
pub mod orientation;
pub mod page;
pub mod reflow;
pub mod sensory;
pub mod tables;
pub mod text;

use crate::config::EngineConfig;
use crate::error::Result;
use crate::finding::{Finding, Severity};
use crate::frames::{NodeRef, Scope};

/// Trait implemented by all rules
pub trait Rule: Send + Sync {
    /// Stable identifier, used as the report `id`
    fn id(&self) -> &str;

    /// Human-readable name
    fn name(&self) -> &str;

    /// WCAG success criterion reference
    fn criterion(&self) -> &str;

    /// Short description of what this rule checks
    fn description(&self) -> &str;

    /// Inspect one scope. Must not depend on other rules or on call order.
    fn evaluate(&self, scope: &Scope, config: &EngineConfig) -> Result<Vec<Finding>>;
}

/// The closed set of built-in rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RuleId {
    MissingLabel,
    OrphanedFormLabel,
    NavigationStructure,
    HiddenNavigation,
    FocusVisible,
    InsufficientContrast,
    OrientationLock,
    TextResize,
    TextSpacing,
    MissingIframeTitle,
    MissingTableHeaders,
    ImagesOfText,
    MissingAltText,
    DeviceDependentEventHandler,
    SensoryCharacteristics,
    DuplicateId,
    MissingPageTitle,
    MissingDocumentLanguage,
    MissingSkipLink,
    EmptyHeading,
    MissingHeadingStructure,
    UnlabeledButton,
    MissingLinkText,
    MissingFieldsetLegend,
    HiddenFocusable,
    InvalidAriaRole,
    FixedWidthLayout,
    NonWrappingContainer,
    AbsolutePositioning,
}

impl RuleId {
    pub const ALL: [RuleId; 29] = [
        RuleId::MissingLabel,
        RuleId::OrphanedFormLabel,
        RuleId::NavigationStructure,
        RuleId::HiddenNavigation,
        RuleId::FocusVisible,
        RuleId::InsufficientContrast,
        RuleId::OrientationLock,
        RuleId::TextResize,
        RuleId::TextSpacing,
        RuleId::MissingIframeTitle,
        RuleId::MissingTableHeaders,
        RuleId::ImagesOfText,
        RuleId::MissingAltText,
        RuleId::DeviceDependentEventHandler,
        RuleId::SensoryCharacteristics,
        RuleId::DuplicateId,
        RuleId::MissingPageTitle,
        RuleId::MissingDocumentLanguage,
        RuleId::MissingSkipLink,
        RuleId::EmptyHeading,
        RuleId::MissingHeadingStructure,
        RuleId::UnlabeledButton,
        RuleId::MissingLinkText,
        RuleId::MissingFieldsetLegend,
        RuleId::HiddenFocusable,
        RuleId::InvalidAriaRole,
        RuleId::FixedWidthLayout,
        RuleId::NonWrappingContainer,
        RuleId::AbsolutePositioning,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RuleId::MissingLabel => "missing-label",
            RuleId::OrphanedFormLabel => "orphaned-form-label",
            RuleId::NavigationStructure => "navigation-structure",
            RuleId::HiddenNavigation => "hidden-navigation",
            RuleId::FocusVisible => "focus-visible",
            RuleId::InsufficientContrast => "insufficient-contrast",
            RuleId::OrientationLock => "orientation-lock",
            RuleId::TextResize => "text-resize",
            RuleId::TextSpacing => "text-spacing",
            RuleId::MissingIframeTitle => "missing-iframe-title",
            RuleId::MissingTableHeaders => "missing-table-headers",
            RuleId::ImagesOfText => "images-of-text",
            RuleId::MissingAltText => "missing-alt-text",
            RuleId::DeviceDependentEventHandler => "device-dependent-event-handler",
            RuleId::SensoryCharacteristics => "sensory-characteristics",
            RuleId::DuplicateId => "duplicate-id",
            RuleId::MissingPageTitle => "missing-page-title",
            RuleId::MissingDocumentLanguage => "missing-document-language",
            RuleId::MissingSkipLink => "missing-skip-link",
            RuleId::EmptyHeading => "empty-heading",
            RuleId::MissingHeadingStructure => "missing-heading-structure",
            RuleId::UnlabeledButton => "unlabeled-button",
            RuleId::MissingLinkText => "missing-link-text",
            RuleId::MissingFieldsetLegend => "missing-fieldset-legend",
            RuleId::HiddenFocusable => "hidden-focusable",
            RuleId::InvalidAriaRole => "invalid-aria-role",
            RuleId::FixedWidthLayout => "fixed-width-layout",
            RuleId::NonWrappingContainer => "non-wrapping-container",
            RuleId::AbsolutePositioning => "absolute-positioning",
        }
    }

    pub fn parse(id: &str) -> Option<RuleId> {
        RuleId::ALL.into_iter().find(|r| r.as_str() == id)
    }

    /// The rule implementation for this id
    pub fn rule(self) -> Box<dyn Rule> {
        match self {
            RuleId::MissingLabel => Box::new(forms::MissingLabel),
            RuleId::OrphanedFormLabel => Box::new(forms::OrphanedFormLabel),
            RuleId::NavigationStructure => Box::new(navigation::NavigationStructure),
            RuleId::HiddenNavigation => Box::new(navigation::HiddenNavigation),
            RuleId::FocusVisible => Box::new(focus::FocusVisible),
            RuleId::InsufficientContrast => Box::new(contrast::InsufficientContrast),
            RuleId::OrientationLock => Box::new(orientation::OrientationLock),
            RuleId::TextResize => Box::new(text::TextResize),
            RuleId::TextSpacing => Box::new(text::TextSpacing),
            RuleId::MissingIframeTitle => Box::new(frames::MissingIframeTitle),
            RuleId::MissingTableHeaders => Box::new(tables::MissingTableHeaders),
            RuleId::ImagesOfText => Box::new(images::ImagesOfText),
            RuleId::MissingAltText => Box::new(images::MissingAltText),
            RuleId::DeviceDependentEventHandler => Box::new(events::DeviceDependentEventHandler),
            RuleId::SensoryCharacteristics => Box::new(sensory::SensoryCharacteristics),
            RuleId::DuplicateId => Box::new(ids::DuplicateId),
            RuleId::MissingPageTitle => Box::new(page::MissingPageTitle),
            RuleId::MissingDocumentLanguage => Box::new(page::MissingDocumentLanguage),
            RuleId::MissingSkipLink => Box::new(page::MissingSkipLink),
            RuleId::EmptyHeading => Box::new(headings::EmptyHeading),
            RuleId::MissingHeadingStructure => Box::new(headings::MissingHeadingStructure),
            RuleId::UnlabeledButton => Box::new(names::UnlabeledButton),
            RuleId::MissingLinkText => Box::new(names::MissingLinkText),
            RuleId::MissingFieldsetLegend => Box::new(forms::MissingFieldsetLegend),
            RuleId::HiddenFocusable => Box::new(focus::HiddenFocusable),
            RuleId::InvalidAriaRole => Box::new(aria::InvalidAriaRole),
            RuleId::FixedWidthLayout => Box::new(reflow::FixedWidthLayout),
            RuleId::NonWrappingContainer => Box::new(reflow::NonWrappingContainer),
            RuleId::AbsolutePositioning => Box::new(reflow::AbsolutePositioning),
        }
    }
}

impl std::fmt::Display for RuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Holds the rules available to dispatch
pub struct RuleRegistry {
    rules: Vec<Box<dyn Rule>>,
}

impl RuleRegistry {
    /// Registry without any rules
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Registry with every built-in rule
    pub fn standard() -> Self {
        Self {
            rules: RuleId::ALL.into_iter().map(RuleId::rule).collect(),
        }
    }

    /// Add a rule. A rule with the same id replaces the earlier one.
    pub fn register(&mut self, rule: Box<dyn Rule>) {
        self.rules.retain(|r| r.id() != rule.id());
        self.rules.push(rule);
    }

    pub fn find(&self, id: &str) -> Option<&dyn Rule> {
        self.rules.iter().find(|r| r.id() == id).map(|r| r.as_ref())
    }

    /// Rules active under the configuration, in registration order
    pub fn enabled<'a>(&'a self, config: &'a EngineConfig) -> impl Iterator<Item = &'a dyn Rule> + 'a {
        self.rules
            .iter()
            .map(|r| r.as_ref())
            .filter(move |r| config.is_enabled(r.id()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Rule> {
        self.rules.iter().map(|r| r.as_ref())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

/// Finding for `rule` located at `node` in its scope
pub(crate) fn finding_at(rule: &dyn Rule, node: &NodeRef<'_>, message: &str) -> Finding {
    Finding::new(rule.id(), Severity::Fail, message)
        .with_locator(node.locator())
        .with_scope_path(node.scope.path.clone())
}

/// Interactive form controls that need an accessible name
pub(crate) fn is_form_control(node: &NodeRef<'_>) -> bool {
    match node.tag() {
        "select" | "textarea" => true,
        "input" => !matches!(
            node.attr("type").map(|t| t.trim().to_ascii_lowercase()).as_deref(),
            Some("hidden" | "submit" | "reset" | "button" | "image")
        ),
        _ => false,
    }
}

/// Reachable with the Tab key
pub(crate) fn is_focusable(node: &NodeRef<'_>) -> bool {
    let tag = node.tag();
    if node.has_attr("disabled") && matches!(tag, "button" | "input" | "select" | "textarea") {
        return false;
    }
    if let Some(tabindex) = node.attr("tabindex").and_then(|t| t.trim().parse::<i32>().ok()) {
        return tabindex >= 0;
    }
    match tag {
        "a" | "area" => node.non_empty_attr("href").is_some(),
        "input" => !node.attr("type").is_some_and(|t| t.trim().eq_ignore_ascii_case("hidden")),
        "button" | "select" | "textarea" | "summary" => true,
        _ => false,
    }
}

/// Named through aria-label, a resolvable aria-labelledby, `label[for]` or
/// a wrapping label
pub(crate) fn has_label_association(scope: &Scope, node: &NodeRef<'_>) -> bool {
    if node.non_empty_attr("aria-label").is_some() {
        return true;
    }
    if let Some(ids) = node.attr("aria-labelledby") {
        if ids.split_whitespace().any(|id| scope.element_by_id(id).is_some()) {
            return true;
        }
    }
    if let Some(id) = node.non_empty_attr("id") {
        if scope.by_tag("label").any(|l| l.attr("for").map(str::trim) == Some(id)) {
            return true;
        }
    }
    node.ancestors().any(|a| a.tag() == "label")
}

/// Some descendant image carries non-empty alt text
pub(crate) fn has_image_alt(node: &NodeRef<'_>) -> bool {
    node.descendants()
        .any(|d| d.tag() == "img" && d.non_empty_attr("alt").is_some())
}

/// Top-level, complete document; page-level rules skip frames and fragments
pub(crate) fn is_page(scope: &Scope) -> bool {
    !scope.is_fragment() && scope.depth() == 0
}

/// Where page-level findings without a specific element go
pub(crate) fn page_anchor(scope: &Scope) -> NodeRef<'_> {
    scope.by_tag("body").next().unwrap_or_else(|| scope.root())
}

/// `role` attribute says the element is presentational
pub(crate) fn is_presentational(node: &NodeRef<'_>) -> bool {
    node.attr("role")
        .is_some_and(|r| matches!(r.trim().to_ascii_lowercase().as_str(), "presentation" | "none"))
}

/// Collapse runs of whitespace
pub(crate) fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
pub(crate) mod testutil {
    use crate::config::EngineConfig;
    use crate::document::Document;
    use crate::finding::{Finding, ScopePath};
    use crate::frames::Scope;
    use crate::rules::Rule;

    /// Evaluate a rule against the main scope of `markup`
    pub fn run(rule: &dyn Rule, markup: &str) -> Vec<Finding> {
        let scope = Scope::new(ScopePath::main(), Document::parse(markup));
        rule.evaluate(&scope, &EngineConfig::default()).expect("rule evaluates")
    }

    /// Wrap body content in a complete page
    pub fn page(body: &str) -> String {
        format!(
            "<!DOCTYPE html><html lang=\"en\"><head><title>t</title></head><body>{}</body></html>",
            body
        )
    }

    /// Complete page with a stylesheet
    pub fn styled_page(css: &str, body: &str) -> String {
        format!(
            "<!DOCTYPE html><html lang=\"en\"><head><title>t</title><style>{}</style></head><body>{}</body></html>",
            css, body
        )
    }

    pub fn locators(findings: &[Finding]) -> Vec<String> {
        findings.iter().map(|f| f.locator.to_string()).collect()
    }
}
