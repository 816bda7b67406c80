// SPDX-License-Identifier: PMPL-1.0-or-later
//! Iframe Resolver and the scope model.
//!
//! The resolver expands a document into the main scope plus one scope per
//! reachable frame, depth-first in document order. Descent uses an explicit
//! work stack bounded by `maxDepth`; hitting the bound marks the result
//! truncated and never recurses further.

use crate::document::{ComputedStyle, Document, DocumentProvider, Element, FrameContent, NodeId, ROOT};
use crate::finding::{Finding, Locator, ScopePath, Severity, UNPARSEABLE_FRAME};
use tracing::{debug, warn};

/// Tags that never render text
const NON_RENDERED: &[&str] = &["head", "style", "script", "title", "meta", "link", "template", "noscript"];

/// Frame-bearing tags
const FRAME_TAGS: &[&str] = &["iframe", "frame"];

/// One traversable subtree: the main document or one frame's content
#[derive(Debug, Clone)]
pub struct Scope {
    pub path: ScopePath,
    pub document: Document,
}

impl Scope {
    pub fn new(path: ScopePath, document: Document) -> Self {
        Self { path, document }
    }

    /// Nesting depth (length of the path)
    pub fn depth(&self) -> usize {
        self.path.depth()
    }

    pub fn is_fragment(&self) -> bool {
        self.document.fragment
    }

    /// Document root
    pub fn root(&self) -> NodeRef<'_> {
        self.node(ROOT)
    }

    pub fn node(&self, id: NodeId) -> NodeRef<'_> {
        NodeRef { scope: self, id }
    }

    /// Every element in document order
    pub fn elements(&self) -> impl Iterator<Item = NodeRef<'_>> + '_ {
        (0..self.document.len())
            .filter(|&id| self.document.element(id).is_some())
            .map(move |id| self.node(id))
    }

    /// Elements with the given tag, in document order
    pub fn by_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        self.elements().filter(move |n| n.tag() == tag)
    }

    /// First element carrying the id
    pub fn element_by_id(&self, id: &str) -> Option<NodeRef<'_>> {
        self.elements().find(|n| n.attr("id") == Some(id))
    }

    /// Frame elements in document order; their position is the frame ordinal
    pub fn frames(&self) -> impl Iterator<Item = NodeRef<'_>> + '_ {
        self.elements().filter(|n| FRAME_TAGS.contains(&n.tag()))
    }
}

/// A node together with the scope that owns it
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    pub scope: &'a Scope,
    pub id: NodeId,
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.scope, other.scope) && self.id == other.id
    }
}

impl<'a> NodeRef<'a> {
    fn doc(&self) -> &'a Document {
        &self.scope.document
    }

    pub fn element(&self) -> Option<&'a Element> {
        self.doc().element(self.id)
    }

    pub fn is_element(&self) -> bool {
        self.element().is_some()
    }

    /// Tag name, empty for text and the root
    pub fn tag(&self) -> &'a str {
        self.element().map(|e| e.tag.as_str()).unwrap_or("")
    }

    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.element().and_then(|e| e.attr(name))
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Attribute value, trimmed, `None` when absent or blank
    pub fn non_empty_attr(&self, name: &str) -> Option<&'a str> {
        self.attr(name).map(str::trim).filter(|v| !v.is_empty())
    }

    pub fn style(&self) -> Option<&'a ComputedStyle> {
        self.element().map(|e| &e.style)
    }

    pub fn parent(&self) -> Option<NodeRef<'a>> {
        let scope = self.scope;
        self.doc().node(self.id).parent.map(|id| scope.node(id))
    }

    /// Child nodes (elements and text)
    pub fn children(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let scope = self.scope;
        scope.document.node(self.id).children.iter().map(move |&id| scope.node(id))
    }

    pub fn element_children(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        self.children().filter(NodeRef::is_element)
    }

    /// Element ancestors, nearest first
    pub fn ancestors(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        std::iter::successors(self.parent(), |n| n.parent()).filter(NodeRef::is_element)
    }

    /// Descendant elements in document order
    pub fn descendants(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let scope = self.scope;
        let end = scope.document.node(self.id).subtree_end;
        (self.id + 1..end)
            .filter(move |&id| scope.document.element(id).is_some())
            .map(move |id| scope.node(id))
    }

    /// Nearest element ancestor-or-self with the tag
    pub fn closest(&self, tag: &str) -> Option<NodeRef<'a>> {
        if self.tag() == tag {
            return Some(*self);
        }
        self.ancestors().find(|n| n.tag() == tag)
    }

    /// All descendant text
    pub fn text_content(&self) -> String {
        self.doc().text_content(self.id)
    }

    /// Text of direct text children only
    pub fn own_text(&self) -> String {
        self.doc()
            .node(self.id)
            .children
            .iter()
            .filter_map(|&id| self.doc().node(id).text())
            .collect()
    }

    /// Whether the element can render text at all
    pub fn is_rendered(&self) -> bool {
        !NON_RENDERED.contains(&self.tag()) && !self.ancestors().any(|a| NON_RENDERED.contains(&a.tag()))
    }

    /// Hidden by `hidden`, `aria-hidden`, `display: none` or
    /// `visibility: hidden`, on the element or any ancestor
    pub fn is_hidden(&self) -> bool {
        if self.style().is_some_and(ComputedStyle::is_visibility_hidden) {
            return true;
        }
        std::iter::once(*self).chain(self.ancestors()).any(|n| {
            n.has_attr("hidden")
                || n.attr("aria-hidden").is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
                || n.style().is_some_and(ComputedStyle::is_display_none)
        })
    }

    /// Position among same-tag element siblings, 1-based
    fn sibling_index(&self) -> usize {
        let tag = self.tag();
        match self.parent() {
            Some(parent) => {
                1 + parent
                    .element_children()
                    .take_while(|s| s.id != self.id)
                    .filter(|s| s.tag() == tag)
                    .count()
            }
            None => 1,
        }
    }

    /// Stable path from the scope root, e.g. `/html[1]/body[1]/input[2]`
    pub fn locator(&self) -> Locator {
        let mut chain: Vec<NodeRef<'a>> = Vec::new();
        if self.is_element() {
            chain.push(*self);
        }
        chain.extend(self.ancestors());
        let mut locator = Locator::root();
        for node in chain.iter().rev() {
            locator.push(node.tag(), node.sibling_index());
        }
        locator
    }
}

/// Output of the resolver
#[derive(Debug, Default)]
pub struct ResolvedScopes {
    /// Main scope first, then depth-first pre-order
    pub scopes: Vec<Scope>,
    /// Some frame was left unvisited because of the depth bound
    pub truncated: bool,
    /// Engine-level findings (`unparseable-frame`)
    pub findings: Vec<Finding>,
}

/// Expand a document into its scopes
pub fn resolve(root: Document, provider: &dyn DocumentProvider, max_depth: usize) -> ResolvedScopes {
    let mut resolved = ResolvedScopes::default();
    let mut stack = vec![Scope::new(ScopePath::main(), root)];

    while let Some(scope) = stack.pop() {
        let mut children = Vec::new();
        for (ordinal, frame) in scope.frames().enumerate() {
            let Some(element) = frame.element() else {
                continue;
            };
            let child_path = scope.path.child(ordinal);
            match provider.frame_content(element) {
                FrameContent::Empty => {}
                _ if child_path.depth() > max_depth => {
                    debug!(path = %child_path, max_depth, "Depth bound reached, not descending");
                    resolved.truncated = true;
                }
                FrameContent::Unparseable(reason) => {
                    warn!(path = %child_path, %reason, "Unparseable frame content");
                    resolved.findings.push(
                        Finding::new(
                            UNPARSEABLE_FRAME,
                            Severity::Warn,
                            &format!("Frame content could not be parsed: {}.", reason),
                        )
                        .with_locator(frame.locator())
                        .with_scope_path(scope.path.clone()),
                    );
                }
                FrameContent::Document(document) => children.push(Scope::new(child_path, document)),
            }
        }
        debug!(path = %scope.path, frames = children.len(), "Resolved scope");
        resolved.scopes.push(scope);
        stack.extend(children.into_iter().rev());
    }

    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::HtmlProvider;

    fn resolve_markup(markup: &str, max_depth: usize) -> ResolvedScopes {
        resolve(Document::parse(markup), &HtmlProvider::new(), max_depth)
    }

    /// Markup with `levels` frames nested inside each other via srcdoc
    fn nested_frames(levels: usize) -> String {
        let mut inner = "<p>bottom</p>".to_string();
        for _ in 0..levels {
            let escaped = inner.replace('&', "&amp;").replace('"', "&quot;").replace('<', "&lt;").replace('>', "&gt;");
            inner = format!("<iframe title=\"level\" srcdoc=\"{}\"></iframe>", escaped);
        }
        format!("<!DOCTYPE html><html><body>{}</body></html>", inner)
    }

    #[test]
    fn test_depth_first_order_and_paths() {
        let markup = r#"<!DOCTYPE html><html><body>
            <iframe srcdoc="<iframe srcdoc='<p>a</p>'></iframe>"></iframe>
            <iframe srcdoc="<p>b</p>"></iframe>
            <iframe></iframe>
        </body></html>"#;
        let resolved = resolve_markup(markup, 16);
        let paths: Vec<Vec<usize>> = resolved.scopes.iter().map(|s| s.path.0.clone()).collect();
        assert_eq!(paths, vec![vec![], vec![0], vec![0, 0], vec![1]]);
        assert!(!resolved.truncated);
    }

    #[test]
    fn test_depth_bound_truncates() {
        let resolved = resolve_markup(&nested_frames(20), 5);
        assert!(resolved.truncated);
        assert_eq!(resolved.scopes.len(), 6);
        assert_eq!(resolved.scopes.last().map(Scope::depth), Some(5));
        assert!(resolved.findings.is_empty());
    }

    #[test]
    fn test_unparseable_frame_reported_in_parent() {
        let markup = r#"<html><body><iframe title="x" srcdoc="<p>ok</p><div class=&quot;x&quot;"></iframe></body></html>"#;
        let resolved = resolve_markup(markup, 16);
        assert_eq!(resolved.scopes.len(), 1);
        assert_eq!(resolved.findings.len(), 1);
        let finding = &resolved.findings[0];
        assert_eq!(finding.rule_id, UNPARSEABLE_FRAME);
        assert_eq!(finding.severity, Severity::Warn);
        assert_eq!(finding.locator.to_string(), "/html[1]/body[1]/iframe[1]");
    }

    #[test]
    fn test_locator_counts_same_tag_siblings() {
        let doc = Document::parse("<html><body><div></div><p></p><div><input><input id=\"x\"></div></body></html>");
        let scope = Scope::new(ScopePath::main(), doc);
        let input = scope.element_by_id("x").expect("input");
        assert_eq!(input.locator().to_string(), "/html[1]/body[1]/div[2]/input[2]");
    }

    #[test]
    fn test_hidden_through_ancestor() {
        let doc = Document::parse(
            "<html><head><style>.hidden{display:none}</style></head><body><div class=\"hidden\"><a id=\"a\">x</a></div><a id=\"b\">y</a></body></html>",
        );
        let scope = Scope::new(ScopePath::main(), doc);
        assert!(scope.element_by_id("a").expect("a").is_hidden());
        assert!(!scope.element_by_id("b").expect("b").is_hidden());
    }
}
