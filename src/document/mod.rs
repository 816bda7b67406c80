// SPDX-License-Identifier: PMPL-1.0-or-later
//! Style-resolved document tree.
//!
//! A [`Document`] is an arena of nodes stored in document (pre-)order, so a
//! node's descendants occupy the contiguous id range `id + 1 .. subtree_end`.
//! Construction from the HTML parser tree and every traversal are iterative;
//! arbitrarily deep nesting never grows the call stack.
//!
//! Nodes are immutable once built. Rules only ever read them.

pub mod cascade;
pub mod css;
pub mod provider;

pub use cascade::{ComputedStyle, ConditionalDeclaration};
pub use css::{CssRule, Declaration, Stylesheet};
pub use provider::{DocumentProvider, FrameContent, HtmlProvider};

use scraper::{ElementRef, Html, Selector};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Index of a node inside its document arena
pub type NodeId = usize;

/// The synthetic document root
pub const ROOT: NodeId = 0;

/// An element: tag, attributes and resolved style
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Lower-case tag name
    pub tag: String,
    /// Lower-case attribute names, unique
    pub attributes: BTreeMap<String, String>,
    pub style: ComputedStyle,
}

impl Element {
    /// Case-insensitive attribute lookup
    pub fn attr(&self, name: &str) -> Option<&str> {
        match self.attributes.get(name) {
            Some(value) => Some(value.as_str()),
            None => self.attributes.get(&name.to_ascii_lowercase()).map(String::as_str),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Root,
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// One past the last descendant
    pub subtree_end: NodeId,
    pub kind: NodeKind,
}

impl Node {
    pub fn element(&self) -> Option<&Element> {
        match self.kind {
            NodeKind::Element(ref element) => Some(element),
            _ => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self.kind {
            NodeKind::Text(ref text) => Some(text),
            _ => None,
        }
    }
}

/// A parsed, style-resolved document
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub nodes: Vec<Node>,
    pub stylesheet: Stylesheet,
    /// Markup had no `<html>` element or doctype of its own
    pub fragment: bool,
}

/// Markup without a doctype or `<html>` tag is a fragment
pub fn is_fragment_markup(markup: &str) -> bool {
    let lower = markup.to_ascii_lowercase();
    !(lower.contains("<!doctype") || lower.contains("<html"))
}

impl Document {
    /// Parse markup into a style-resolved tree
    pub fn parse(markup: &str) -> Self {
        let html = Html::parse_document(markup);
        let mut document = Document {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                subtree_end: 1,
                kind: NodeKind::Root,
            }],
            stylesheet: Stylesheet::default(),
            fragment: is_fragment_markup(markup),
        };

        let mut handles = vec![None];
        let mut ids = HashMap::new();
        let tree_root = html.tree.root();
        ids.insert(tree_root.id(), ROOT);

        for node in tree_root.descendants().skip(1) {
            let kind = match node.value() {
                scraper::Node::Element(el) => {
                    let mut attributes = BTreeMap::new();
                    for (name, value) in el.attrs() {
                        attributes
                            .entry(name.to_ascii_lowercase())
                            .or_insert_with(|| value.to_string());
                    }
                    NodeKind::Element(Element {
                        tag: el.name().to_ascii_lowercase(),
                        attributes,
                        style: ComputedStyle::default(),
                    })
                }
                scraper::Node::Text(text) => {
                    let content: &str = text;
                    NodeKind::Text(content.to_string())
                }
                _ => continue,
            };
            let Some(parent) = node.parent().and_then(|p| ids.get(&p.id()).copied()) else {
                continue;
            };
            let id = document.nodes.len();
            document.nodes.push(Node {
                parent: Some(parent),
                children: Vec::new(),
                subtree_end: id + 1,
                kind,
            });
            document.nodes[parent].children.push(id);
            ids.insert(node.id(), id);
            handles.push(Some(node.id()));
        }

        for id in (1..document.nodes.len()).rev() {
            if let Some(parent) = document.nodes[id].parent {
                let end = document.nodes[id].subtree_end;
                if end > document.nodes[parent].subtree_end {
                    document.nodes[parent].subtree_end = end;
                }
            }
        }

        document.collect_stylesheets();
        let selectors: Vec<Option<Selector>> = document
            .stylesheet
            .rules
            .iter()
            .map(|rule| Selector::parse(&rule.selector).ok())
            .collect();

        for id in 1..document.nodes.len() {
            let Some(element_ref) = handles[id].and_then(|h| html.tree.get(h)).and_then(ElementRef::wrap) else {
                continue;
            };
            let mut matched = Vec::new();
            let mut conditional = Vec::new();
            for (rule, selector) in document.stylesheet.rules.iter().zip(&selectors) {
                let Some(selector) = selector else {
                    continue;
                };
                if selector.matches(&element_ref) {
                    if rule.media.is_some() {
                        conditional.push(rule);
                    } else {
                        matched.push(rule);
                    }
                }
            }
            let inline = document.nodes[id]
                .element()
                .and_then(|e| e.attr("style"))
                .map(css::parse_declarations);
            let parent_style = document.nodes[id]
                .parent
                .and_then(|p| document.nodes[p].element())
                .map(|e| &e.style);
            let style = cascade::compute_style(&matched, &conditional, inline.as_deref(), parent_style);
            if let NodeKind::Element(ref mut element) = document.nodes[id].kind {
                element.style = style;
            }
        }

        debug!(
            nodes = document.nodes.len(),
            rules = document.stylesheet.rules.len(),
            fragment = document.fragment,
            "Parsed document"
        );
        document
    }

    fn collect_stylesheets(&mut self) {
        let mut sheet = Stylesheet::default();
        for id in 0..self.nodes.len() {
            let Some(element) = self.nodes[id].element() else {
                continue;
            };
            if element.tag != "style" {
                continue;
            }
            let media = element
                .attr("media")
                .map(str::trim)
                .filter(|m| !m.is_empty() && !m.eq_ignore_ascii_case("all"))
                .map(str::to_string);
            let css = self.text_content(id);
            sheet.add_source(&css, id, media);
        }
        self.stylesheet = sheet;
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        self.nodes.get(id).and_then(Node::element)
    }

    /// Concatenated text of every descendant text node
    pub fn text_content(&self, id: NodeId) -> String {
        let end = self.nodes[id].subtree_end;
        self.nodes[id + 1..end].iter().filter_map(Node::text).collect()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }
}
