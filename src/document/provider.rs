// SPDX-License-Identifier: PMPL-1.0-or-later
//! Document Provider: turns markup into style-resolved trees and supplies
//! the content of embedded frames.

use super::{Document, Element};
use std::collections::BTreeMap;

/// Content of one frame element
#[derive(Debug, Clone, PartialEq)]
pub enum FrameContent {
    /// Parsed frame document
    Document(Document),
    /// No inline or pre-resolved content; the frame produces no scope
    Empty,
    /// Content exists but is malformed
    Unparseable(String),
}

/// Source of parsed documents and frame content
pub trait DocumentProvider: Send + Sync {
    /// Parse top-level markup
    fn parse_document(&self, markup: &str) -> Document;

    /// Resolve the content of an `<iframe>` element
    fn frame_content(&self, frame: &Element) -> FrameContent;
}

/// Provider backed by the scraper HTML parser.
///
/// `srcdoc` is parsed inline. `src` is looked up in frame markup registered
/// up front with [`HtmlProvider::with_frame`]; nothing is fetched.
#[derive(Debug, Clone, Default)]
pub struct HtmlProvider {
    frames: BTreeMap<String, String>,
}

impl HtmlProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register pre-resolved markup for a frame `src`
    pub fn with_frame(mut self, src: &str, markup: &str) -> Self {
        self.frames.insert(src.to_string(), markup.to_string());
        self
    }
}

impl DocumentProvider for HtmlProvider {
    fn parse_document(&self, markup: &str) -> Document {
        Document::parse(markup)
    }

    fn frame_content(&self, frame: &Element) -> FrameContent {
        let markup = match frame.attr("srcdoc") {
            Some(srcdoc) => srcdoc,
            None => match frame.attr("src").and_then(|src| self.frames.get(src.trim())) {
                Some(markup) => markup.as_str(),
                None => return FrameContent::Empty,
            },
        };
        if markup.trim().is_empty() {
            return FrameContent::Empty;
        }
        match check_well_formed(markup) {
            Ok(()) => FrameContent::Document(self.parse_document(markup)),
            Err(reason) => FrameContent::Unparseable(reason),
        }
    }
}

/// Reject frame markup that ends inside an unterminated tag or comment.
pub fn check_well_formed(markup: &str) -> Result<(), String> {
    let trimmed = markup.trim_end();
    if let Some(open) = trimmed.rfind("<!--") {
        if !trimmed[open..].contains("-->") {
            return Err("unterminated comment".to_string());
        }
    }
    if let Some(open) = trimmed.rfind('<') {
        let tail = &trimmed[open..];
        let starts_tag = tail[1..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '/' || c == '!');
        if starts_tag && !tail.contains('>') {
            let name: String = tail[1..]
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric() || *c == '/' || *c == '!')
                .collect();
            return Err(format!("unterminated tag <{}", name));
        }
    }
    Ok(())
}
