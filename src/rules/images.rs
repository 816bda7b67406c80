// SPDX-License-Identifier: PMPL-1.0-or-later
//! Image rules - WCAG 1.1.1 Non-text Content, 1.4.5 Images of Text
//!
//! - Images carry an `alt` attribute (empty for decorative images)
//! - Images standing in for styled text come with equivalent real text

use crate::config::EngineConfig;
use crate::error::Result;
use crate::finding::Finding;
use crate::frames::{NodeRef, Scope};
use crate::rules::{finding_at, is_presentational, normalize_text, Rule};

/// Name fragments that mark an image as rendered text
const TEXT_TOKENS: &[&str] = &[
    "text", "txt", "button", "btn", "heading", "headline", "title", "banner", "quote", "slogan",
    "caption", "label", "wordmark", "cta",
];

fn tokens(value: &str) -> impl Iterator<Item = String> + '_ {
    value
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_ascii_lowercase)
}

/// File stem of an image source, without directories, query or extension
fn source_stem(src: &str) -> &str {
    let path = src.split(['?', '#']).next().unwrap_or(src);
    let file = path.rsplit('/').next().unwrap_or(path);
    match file.rfind('.') {
        Some(dot) if dot > 0 => &file[..dot],
        _ => file,
    }
}

fn has_text_token(value: &str) -> bool {
    tokens(value).any(|t| TEXT_TOKENS.contains(&t.as_str()))
}

/// Image of text without an equivalent text alternative
pub struct ImagesOfText;

impl ImagesOfText {
    fn looks_like_text(img: &NodeRef<'_>) -> bool {
        img.has_attr("data-image-text")
            || img.attr("src").map(source_stem).is_some_and(has_text_token)
            || img.attr("class").is_some_and(has_text_token)
            || img.attr("id").is_some_and(has_text_token)
    }

    /// Equivalent visible text next to the image, or a description reference
    fn has_text_equivalent(scope: &Scope, img: &NodeRef<'_>) -> bool {
        if let Some(ids) = img.attr("aria-describedby") {
            let described = ids
                .split_whitespace()
                .filter_map(|id| scope.element_by_id(id))
                .any(|d| !d.text_content().trim().is_empty());
            if described {
                return true;
            }
        }
        let Some(alt) = img.non_empty_attr("alt") else {
            return false;
        };
        let alt = normalize_text(alt).to_lowercase();
        img.parent()
            .map(|p| normalize_text(&p.text_content()).to_lowercase())
            .is_some_and(|nearby| nearby.contains(&alt))
    }
}

impl Rule for ImagesOfText {
    fn id(&self) -> &str {
        "images-of-text"
    }

    fn name(&self) -> &str {
        "Images of Text"
    }

    fn criterion(&self) -> &str {
        "1.4.5"
    }

    fn description(&self) -> &str {
        "Text should be real text rather than an image of text"
    }

    fn evaluate(&self, scope: &Scope, _config: &EngineConfig) -> Result<Vec<Finding>> {
        let mut findings = Vec::new();
        for img in scope.by_tag("img") {
            if is_presentational(&img) || !Self::looks_like_text(&img) {
                continue;
            }
            if Self::has_text_equivalent(scope, &img) {
                continue;
            }
            let source = img.attr("src").unwrap_or("");
            findings.push(finding_at(
                self,
                &img,
                &format!("Image \"{}\" appears to render text without an equivalent text alternative.", source),
            ));
        }
        Ok(findings)
    }
}

/// Image without alternative text
pub struct MissingAltText;

impl MissingAltText {
    fn has_aria_name(node: &NodeRef<'_>) -> bool {
        node.non_empty_attr("aria-label").is_some() || node.non_empty_attr("aria-labelledby").is_some()
    }
}

impl Rule for MissingAltText {
    fn id(&self) -> &str {
        "missing-alt-text"
    }

    fn name(&self) -> &str {
        "Missing Alt Text"
    }

    fn criterion(&self) -> &str {
        "1.1.1"
    }

    fn description(&self) -> &str {
        "Images need an alt attribute; image buttons and links need a non-empty one"
    }

    fn evaluate(&self, scope: &Scope, _config: &EngineConfig) -> Result<Vec<Finding>> {
        let mut findings = Vec::new();
        for node in scope.elements() {
            let message = match node.tag() {
                "img" if !node.has_attr("alt") => {
                    if is_presentational(&node)
                        || Self::has_aria_name(&node)
                        || node.attr("aria-hidden").is_some_and(|v| v.trim() == "true")
                    {
                        continue;
                    }
                    "Image is missing alt attribute. Use alt=\"\" for decorative images."
                }
                "input"
                    if node.attr("type").is_some_and(|t| t.trim().eq_ignore_ascii_case("image"))
                        && node.non_empty_attr("alt").is_none()
                        && !Self::has_aria_name(&node) =>
                {
                    "Image button has no alt text describing its action."
                }
                "area"
                    if node.has_attr("href") && node.non_empty_attr("alt").is_none() && !Self::has_aria_name(&node) =>
                {
                    "Image map area has no alt text."
                }
                _ => continue,
            };
            findings.push(finding_at(self, &node, message));
        }
        Ok(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::testutil::{locators, page, run};

    #[test]
    fn test_source_stem() {
        assert_eq!(source_stem("images/buy-now-text.png?v=2"), "buy-now-text");
        assert_eq!(source_stem("photo.jpg"), "photo");
        assert_eq!(source_stem(".hidden"), ".hidden");
    }

    #[test]
    fn test_image_of_text_flagged() {
        let html = page(r#"<p><img src="images/buy-now-text.png" alt="Buy Now"></p>"#);
        assert_eq!(locators(&run(&ImagesOfText, &html)), vec!["/html[1]/body[1]/p[1]/img[1]"]);
    }

    #[test]
    fn test_image_of_text_with_visible_equivalent() {
        let html = page(r#"<p><img src="heading-text.png" alt="Spring Sale"> Spring Sale</p>"#);
        assert!(run(&ImagesOfText, &html).is_empty());
    }

    #[test]
    fn test_photo_is_not_text() {
        let html = page(r#"<img src="photos/context.jpg" alt="Harbour at dusk">"#);
        assert!(run(&ImagesOfText, &html).is_empty());
    }

    #[test]
    fn test_missing_alt_variants() {
        let html = page(
            r#"<img src="a.jpg"><img src="b.jpg" alt=""><img src="c.jpg" role="presentation">
               <input type="image" src="go.png"><map><area href="/x"></map>"#,
        );
        let findings = run(&MissingAltText, &html);
        assert_eq!(
            locators(&findings),
            vec![
                "/html[1]/body[1]/img[1]",
                "/html[1]/body[1]/input[1]",
                "/html[1]/body[1]/map[1]/area[1]",
            ]
        );
    }
}
