// SPDX-License-Identifier: PMPL-1.0-or-later
//! Device-dependent handler rule - WCAG 2.1.1 Keyboard
//!
//! Pointer-only event handlers need a keyboard equivalent on the same element:
//! - click-like handlers need a key handler (native controls get one for free)
//! - hover handlers need focus/blur handlers
//! - drag handlers and `draggable=true` need a key handler

use crate::config::EngineConfig;
use crate::error::Result;
use crate::finding::Finding;
use crate::frames::{NodeRef, Scope};
use crate::rules::{finding_at, Rule};

const CLICK_HANDLERS: &[&str] = &["onclick", "ondblclick", "onmousedown", "onmouseup"];
const HOVER_HANDLERS: &[&str] = &["onmouseover", "onmouseout", "onmouseenter", "onmouseleave"];
const DRAG_HANDLERS: &[&str] = &["ondrag", "ondragstart", "ondragend", "ondrop"];
const KEY_HANDLERS: &[&str] = &["onkeydown", "onkeyup", "onkeypress"];
const FOCUS_HANDLERS: &[&str] = &["onfocus", "onblur", "onfocusin", "onfocusout"];

fn first_present<'a>(node: &NodeRef<'_>, handlers: &[&'a str]) -> Option<&'a str> {
    handlers.iter().copied().find(|h| node.has_attr(h))
}

/// Elements that receive keyboard activation natively
fn is_native_control(node: &NodeRef<'_>) -> bool {
    match node.tag() {
        "button" | "input" | "select" | "textarea" | "summary" | "option" => true,
        "a" | "area" => node.has_attr("href"),
        _ => false,
    }
}

/// Pointer-only interaction
pub struct DeviceDependentEventHandler;

impl DeviceDependentEventHandler {
    fn violation(node: &NodeRef<'_>) -> Option<String> {
        let has_key = first_present(node, KEY_HANDLERS).is_some();
        if let Some(handler) = first_present(node, HOVER_HANDLERS) {
            if first_present(node, FOCUS_HANDLERS).is_none() {
                return Some(format!(
                    "<{}> uses {} without an onfocus/onblur equivalent.",
                    node.tag(),
                    handler
                ));
            }
        }
        if let Some(handler) = first_present(node, CLICK_HANDLERS) {
            if !has_key && !is_native_control(node) {
                return Some(format!(
                    "<{}> handles {} but has no keyboard handler and is not a native control.",
                    node.tag(),
                    handler
                ));
            }
        }
        let draggable = node.attr("draggable").is_some_and(|v| v.trim().eq_ignore_ascii_case("true"));
        let drag = first_present(node, DRAG_HANDLERS);
        if (drag.is_some() || draggable) && !has_key {
            return Some(format!(
                "<{}> can only be operated by dragging ({}); provide a keyboard alternative.",
                node.tag(),
                drag.unwrap_or("draggable")
            ));
        }
        None
    }
}

impl Rule for DeviceDependentEventHandler {
    fn id(&self) -> &str {
        "device-dependent-event-handler"
    }

    fn name(&self) -> &str {
        "Device-Dependent Event Handler"
    }

    fn criterion(&self) -> &str {
        "2.1.1"
    }

    fn description(&self) -> &str {
        "Pointer-specific event handlers need keyboard equivalents"
    }

    fn evaluate(&self, scope: &Scope, _config: &EngineConfig) -> Result<Vec<Finding>> {
        Ok(scope
            .elements()
            .filter_map(|node| Self::violation(&node).map(|message| finding_at(self, &node, &message)))
            .collect())
    }
}
