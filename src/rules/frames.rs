// SPDX-License-Identifier: PMPL-1.0-or-later
//! Frame title rule - WCAG 4.1.2 Name, Role, Value

use crate::config::EngineConfig;
use crate::error::Result;
use crate::finding::Finding;
use crate::frames::Scope;
use crate::rules::{finding_at, Rule};

/// Frame without a title, checked independently in every scope
pub struct MissingIframeTitle;

impl Rule for MissingIframeTitle {
    fn id(&self) -> &str {
        "missing-iframe-title"
    }

    fn name(&self) -> &str {
        "Missing Iframe Title"
    }

    fn criterion(&self) -> &str {
        "4.1.2"
    }

    fn description(&self) -> &str {
        "Every iframe needs a non-empty title describing its content"
    }

    fn evaluate(&self, scope: &Scope, _config: &EngineConfig) -> Result<Vec<Finding>> {
        Ok(scope
            .frames()
            .filter(|frame| frame.non_empty_attr("title").is_none())
            .map(|frame| finding_at(self, &frame, &format!("<{}> has no title attribute.", frame.tag())))
            .collect())
    }
}
