// SPDX-License-Identifier: PMPL-1.0-or-later
//! Conformancebot - Accessibility Rule Evaluation Engine
//!
//! Part of the gitbot-fleet ecosystem. Conformancebot evaluates a web
//! document, including the content of nested frames, against a registry of
//! WCAG-style conformance rules and produces a stable, comparable report.
//! The same report feeds the live scanner and the gold-master corpus replay.
//!
//! ## Pipeline
//!
//! document provider → frame resolver (scopes) → rule registry → aggregator → report
//!
//! ## Rules
//!
//! - **missing-label** (1.3.1/3.3.2): Form controls without an accessible name
//! - **orphaned-form-label** (1.3.1): Labels that associate with no control
//! - **navigation-structure** (2.4.1): Landmark and navigation ordering
//! - **hidden-navigation** (2.4.5): Navigation only reachable while hidden
//! - **focus-visible** (2.4.7): Focus indicators removed without replacement
//! - **insufficient-contrast** (1.4.3): Text contrast below threshold
//! - **orientation-lock** (1.3.4): Display locked to one orientation
//! - **text-resize** (1.4.4): Text that cannot scale
//! - **text-spacing** (1.4.12): Constrained line, letter and word spacing
//! - **missing-iframe-title** (4.1.2): Frames without a title
//! - **missing-table-headers** (1.3.1): Data tables without headers
//! - **images-of-text** (1.4.5): Images that render text
//! - **missing-alt-text** (1.1.1): Images without a text alternative
//! - **device-dependent-event-handler** (2.1.1): Pointer-only handlers
//! - **sensory-characteristics** (1.3.3): Instructions relying on color, shape or position
//! - **duplicate-id** (4.1.1): Reused element ids
//! - **missing-page-title** (2.4.2): Pages without a title
//! - **missing-document-language** (3.1.1): Pages without a language
//! - **missing-skip-link** (2.4.1): No skip link ahead of other focusable content
//! - **empty-heading** (2.4.6): Headings with nothing to announce
//! - **missing-heading-structure** (1.3.1): Pages without headings
//! - **unlabeled-button** (4.1.2): Buttons without an accessible name
//! - **missing-link-text** (2.4.4): Links without text
//! - **missing-fieldset-legend** (1.3.1): Fieldsets without a legend
//! - **hidden-focusable** (2.4.3): Hidden content that still takes focus
//! - **invalid-aria-role** (4.1.2): Unknown role tokens
//! - **fixed-width-layout** (1.4.10): Boxes fixed wider than the reflow viewport
//! - **non-wrapping-container** (1.4.10): Text kept from wrapping
//! - **absolute-positioning** (1.4.10): Inline `position: absolute` or `fixed`

pub mod config;
pub mod document;
pub mod engine;
pub mod error;
pub mod finding;
pub mod frames;
pub mod goldmaster;
pub mod heuristics;
pub mod report;
pub mod rules;
pub mod scanner;

pub use config::EngineConfig;
pub use engine::Engine;
pub use error::{EngineError, Result};
pub use finding::{Finding, Locator, ScopePath, Severity};
pub use report::Report;
