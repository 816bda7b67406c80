// SPDX-License-Identifier: PMPL-1.0-or-later
//! Pure style heuristics used by the rule checks.
//!
//! Nothing in here holds state; every function takes already-resolved
//! style values and returns `None` when a value cannot be determined.

pub mod color;
pub mod length;

pub use color::{blend, contrast_ratio, extract_colors, parse_color, relative_luminance, Rgba};
pub use length::{compute_font_size, is_fixed_length, line_height_ratio, parse_length, spacing_em, Length};

/// WCAG 1.4.3 minimum ratio for normal text
pub const CONTRAST_NORMAL: f64 = 4.5;

/// WCAG 1.4.3 minimum ratio for large text
pub const CONTRAST_LARGE: f64 = 3.0;

/// Large text: at least 18pt
pub const LARGE_TEXT_PX: f64 = 24.0;

/// Large text when bold: at least 14pt
pub const LARGE_BOLD_TEXT_PX: f64 = 18.66;

/// Smallest px font size that survives a 200% zoom inside a fixed box
pub const MIN_RESIZABLE_FONT_PX: f64 = 12.0;

/// WCAG 1.4.12 line-height multiplier
pub const MIN_LINE_HEIGHT_RATIO: f64 = 1.5;

/// WCAG 1.4.12 letter spacing, in em
pub const MIN_LETTER_SPACING_EM: f64 = 0.12;

/// WCAG 1.4.12 word spacing, in em
pub const MIN_WORD_SPACING_EM: f64 = 0.16;

/// WCAG 1.4.10 reflow viewport width in CSS px
pub const REFLOW_WIDTH_PX: f64 = 320.0;

/// Whether text of this size and weight counts as large
pub fn is_large_text(font_px: f64, bold: bool) -> bool {
    font_px >= LARGE_TEXT_PX || (bold && font_px >= LARGE_BOLD_TEXT_PX)
}

/// Whether a computed `font-weight` is bold (700 or above)
pub fn is_bold(font_weight: &str) -> bool {
    match font_weight.trim().to_ascii_lowercase().as_str() {
        "bold" | "bolder" => true,
        other => other.parse::<u32>().is_ok_and(|w| w >= 700),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_large_text() {
        assert!(is_large_text(24.0, false));
        assert!(!is_large_text(18.0, false));
        assert!(is_large_text(19.0, true));
        assert!(!is_large_text(16.0, true));
    }

    #[test]
    fn test_is_bold() {
        assert!(is_bold("bold"));
        assert!(is_bold("700"));
        assert!(!is_bold("400"));
        assert!(!is_bold("normal"));
    }
}
