// SPDX-License-Identifier: PMPL-1.0-or-later
//! CSS length parsing for the text heuristics.

/// Root and default font size in px
pub const DEFAULT_FONT_PX: f64 = 16.0;

/// A parsed CSS length
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Length {
    Px(f64),
    Em(f64),
    Rem(f64),
    Percent(f64),
    /// Unitless number (line-height multiplier)
    Number(f64),
    /// Other absolute units already converted to px
    Absolute(f64),
    /// Viewport or container relative units
    Relative(f64),
}

/// Parse a single length token. Keywords such as `auto` or `normal` return `None`.
pub fn parse_length(value: &str) -> Option<Length> {
    let v = value.trim().trim_end_matches("!important").trim().to_ascii_lowercase();
    let split = v
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-' || c == '+'))
        .unwrap_or(v.len());
    let (number, unit) = v.split_at(split);
    let n: f64 = number.parse().ok().filter(|n: &f64| n.is_finite())?;
    let length = match unit.trim() {
        "" => Length::Number(n),
        "px" => Length::Px(n),
        "em" => Length::Em(n),
        "rem" => Length::Rem(n),
        "%" => Length::Percent(n),
        "pt" => Length::Absolute(n * 96.0 / 72.0),
        "pc" => Length::Absolute(n * 16.0),
        "in" => Length::Absolute(n * 96.0),
        "cm" => Length::Absolute(n * 96.0 / 2.54),
        "mm" => Length::Absolute(n * 96.0 / 25.4),
        "vw" | "vh" | "vmin" | "vmax" | "ch" | "ex" | "fr" => Length::Relative(n),
        _ => return None,
    };
    Some(length)
}

impl Length {
    /// Resolve to px given the reference font size. Percentages of a font
    /// size and viewport units cannot be resolved for box dimensions here.
    pub fn to_px(self, font_px: f64) -> Option<f64> {
        match self {
            Length::Px(n) | Length::Absolute(n) => Some(n),
            Length::Em(n) => Some(n * font_px),
            Length::Rem(n) => Some(n * DEFAULT_FONT_PX),
            Length::Number(n) if n == 0.0 => Some(0.0),
            _ => None,
        }
    }

    /// True when the length does not scale with text zoom
    pub fn is_fixed(self) -> bool {
        matches!(self, Length::Px(_) | Length::Absolute(_))
    }
}

/// Compute a `font-size` value to px against the parent's computed size
pub fn compute_font_size(value: &str, parent_px: f64) -> Option<f64> {
    let keyword = value.trim().to_ascii_lowercase();
    let scaled = match keyword.as_str() {
        "xx-small" => Some(9.0),
        "x-small" => Some(10.0),
        "small" => Some(13.0),
        "medium" => Some(DEFAULT_FONT_PX),
        "large" => Some(18.0),
        "x-large" => Some(24.0),
        "xx-large" => Some(32.0),
        "smaller" => Some(parent_px / 1.2),
        "larger" => Some(parent_px * 1.2),
        _ => None,
    };
    if scaled.is_some() {
        return scaled;
    }
    match parse_length(&keyword)? {
        Length::Percent(p) => Some(parent_px * p / 100.0),
        Length::Number(_) | Length::Relative(_) => None,
        other => other.to_px(parent_px),
    }
}

/// True when a `width`/`min-width`/`max-width` value pins the box to a fixed size
pub fn is_fixed_length(value: &str) -> bool {
    parse_length(value).is_some_and(|l| l.is_fixed())
}

/// Ratio of a `line-height` value to the font size, `None` for `normal`
/// or anything unresolvable.
pub fn line_height_ratio(value: &str, font_px: f64) -> Option<f64> {
    if font_px <= 0.0 {
        return None;
    }
    match parse_length(value)? {
        Length::Number(n) => Some(n),
        Length::Percent(p) => Some(p / 100.0),
        Length::Em(n) => Some(n),
        other => other.to_px(font_px).map(|px| px / font_px),
    }
}

/// A `letter-spacing`/`word-spacing` value in em, `None` for `normal`
/// or anything unresolvable.
pub fn spacing_em(value: &str, font_px: f64) -> Option<f64> {
    if font_px <= 0.0 {
        return None;
    }
    match parse_length(value)? {
        Length::Em(n) => Some(n),
        Length::Percent(_) | Length::Relative(_) => None,
        other => other.to_px(font_px).map(|px| px / font_px),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_length_units() {
        assert_eq!(parse_length("10px"), Some(Length::Px(10.0)));
        assert_eq!(parse_length("1.5"), Some(Length::Number(1.5)));
        assert_eq!(parse_length("-0.5px"), Some(Length::Px(-0.5)));
        assert_eq!(parse_length("auto"), None);
        assert_eq!(parse_length("12pt"), Some(Length::Absolute(16.0)));
    }

    #[test]
    fn test_compute_font_size() {
        assert_eq!(compute_font_size("10px", 16.0), Some(10.0));
        assert_eq!(compute_font_size("2em", 10.0), Some(20.0));
        assert_eq!(compute_font_size("150%", 16.0), Some(24.0));
        assert_eq!(compute_font_size("medium", 10.0), Some(16.0));
        assert_eq!(compute_font_size("inherit", 10.0), None);
    }

    #[test]
    fn test_line_height_ratio() {
        assert_eq!(line_height_ratio("1", 16.0), Some(1.0));
        assert_eq!(line_height_ratio("24px", 16.0), Some(1.5));
        assert_eq!(line_height_ratio("120%", 16.0), Some(1.2));
        assert_eq!(line_height_ratio("normal", 16.0), None);
    }

    #[test]
    fn test_fixed_and_spacing() {
        assert!(is_fixed_length("1200px"));
        assert!(!is_fixed_length("80%"));
        assert!(!is_fixed_length("40em"));
        assert_eq!(spacing_em("-0.5px", 16.0), Some(-0.03125));
        assert_eq!(spacing_em("0.12em", 16.0), Some(0.12));
        assert_eq!(spacing_em("4px", 20.0), Some(0.2));
        assert_eq!(spacing_em("0", 16.0), Some(0.0));
        assert_eq!(spacing_em("normal", 16.0), None);
    }
}
