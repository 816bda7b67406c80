// SPDX-License-Identifier: PMPL-1.0-or-later
//! CSS color parsing and the WCAG contrast computation.
//!
//! Colors are normalized to `[0, 1]` channels with an alpha component.
//! Supported forms: `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, `rgb()`/`rgba()`
//! (comma or space separated, with `/` alpha), `hsl()`/`hsla()` and a set of
//! named colors. Anything else is "cannot determine" and yields `None`.

use once_cell::sync::Lazy;
use regex::Regex;

/// Normalized sRGB color with alpha
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba { r: 1.0, g: 1.0, b: 1.0, a: 1.0 };
    pub const BLACK: Rgba = Rgba { r: 0.0, g: 0.0, b: 0.0, a: 1.0 };

    /// Build an opaque color from 8-bit channels
    pub fn from_u8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f64 / 255.0,
            g: g as f64 / 255.0,
            b: b as f64 / 255.0,
            a: 1.0,
        }
    }

    /// True when the color is fully transparent
    pub fn is_transparent(&self) -> bool {
        self.a <= 0.0
    }

    /// True when the color is fully opaque
    pub fn is_opaque(&self) -> bool {
        self.a >= 1.0
    }
}

fn clamp01(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

/// Parse a hex color (`#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`)
pub fn parse_hex_color(value: &str) -> Option<Rgba> {
    let hex = value.trim().trim_start_matches('#');
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let expanded: String = match hex.len() {
        3 | 4 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 | 8 => hex.to_string(),
        _ => return None,
    };
    let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).ok();
    let alpha = if expanded.len() == 8 {
        channel(6)? as f64 / 255.0
    } else {
        1.0
    };
    Some(Rgba {
        r: channel(0)? as f64 / 255.0,
        g: channel(2)? as f64 / 255.0,
        b: channel(4)? as f64 / 255.0,
        a: clamp01(alpha),
    })
}

/// Split the body of a functional color into channel tokens and an alpha token.
fn split_functional(body: &str) -> (Vec<&str>, Option<&str>) {
    let mut parts = body.splitn(2, '/');
    let channels = parts.next().unwrap_or("");
    let slash_alpha = parts.next().map(str::trim).filter(|s| !s.is_empty());
    let tokens: Vec<&str> = channels
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .collect();
    let alpha = slash_alpha.or_else(|| tokens.get(3).copied());
    (tokens, alpha)
}

fn parse_number(token: &str) -> Option<f64> {
    token.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_rgb_channel(token: &str) -> Option<f64> {
    match token.strip_suffix('%') {
        Some(percent) => Some(clamp01(parse_number(percent)? / 100.0)),
        None => Some(clamp01(parse_number(token)? / 255.0)),
    }
}

fn parse_alpha(token: &str) -> Option<f64> {
    match token.strip_suffix('%') {
        Some(percent) => Some(clamp01(parse_number(percent)? / 100.0)),
        None => Some(clamp01(parse_number(token)?)),
    }
}

static FUNCTIONAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(rgba?|hsla?)\(([^)]*)\)$").expect("valid regex"));

/// Parse `rgb()`/`rgba()`
pub fn parse_rgb_color(value: &str) -> Option<Rgba> {
    let caps = FUNCTIONAL_RE.captures(value.trim())?;
    if !caps[1].to_ascii_lowercase().starts_with("rgb") {
        return None;
    }
    let (tokens, alpha) = split_functional(&caps[2]);
    if tokens.len() < 3 {
        return None;
    }
    Some(Rgba {
        r: parse_rgb_channel(tokens[0])?,
        g: parse_rgb_channel(tokens[1])?,
        b: parse_rgb_channel(tokens[2])?,
        a: match alpha {
            Some(token) => parse_alpha(token)?,
            None => 1.0,
        },
    })
}

fn parse_hue(token: &str) -> Option<f64> {
    let token = token.trim().to_ascii_lowercase();
    let degrees = if let Some(turns) = token.strip_suffix("turn") {
        parse_number(turns)? * 360.0
    } else if let Some(rad) = token.strip_suffix("rad") {
        parse_number(rad)?.to_degrees()
    } else {
        parse_number(token.trim_end_matches("deg"))?
    };
    Some(degrees.rem_euclid(360.0))
}

fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (f64, f64, f64) {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = l - c / 2.0;
    let (r, g, b) = match h {
        h if h < 60.0 => (c, x, 0.0),
        h if h < 120.0 => (x, c, 0.0),
        h if h < 180.0 => (0.0, c, x),
        h if h < 240.0 => (0.0, x, c),
        h if h < 300.0 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    (clamp01(r + m), clamp01(g + m), clamp01(b + m))
}

/// Parse `hsl()`/`hsla()`
pub fn parse_hsl_color(value: &str) -> Option<Rgba> {
    let caps = FUNCTIONAL_RE.captures(value.trim())?;
    if !caps[1].to_ascii_lowercase().starts_with("hsl") {
        return None;
    }
    let (tokens, alpha) = split_functional(&caps[2]);
    if tokens.len() < 3 {
        return None;
    }
    let h = parse_hue(tokens[0])?;
    let s = clamp01(parse_number(tokens[1].strip_suffix('%')?)? / 100.0);
    let l = clamp01(parse_number(tokens[2].strip_suffix('%')?)? / 100.0);
    let (r, g, b) = hsl_to_rgb(h, s, l);
    let a = match alpha {
        Some(token) => parse_alpha(token)?,
        None => 1.0,
    };
    Some(Rgba { r, g, b, a })
}

/// Parse a named CSS color
pub fn parse_named_color(name: &str) -> Option<Rgba> {
    let rgb = match name {
        "white" => (255, 255, 255),
        "black" => (0, 0, 0),
        "red" => (255, 0, 0),
        "green" => (0, 128, 0),
        "blue" => (0, 0, 255),
        "yellow" => (255, 255, 0),
        "gray" | "grey" => (128, 128, 128),
        "darkgray" | "darkgrey" => (169, 169, 169),
        "lightgray" | "lightgrey" => (211, 211, 211),
        "silver" => (192, 192, 192),
        "maroon" => (128, 0, 0),
        "olive" => (128, 128, 0),
        "lime" => (0, 255, 0),
        "aqua" | "cyan" => (0, 255, 255),
        "teal" => (0, 128, 128),
        "navy" => (0, 0, 128),
        "fuchsia" | "magenta" => (255, 0, 255),
        "purple" => (128, 0, 128),
        "orange" => (255, 165, 0),
        "transparent" => return Some(Rgba { r: 0.0, g: 0.0, b: 0.0, a: 0.0 }),
        _ => return None,
    };
    Some(Rgba::from_u8(rgb.0, rgb.1, rgb.2))
}

/// Parse any supported CSS color value
pub fn parse_color(value: &str) -> Option<Rgba> {
    let trimmed = value.trim().trim_end_matches("!important").trim().to_ascii_lowercase();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.starts_with('#') {
        parse_hex_color(&trimmed)
    } else if trimmed.starts_with("rgb") {
        parse_rgb_color(&trimmed)
    } else if trimmed.starts_with("hsl") {
        parse_hsl_color(&trimmed)
    } else {
        parse_named_color(&trimmed)
    }
}

static COLOR_TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)#[0-9a-f]{3,8}\b|(?:rgba?|hsla?)\([^)]*\)|\b[a-z]+\b").expect("valid regex")
});

/// All colors mentioned in a value, in order (gradient stops, `background`
/// shorthand layers). Unknown words are skipped.
pub fn extract_colors(value: &str) -> Vec<Rgba> {
    COLOR_TOKEN_RE
        .find_iter(value)
        .filter_map(|m| parse_color(m.as_str()))
        .collect()
}

/// Gamma-linearize one sRGB channel
pub fn linearize(channel: f64) -> f64 {
    if channel <= 0.04045 {
        channel / 12.92
    } else {
        ((channel + 0.055) / 1.055).powf(2.4)
    }
}

/// Calculate relative luminance per WCAG 2.x
/// <https://www.w3.org/TR/WCAG21/#dfn-relative-luminance>
pub fn relative_luminance(color: Rgba) -> f64 {
    0.2126 * linearize(color.r) + 0.7152 * linearize(color.g) + 0.0722 * linearize(color.b)
}

/// Calculate contrast ratio between two colors.
/// Returns a ratio in `[1, 21]`.
pub fn contrast_ratio(fg: Rgba, bg: Rgba) -> f64 {
    let l1 = relative_luminance(fg);
    let l2 = relative_luminance(bg);
    let (lighter, darker) = if l1 >= l2 { (l1, l2) } else { (l2, l1) };
    (lighter + 0.05) / (darker + 0.05)
}

/// Composite `top` over `bottom` (source-over)
pub fn blend(top: Rgba, bottom: Rgba) -> Rgba {
    let a = top.a + bottom.a * (1.0 - top.a);
    if a <= 0.0 {
        return Rgba { r: 0.0, g: 0.0, b: 0.0, a: 0.0 };
    }
    let mix = |t: f64, b: f64| (t * top.a + b * bottom.a * (1.0 - top.a)) / a;
    Rgba {
        r: mix(top.r, bottom.r),
        g: mix(top.g, bottom.g),
        b: mix(top.b, bottom.b),
        a,
    }
}
