//! Hex/RGB/HSV conversion and linear color blending.
//!
//! Color handling is deliberately forgiving: the values come straight out of
//! user-edited documents, so malformed input degrades to a safe default
//! (black for channel math, opaque white for whole-color parses) instead of
//! erroring.

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Self = Self { r: 0, g: 0, b: 0 };
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Hsv {
    /// Hue in degrees, [0, 360). Achromatic inputs yield 0.
    pub h: f64,
    /// Saturation in [0, 1].
    pub s: f64,
    /// Value in [0, 1].
    pub v: f64,
}

/// A color split into an opaque hex part and a separate alpha.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ParsedColor {
    pub hex: String,
    pub alpha: f64,
}

/// Parses a 3-, 6-, or other-length hex string (with or without `#`).
///
/// Three digits expand CSS-style (`f0a` -> `ff00aa`); anything shorter than
/// six digits is zero-padded, anything longer truncated. Malformed digits
/// yield black.
pub fn hex_to_rgb(hex: &str) -> Rgb {
    let digits = hex.trim().trim_start_matches('#');
    let mut normalized = if digits.len() == 3 {
        digits.chars().flat_map(|c| [c, c]).collect::<String>()
    } else {
        digits.chars().take(6).collect::<String>()
    };
    while normalized.len() < 6 {
        normalized.push('0');
    }

    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&normalized[range], 16);
    match (channel(0..2), channel(2..4), channel(4..6)) {
        (Ok(r), Ok(g), Ok(b)) => Rgb { r, g, b },
        _ => Rgb::BLACK,
    }
}

/// Always emits 6-digit lowercase hex with a leading `#`.
pub fn rgb_to_hex(rgb: Rgb) -> String {
    format!("#{:02x}{:02x}{:02x}", rgb.r, rgb.g, rgb.b)
}

pub fn rgb_to_hsv(rgb: Rgb) -> Hsv {
    let r = f64::from(rgb.r) / 255.0;
    let g = f64::from(rgb.g) / 255.0;
    let b = f64::from(rgb.b) / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let h = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * (((g - b) / delta).rem_euclid(6.0))
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };

    let s = if max == 0.0 { 0.0 } else { delta / max };
    Hsv { h, s, v: max }
}

pub fn hsv_to_rgb(hsv: Hsv) -> Rgb {
    let h = hsv.h.rem_euclid(360.0);
    let s = hsv.s.clamp(0.0, 1.0);
    let v = hsv.v.clamp(0.0, 1.0);

    let c = v * s;
    let x = c * (1.0 - ((h / 60.0).rem_euclid(2.0) - 1.0).abs());
    let m = v - c;

    let (r1, g1, b1) = match (h / 60.0) as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    let to_u8 = |ch: f64| ((ch + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    Rgb {
        r: to_u8(r1),
        g: to_u8(g1),
        b: to_u8(b1),
    }
}

/// Splits any supported color string into hex + alpha.
///
/// Accepts `rgba(r,g,b[,a])`, `rgb(r,g,b)`, 6-digit hex, 3-digit hex, and
/// 8-digit hex-with-alpha. Unrecognized input is opaque white.
pub fn parse_color(input: &str) -> ParsedColor {
    let s = input.trim();

    if s.starts_with("rgba(") || s.starts_with("rgb(") {
        let tokens = numeric_tokens(s);
        if tokens.len() >= 3 {
            let rgb = Rgb {
                r: clamp_channel(tokens[0]),
                g: clamp_channel(tokens[1]),
                b: clamp_channel(tokens[2]),
            };
            let alpha = tokens.get(3).copied().unwrap_or(1.0).clamp(0.0, 1.0);
            return ParsedColor {
                hex: rgb_to_hex(rgb),
                alpha,
            };
        }
        return opaque_white();
    }

    if let Some(digits) = s.strip_prefix('#') {
        if digits.len() == 8 && digits.chars().all(|c| c.is_ascii_hexdigit()) {
            let alpha_raw = u8::from_str_radix(&digits[6..8], 16).unwrap_or(255);
            let alpha = (f64::from(alpha_raw) / 255.0 * 100.0).round() / 100.0;
            return ParsedColor {
                hex: rgb_to_hex(hex_to_rgb(&digits[..6])),
                alpha,
            };
        }
        if (digits.len() == 6 || digits.len() == 3)
            && digits.chars().all(|c| c.is_ascii_hexdigit())
        {
            return ParsedColor {
                hex: rgb_to_hex(hex_to_rgb(digits)),
                alpha: 1.0,
            };
        }
    }

    opaque_white()
}

/// Inverse of [`parse_color`]: bare hex when fully opaque, `rgba(...)`
/// otherwise. Fully-opaque colors intentionally serialize minimally.
pub fn build_color(hex: &str, alpha: f64) -> String {
    if alpha >= 1.0 {
        return hex.to_string();
    }
    let rgb = hex_to_rgb(hex);
    format!("rgba({}, {}, {}, {})", rgb.r, rgb.g, rgb.b, alpha)
}

/// Linearly blends two color strings, returning 6-digit hex.
///
/// Endpoints are parsed as hex when they start with `#`; any other string is
/// scanned for numeric tokens and the first three are taken as RGB. Strings
/// with fewer than three tokens (named colors included) parse as black.
/// Alpha is never interpolated here; callers animate opacity separately.
pub fn lerp_color(a: &str, b: &str, t: f64) -> String {
    let from = loose_rgb(a);
    let to = loose_rgb(b);

    let mix = |x: u8, y: u8| -> u8 {
        let x = f64::from(x);
        let y = f64::from(y);
        (x + (y - x) * t).round().clamp(0.0, 255.0) as u8
    };

    rgb_to_hex(Rgb {
        r: mix(from.r, to.r),
        g: mix(from.g, to.g),
        b: mix(from.b, to.b),
    })
}

fn loose_rgb(input: &str) -> Rgb {
    let s = input.trim();
    if s.starts_with('#') {
        return hex_to_rgb(&parse_color(s).hex);
    }
    let tokens = numeric_tokens(s);
    if tokens.len() >= 3 {
        Rgb {
            r: clamp_channel(tokens[0]),
            g: clamp_channel(tokens[1]),
            b: clamp_channel(tokens[2]),
        }
    } else {
        Rgb::BLACK
    }
}

fn numeric_tokens(s: &str) -> Vec<f64> {
    s.split(|c: char| !c.is_ascii_digit() && c != '.' && c != '-')
        .filter(|tok| !tok.is_empty())
        .filter_map(|tok| tok.parse::<f64>().ok())
        .collect()
}

fn clamp_channel(v: f64) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

fn opaque_white() -> ParsedColor {
    ParsedColor {
        hex: "#ffffff".to_string(),
        alpha: 1.0,
    }
}
