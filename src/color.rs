//! Color token validation.
//!
//! Accepted tokens are `#` hex (3 to 8 digits), bare hex (3, 4, 6 or 8
//! digits), `0x` hex (6 to 8 digits), alphabetic names, `rgb(r,g,b)` and
//! `rgba(r,g,b,a)`. Validation never fails loudly: an invalid token is
//! `None` and callers fall through to their next color source.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while_m_n},
    character::complete::{alpha1, char, digit1},
    combinator::{all_consuming, map_res, opt, recognize},
    sequence::{pair, preceded, tuple},
    IResult,
};

use crate::parser::lexer::ws;

/// Builtin fallback fill. Also the reserved sentinel that never becomes a
/// palette default key and is never emitted by the grid encoder.
pub const DEFAULT_COLOR: &str = "#2c7be5";

fn is_hex(c: char) -> bool {
    c.is_ascii_hexdigit()
}

fn hex_color(input: &str) -> IResult<&str, &str> {
    recognize(preceded(char('#'), take_while_m_n(3, 8, is_hex)))(input)
}

fn channel(input: &str) -> IResult<&str, u32> {
    ws(map_res(digit1, |s: &str| s.parse::<u32>()))(input)
}

fn alpha_value(input: &str) -> IResult<&str, &str> {
    ws(alt((
        recognize(pair(opt(char('0')), pair(char('.'), digit1))),
        tag("0"),
        tag("1"),
    )))(input)
}

fn rgb(input: &str) -> IResult<&str, (u32, u32, u32)> {
    let (input, (_, r, _, g, _, b, _)) =
        tuple((tag("rgb("), channel, char(','), channel, char(','), channel, char(')')))(input)?;
    Ok((input, (r, g, b)))
}

fn rgba(input: &str) -> IResult<&str, (u32, u32, u32, &str)> {
    let (input, (_, r, _, g, _, b, _, a, _)) = tuple((
        tag("rgba("),
        channel,
        char(','),
        channel,
        char(','),
        channel,
        char(','),
        alpha_value,
        char(')'),
    ))(input)?;
    Ok((input, (r, g, b, a)))
}

// Function forms must be tried before bare names: `alpha1` would accept the
// `rgb` prefix and leave the arguments unconsumed.
fn is_valid_token(token: &str) -> bool {
    all_consuming(alt((
        hex_color,
        recognize(rgb),
        recognize(rgba),
        alpha1,
    )))(token)
    .is_ok()
}

/// Normalize and validate a raw color token
pub fn sanitize_color(input: &str) -> Option<String> {
    let s = input.trim();
    if s.is_empty() {
        return None;
    }

    let digits_only = |h: &str| h.chars().all(is_hex);
    let normalized = match s.strip_prefix("0x") {
        Some(hex) if (6..=8).contains(&hex.len()) && digits_only(hex) => format!("#{hex}"),
        _ if matches!(s.len(), 3 | 4 | 6 | 8) && digits_only(s) => format!("#{s}"),
        _ => s.to_string(),
    };

    is_valid_token(&normalized).then_some(normalized)
}

/// Whether a palette value is the reserved default color, with or without `#`
pub fn is_sentinel(value: &str) -> bool {
    let hex = value.trim();
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    format!("#{}", hex.to_lowercase()) == DEFAULT_COLOR
}

/// Concrete RGB + alpha for raster output
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Rgba { r, g, b, a: 1.0 }
    }
}

/// Decode a sanitized token into channels. Names outside the builtin table yield `None`.
pub fn to_rgba(token: &str) -> Option<Rgba> {
    let token = token.trim();
    if let Some(hex) = token.strip_prefix('#') {
        return parse_hex(hex);
    }
    if let Ok((_, (r, g, b))) = all_consuming(rgb)(token) {
        return Some(Rgba::rgb(clamp(r), clamp(g), clamp(b)));
    }
    if let Ok((_, (r, g, b, a))) = all_consuming(rgba)(token) {
        let a = a.parse::<f64>().ok()?;
        return Some(Rgba { r: clamp(r), g: clamp(g), b: clamp(b), a });
    }
    named(&token.to_lowercase())
}

fn clamp(v: u32) -> u8 {
    v.min(255) as u8
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    if !hex.chars().all(is_hex) {
        return None;
    }
    match hex.len() {
        3 => Some(Rgba::rgb(nibble(0)?, nibble(1)?, nibble(2)?)),
        4 => Some(Rgba {
            a: nibble(3)? as f64 / 255.0,
            ..Rgba::rgb(nibble(0)?, nibble(1)?, nibble(2)?)
        }),
        6 => Some(Rgba::rgb(byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(Rgba {
            a: byte(6)? as f64 / 255.0,
            ..Rgba::rgb(byte(0)?, byte(2)?, byte(4)?)
        }),
        _ => None,
    }
}

fn named(name: &str) -> Option<Rgba> {
    let c = match name {
        "white" => Rgba::rgb(255, 255, 255),
        "black" => Rgba::rgb(0, 0, 0),
        "red" => Rgba::rgb(255, 0, 0),
        "green" => Rgba::rgb(0, 128, 0),
        "lime" => Rgba::rgb(0, 255, 0),
        "blue" => Rgba::rgb(0, 0, 255),
        "yellow" => Rgba::rgb(255, 255, 0),
        "cyan" | "aqua" => Rgba::rgb(0, 255, 255),
        "magenta" | "fuchsia" => Rgba::rgb(255, 0, 255),
        "orange" => Rgba::rgb(255, 165, 0),
        "purple" => Rgba::rgb(128, 0, 128),
        "pink" => Rgba::rgb(255, 192, 203),
        "brown" => Rgba::rgb(165, 42, 42),
        "navy" => Rgba::rgb(0, 0, 128),
        "teal" => Rgba::rgb(0, 128, 128),
        "olive" => Rgba::rgb(128, 128, 0),
        "maroon" => Rgba::rgb(128, 0, 0),
        "silver" => Rgba::rgb(192, 192, 192),
        "gray" | "grey" => Rgba::rgb(128, 128, 128),
        "transparent" => Rgba { a: 0.0, ..Rgba::rgb(0, 0, 0) },
        _ => return None,
    };
    Some(c)
}
