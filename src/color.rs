//! Background colour specifications.
//!
//! Accepts the CSS forms people actually type on a command line:
//! `#fff`, `#ffffff`, `#ffffff80`, `rgb(255,255,255)`, `rgba(0,0,0,0.5)`
//! and a handful of named colours.

use crate::error::Pdf2ImgError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An 8-bit RGBA colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn is_opaque(&self) -> bool {
        self.a == 255
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_opaque() {
            write!(f, "rgb({},{},{})", self.r, self.g, self.b)
        } else {
            let alpha = self.a as f32 / 255.0;
            write!(f, "rgba({},{},{},{:.3})", self.r, self.g, self.b, alpha)
        }
    }
}

static RE_HEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#([0-9a-fA-F]{3}|[0-9a-fA-F]{6}|[0-9a-fA-F]{8})$").unwrap());
static RE_RGB: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^rgba?\(\s*(\d{1,3})\s*,\s*(\d{1,3})\s*,\s*(\d{1,3})\s*(?:,\s*([0-9]*\.?[0-9]+)\s*)?\)$")
        .unwrap()
});

fn named(name: &str) -> Option<Color> {
    let c = match name {
        "white" => Color::WHITE,
        "black" => Color::BLACK,
        "transparent" => Color::TRANSPARENT,
        "red" => Color::rgb(255, 0, 0),
        "green" => Color::rgb(0, 128, 0),
        "lime" => Color::rgb(0, 255, 0),
        "blue" => Color::rgb(0, 0, 255),
        "yellow" => Color::rgb(255, 255, 0),
        "cyan" | "aqua" => Color::rgb(0, 255, 255),
        "magenta" | "fuchsia" => Color::rgb(255, 0, 255),
        "gray" | "grey" => Color::rgb(128, 128, 128),
        "silver" => Color::rgb(192, 192, 192),
        "lightgray" | "lightgrey" => Color::rgb(211, 211, 211),
        "darkgray" | "darkgrey" => Color::rgb(169, 169, 169),
        "navy" => Color::rgb(0, 0, 128),
        "maroon" => Color::rgb(128, 0, 0),
        "olive" => Color::rgb(128, 128, 0),
        "purple" => Color::rgb(128, 0, 128),
        "teal" => Color::rgb(0, 128, 128),
        "orange" => Color::rgb(255, 165, 0),
        _ => return None,
    };
    Some(c)
}

fn invalid(spec: &str, reason: &str) -> Pdf2ImgError {
    Pdf2ImgError::InvalidConfig(format!(
        "invalid background colour '{spec}': {reason} \
         (expected e.g. 'white', '#ffffff', 'rgb(255,255,255)' or 'rgba(255,255,255,0.5)')"
    ))
}

impl FromStr for Color {
    type Err = Pdf2ImgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let spec = s.trim();

        if let Some(c) = named(&spec.to_ascii_lowercase()) {
            return Ok(c);
        }

        if let Some(caps) = RE_HEX.captures(spec) {
            let hex = &caps[1];
            let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);
            let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).map(|v| v * 17);
            let parsed = match hex.len() {
                3 => (nibble(0), nibble(1), nibble(2), Ok(255)),
                6 => (byte(0), byte(2), byte(4), Ok(255)),
                _ => (byte(0), byte(2), byte(4), byte(6)),
            };
            return match parsed {
                (Ok(r), Ok(g), Ok(b), Ok(a)) => Ok(Color::rgba(r, g, b, a)),
                _ => Err(invalid(s, "bad hex digits")),
            };
        }

        let lower = spec.to_ascii_lowercase();
        if let Some(caps) = RE_RGB.captures(&lower) {
            let channel = |i: usize| -> Result<u8, Pdf2ImgError> {
                caps[i]
                    .parse::<u16>()
                    .ok()
                    .and_then(|v| u8::try_from(v).ok())
                    .ok_or_else(|| invalid(s, "channels must be 0-255"))
            };
            let (r, g, b) = (channel(1)?, channel(2)?, channel(3)?);
            let is_rgba = lower.starts_with("rgba");
            let a = match (caps.get(4), is_rgba) {
                (Some(m), true) => {
                    let alpha: f32 = m.as_str().parse().map_err(|_| invalid(s, "bad alpha"))?;
                    if !(0.0..=1.0).contains(&alpha) {
                        return Err(invalid(s, "alpha must be between 0 and 1"));
                    }
                    (alpha * 255.0).round() as u8
                }
                (None, false) => 255,
                (None, true) => return Err(invalid(s, "rgba() needs four components")),
                (Some(_), false) => return Err(invalid(s, "rgb() takes three components")),
            };
            return Ok(Color::rgba(r, g, b, a));
        }

        Err(invalid(s, "unrecognised colour"))
    }
}
