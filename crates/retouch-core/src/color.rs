//! RGBA8 colour values used by pixel operations and configuration.

use image::Rgba;
use peniko::Color;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors produced when parsing a hex colour string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorParseError {
    #[error("colour must start with '#': {0}")]
    MissingHash(String),
    #[error("expected 3, 6 or 8 hex digits: {0}")]
    BadLength(String),
    #[error("invalid hex digit in colour: {0}")]
    BadDigit(String),
}

/// Straight-alpha RGBA8 colour.
///
/// Serialized as a `#rrggbbaa` hex string so configuration files stay readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PixelColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl PixelColor {
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque colour.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Self::new(self.r, self.g, self.b, a)
    }

    pub fn to_rgba(self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, self.a])
    }

    pub fn from_rgba(px: Rgba<u8>) -> Self {
        let [r, g, b, a] = px.0;
        Self::new(r, g, b, a)
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`.
    pub fn parse(s: &str) -> Result<Self, ColorParseError> {
        let hex = s
            .strip_prefix('#')
            .ok_or_else(|| ColorParseError::MissingHash(s.to_string()))?;
        let digit = |c: char| {
            c.to_digit(16)
                .map(|d| d as u8)
                .ok_or_else(|| ColorParseError::BadDigit(s.to_string()))
        };
        let digits = hex.chars().map(digit).collect::<Result<Vec<u8>, _>>()?;
        match digits.as_slice() {
            [r, g, b] => Ok(Self::rgb(r * 17, g * 17, b * 17)),
            [r1, r0, g1, g0, b1, b0] => Ok(Self::rgb(r1 << 4 | r0, g1 << 4 | g0, b1 << 4 | b0)),
            [r1, r0, g1, g0, b1, b0, a1, a0] => Ok(Self::new(
                r1 << 4 | r0,
                g1 << 4 | g0,
                b1 << 4 | b0,
                a1 << 4 | a0,
            )),
            _ => Err(ColorParseError::BadLength(s.to_string())),
        }
    }

    /// Source-over composite of `self` onto a straight-alpha destination pixel.
    pub fn composite_over(self, dst: Rgba<u8>) -> Rgba<u8> {
        let src_a = self.a as f64 / 255.0;
        let dst_a = dst[3] as f64 / 255.0;
        let out_a = src_a + dst_a * (1.0 - src_a);
        if out_a <= 0.0 {
            return Rgba([0, 0, 0, 0]);
        }
        let channel = |s: u8, d: u8| {
            ((s as f64 * src_a + d as f64 * dst_a * (1.0 - src_a)) / out_a)
                .round()
                .clamp(0.0, 255.0) as u8
        };
        Rgba([
            channel(self.r, dst[0]),
            channel(self.g, dst[1]),
            channel(self.b, dst[2]),
            (out_a * 255.0).round() as u8,
        ])
    }
}

impl Default for PixelColor {
    fn default() -> Self {
        Self::BLACK
    }
}

impl fmt::Display for PixelColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
    }
}

impl FromStr for PixelColor {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PixelColor {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PixelColor> for String {
    fn from(color: PixelColor) -> Self {
        color.to_string()
    }
}

impl From<Color> for PixelColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self::new(rgba.r, rgba.g, rgba.b, rgba.a)
    }
}

impl From<PixelColor> for Color {
    fn from(color: PixelColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Composite `src` onto `dst`, both straight alpha.
pub fn blend_over(dst: Rgba<u8>, src: Rgba<u8>) -> Rgba<u8> {
    PixelColor::from_rgba(src).composite_over(dst)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_forms() {
        assert_eq!(PixelColor::parse("#f00").unwrap(), PixelColor::rgb(255, 0, 0));
        assert_eq!(PixelColor::parse("#0000FF").unwrap(), PixelColor::rgb(0, 0, 255));
        assert_eq!(
            PixelColor::parse("#ff000080").unwrap(),
            PixelColor::new(255, 0, 0, 128)
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            PixelColor::parse("ff0000"),
            Err(ColorParseError::MissingHash(_))
        ));
        assert!(matches!(
            PixelColor::parse("#ff00"),
            Err(ColorParseError::BadLength(_))
        ));
        assert!(matches!(
            PixelColor::parse("#gg0000"),
            Err(ColorParseError::BadDigit(_))
        ));
    }

    #[test]
    fn test_display_roundtrip() {
        let c = PixelColor::new(1, 2, 3, 4);
        assert_eq!(c.to_string(), "#01020304");
        assert_eq!(c.to_string().parse::<PixelColor>().unwrap(), c);
    }

    #[test]
    fn test_opaque_over_anything_is_source() {
        let out = PixelColor::rgb(10, 20, 30).composite_over(Rgba([200, 200, 200, 255]));
        assert_eq!(out, Rgba([10, 20, 30, 255]));
    }

    #[test]
    fn test_half_alpha_over_opaque() {
        let out = PixelColor::new(255, 0, 0, 128).composite_over(Rgba([0, 0, 255, 255]));
        assert_eq!(out[3], 255);
        assert!((out[0] as i32 - 128).abs() <= 1);
        assert!((out[2] as i32 - 127).abs() <= 1);
    }

    #[test]
    fn test_peniko_conversion() {
        let color: Color = PixelColor::new(0, 120, 212, 255).into();
        assert_eq!(PixelColor::from(color), PixelColor::new(0, 120, 212, 255));
    }
}
