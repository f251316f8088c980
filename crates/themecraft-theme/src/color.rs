//! Color spaces used by the derivation pipeline.
//!
//! Seeds arrive as sRGB hex strings. Palettes are generated in OKLCH (the
//! polar form of OKLab) so lightness steps look even across hues, then mapped
//! back into the sRGB gamut by reducing chroma.

use crate::error::{ThemeError, ThemeResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An opaque sRGB color with gamma-encoded channels in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);

    pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::rgb(r as f64 / 255.0, g as f64 / 255.0, b as f64 / 255.0)
    }

    /// Parse `#RGB` or `#RRGGBB`; the leading `#` is optional.
    pub fn from_hex(hex: &str) -> ThemeResult<Self> {
        let invalid = || ThemeError::InvalidColor(hex.to_string());
        let digits = hex.trim();
        let digits = digits.strip_prefix('#').unwrap_or(digits);
        if !digits.is_ascii() {
            return Err(invalid());
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
        match digits.len() {
            3 => {
                let r = channel(&digits[0..1])?;
                let g = channel(&digits[1..2])?;
                let b = channel(&digits[2..3])?;
                Ok(Self::from_rgb8(r * 17, g * 17, b * 17))
            }
            6 => Ok(Self::from_rgb8(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            )),
            _ => Err(invalid()),
        }
    }

    pub fn to_rgb8(self) -> (u8, u8, u8) {
        let quantize = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        (quantize(self.r), quantize(self.g), quantize(self.b))
    }

    /// Lowercase `#rrggbb`.
    pub fn to_hex(self) -> String {
        let (r, g, b) = self.to_rgb8();
        format!("#{r:02x}{g:02x}{b:02x}")
    }

    /// `rgba(r, g, b, a)` with 8-bit channels.
    pub fn to_rgba_string(self, alpha: f64) -> String {
        let (r, g, b) = self.to_rgb8();
        format!("rgba({r}, {g}, {b}, {})", (alpha.clamp(0.0, 1.0) * 100.0).round() / 100.0)
    }

    /// Snap to the nearest 8-bit color, so that later math sees exactly what
    /// is emitted as hex.
    pub fn quantized(self) -> Self {
        let (r, g, b) = self.to_rgb8();
        Self::from_rgb8(r, g, b)
    }

    /// WCAG relative luminance.
    pub fn relative_luminance(self) -> f64 {
        let [r, g, b] = self.to_linear();
        0.2126 * r + 0.7152 * g + 0.0722 * b
    }

    pub fn to_linear(self) -> [f64; 3] {
        [decode(self.r), decode(self.g), decode(self.b)]
    }

    pub fn from_linear([r, g, b]: [f64; 3]) -> Self {
        Self::rgb(encode(r), encode(g), encode(b))
    }

    pub fn in_gamut(self) -> bool {
        const EPS: f64 = 1e-6;
        [self.r, self.g, self.b]
            .iter()
            .all(|c| (-EPS..=1.0 + EPS).contains(c))
    }

    pub fn clamped(self) -> Self {
        Self::rgb(self.r.clamp(0.0, 1.0), self.g.clamp(0.0, 1.0), self.b.clamp(0.0, 1.0))
    }

    pub fn to_oklab(self) -> Oklab {
        let [r, g, b] = self.to_linear();
        let l = (0.4122214708 * r + 0.5363325363 * g + 0.0514459929 * b).cbrt();
        let m = (0.2119034982 * r + 0.6806995451 * g + 0.1073969566 * b).cbrt();
        let s = (0.0883024619 * r + 0.2817188376 * g + 0.6299787005 * b).cbrt();
        Oklab {
            l: 0.2104542553 * l + 0.7936177850 * m - 0.0040720468 * s,
            a: 1.9779984951 * l - 2.4285922050 * m + 0.4505937099 * s,
            b: 0.0259040371 * l + 0.7827717662 * m - 0.8086757660 * s,
        }
    }

    pub fn to_oklch(self) -> Oklch {
        self.to_oklab().to_oklch()
    }
}

fn decode(c: f64) -> f64 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn encode(c: f64) -> f64 {
    if c <= 0.0031308 {
        12.92 * c
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Color {
    type Err = ThemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl TryFrom<String> for Color {
    type Error = ThemeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

/// A color in the OKLab space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Oklab {
    pub l: f64,
    pub a: f64,
    pub b: f64,
}

impl Oklab {
    /// Convert to sRGB without gamut mapping; channels may fall outside `0..=1`.
    pub fn to_color_unclamped(self) -> Color {
        let l = self.l + 0.3963377774 * self.a + 0.2158037573 * self.b;
        let m = self.l - 0.1055613458 * self.a - 0.0638541728 * self.b;
        let s = self.l - 0.0894841775 * self.a - 1.2914855480 * self.b;
        let (l, m, s) = (l * l * l, m * m * m, s * s * s);
        Color::from_linear([
            4.0767416621 * l - 3.3077115913 * m + 0.2309699292 * s,
            -1.2684380046 * l + 2.6097574011 * m - 0.3413193965 * s,
            -0.0041960863 * l - 0.7034186147 * m + 1.7076147010 * s,
        ])
    }

    pub fn to_oklch(self) -> Oklch {
        let c = self.a.hypot(self.b);
        let h = self.b.atan2(self.a).to_degrees().rem_euclid(360.0);
        Oklch { l: self.l, c, h }
    }
}

/// A color in OKLCH: lightness `0..=1`, chroma, hue in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Oklch {
    pub l: f64,
    pub c: f64,
    pub h: f64,
}

impl Oklch {
    pub fn new(l: f64, c: f64, h: f64) -> Self {
        Self { l, c, h }
    }

    pub fn to_oklab(self) -> Oklab {
        let (sin, cos) = self.h.to_radians().sin_cos();
        Oklab { l: self.l, a: self.c * cos, b: self.c * sin }
    }

    /// Map into sRGB, reducing chroma until the color fits and keeping
    /// lightness and hue.
    pub fn to_color(self) -> Color {
        let l = self.l.clamp(0.0, 1.0);
        let direct = Oklch::new(l, self.c.max(0.0), self.h).to_oklab().to_color_unclamped();
        if direct.in_gamut() {
            return direct.clamped();
        }
        let (mut lo, mut hi) = (0.0, self.c.max(0.0));
        for _ in 0..24 {
            let mid = (lo + hi) / 2.0;
            if Oklch::new(l, mid, self.h).to_oklab().to_color_unclamped().in_gamut() {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        Oklch::new(l, lo, self.h).to_oklab().to_color_unclamped().clamped()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_parsing() {
        assert_eq!(Color::from_hex("#ffffff").unwrap(), Color::WHITE);
        assert_eq!(Color::from_hex("000").unwrap(), Color::BLACK);
        assert_eq!(Color::from_hex("#6750A4").unwrap().to_hex(), "#6750a4");
        assert_eq!(Color::from_hex("#abc").unwrap().to_hex(), "#aabbcc");
        assert!(matches!(Color::from_hex("#12345"), Err(ThemeError::InvalidColor(_))));
        assert!(Color::from_hex("#gggggg").is_err());
        assert!(Color::from_hex("#ééé").is_err());
    }

    #[test]
    fn test_serde_as_hex_string() {
        let json = serde_json::to_string(&Color::from_rgb8(255, 0, 128)).unwrap();
        assert_eq!(json, "\"#ff0080\"");
        let back: Color = serde_json::from_str(&json).unwrap();
        assert_eq!(back.to_hex(), "#ff0080");
        assert!(serde_json::from_str::<Color>("\"red\"").is_err());
    }

    #[test]
    fn test_luminance_extremes() {
        assert!((Color::WHITE.relative_luminance() - 1.0).abs() < 1e-9);
        assert_eq!(Color::BLACK.relative_luminance(), 0.0);
    }

    #[test]
    fn test_oklab_of_white() {
        let lab = Color::WHITE.to_oklab();
        assert!((lab.l - 1.0).abs() < 1e-4);
        assert!(lab.a.abs() < 1e-4);
        assert!(lab.b.abs() < 1e-4);
    }

    #[test]
    fn test_oklch_round_trip_preserves_color() {
        let color = Color::from_hex("#3366cc").unwrap();
        let back = color.to_oklch().to_color();
        assert_eq!(back.to_hex(), "#3366cc");
    }

    #[test]
    fn test_gamut_mapping_reduces_chroma() {
        // Far outside sRGB at this lightness.
        let wild = Oklch::new(0.6, 0.5, 150.0);
        assert!(!wild.to_oklab().to_color_unclamped().in_gamut());
        let mapped = wild.to_color();
        assert!(mapped.in_gamut());
        let back = mapped.to_oklch();
        assert!((back.l - 0.6).abs() < 0.01);
        assert!(back.c < 0.5);
    }

    #[test]
    fn test_rgba_string() {
        assert_eq!(Color::BLACK.to_rgba_string(0.3), "rgba(0, 0, 0, 0.3)");
    }
}
