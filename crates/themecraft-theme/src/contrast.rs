//! WCAG contrast checks and text-on-color pairing.

use crate::color::{Color, Oklch};
use serde::{Deserialize, Serialize};

/// Lightness step used when a background has to be nudged to reach a target.
const ADJUST_STEP: f64 = 0.01;

/// Minimum contrast ratio required for text on a colored surface.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum ContrastTarget {
    /// 4.5:1
    #[default]
    #[serde(rename = "AA")]
    Aa,
    /// 7:1
    #[serde(rename = "AAA")]
    Aaa,
    #[serde(rename = "custom")]
    Custom(f64),
}

impl ContrastTarget {
    pub fn ratio(self) -> f64 {
        match self {
            ContrastTarget::Aa => 4.5,
            ContrastTarget::Aaa => 7.0,
            ContrastTarget::Custom(ratio) => ratio,
        }
    }
}

/// WCAG 2 contrast ratio between two colors, in `1.0..=21.0`.
pub fn contrast_ratio(a: Color, b: Color) -> f64 {
    let (la, lb) = (a.relative_luminance(), b.relative_luminance());
    let (light, dark) = if la >= lb { (la, lb) } else { (lb, la) };
    (light + 0.05) / (dark + 0.05)
}

/// Result of [`pick_foreground`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContrastChoice {
    pub background: Color,
    pub foreground: Color,
    pub ratio: f64,
    /// The background had to be changed to reach the target.
    pub adjusted: bool,
}

/// Choose a foreground for `background` that meets `target`.
///
/// Candidates are tried in order and the first passing one wins. When none
/// passes, the background lightness is moved away from whichever of black or
/// white contrasts best until the target is met.
pub fn pick_foreground(background: Color, candidates: &[Color], target: f64) -> ContrastChoice {
    let background = background.quantized();
    for candidate in candidates {
        let foreground = candidate.quantized();
        let ratio = contrast_ratio(background, foreground);
        if ratio >= target {
            return ContrastChoice { background, foreground, ratio, adjusted: false };
        }
    }

    let foreground = if contrast_ratio(background, Color::WHITE) >= contrast_ratio(background, Color::BLACK) {
        Color::WHITE
    } else {
        Color::BLACK
    };
    let direction = if foreground == Color::WHITE { -1.0 } else { 1.0 };
    let lch = background.to_oklch();
    let mut adjusted = background;
    let mut lightness = lch.l;
    while contrast_ratio(adjusted, foreground) < target && (0.0..=1.0).contains(&lightness) {
        lightness += direction * ADJUST_STEP;
        adjusted = Oklch::new(lightness.clamp(0.0, 1.0), lch.c, lch.h).to_color().quantized();
    }
    log::debug!(
        "Adjusted background {} to {} to reach contrast {target}",
        background.to_hex(),
        adjusted.to_hex()
    );
    ContrastChoice {
        background: adjusted,
        foreground,
        ratio: contrast_ratio(adjusted, foreground),
        adjusted: true,
    }
}

/// A checked text-on-color token pair, reported alongside the token set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContrastPairing {
    /// Background token name.
    pub background: String,
    /// Foreground token name.
    pub foreground: String,
    pub ratio: f64,
    pub target: f64,
    pub adjusted: bool,
}

impl ContrastPairing {
    pub fn passes(&self) -> bool {
        self.ratio >= self.target
    }
}
