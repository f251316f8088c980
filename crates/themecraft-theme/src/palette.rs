//! Tonal palettes: eleven lightness steps of one hue.

use crate::color::{Color, Oklch};

/// Palette step names, lightest first.
pub const TONE_STEPS: [u16; 11] = [50, 100, 200, 300, 400, 500, 600, 700, 800, 900, 950];

/// OKLCH lightness of each step.
const LIGHTNESS: [f64; 11] = [0.97, 0.93, 0.87, 0.78, 0.69, 0.60, 0.51, 0.43, 0.35, 0.27, 0.20];

/// Fraction of the seed chroma kept at each step; extremes are desaturated.
const CHROMA_SCALE: [f64; 11] = [0.25, 0.4, 0.6, 0.8, 0.95, 1.0, 0.95, 0.85, 0.75, 0.6, 0.45];

/// Chroma used for a neutral palette derived from another seed.
pub const NEUTRAL_CHROMA: f64 = 0.015;

/// Chroma multiplier for a secondary palette derived from the primary seed.
pub const SECONDARY_CHROMA_SCALE: f64 = 0.35;

/// Eleven colors sharing a hue, indexed by [`TONE_STEPS`].
#[derive(Debug, Clone, PartialEq)]
pub struct TonalPalette {
    tones: [Color; 11],
}

impl TonalPalette {
    /// Palette following the seed's hue and chroma.
    pub fn from_seed(seed: Color) -> Self {
        let lch = seed.to_oklch();
        Self::from_hue_chroma(lch.h, lch.c)
    }

    pub fn from_hue_chroma(hue: f64, chroma: f64) -> Self {
        let tones = std::array::from_fn(|i| {
            Oklch::new(LIGHTNESS[i], chroma * CHROMA_SCALE[i], hue)
                .to_color()
                .quantized()
        });
        Self { tones }
    }

    /// Color at a named step. Unknown steps return `None`.
    pub fn tone(&self, step: u16) -> Option<Color> {
        TONE_STEPS
            .iter()
            .position(|s| *s == step)
            .map(|i| self.tones[i])
    }

    /// `(step, color)` pairs, lightest first.
    pub fn iter(&self) -> impl Iterator<Item = (u16, Color)> + '_ {
        TONE_STEPS.iter().copied().zip(self.tones.iter().copied())
    }

    pub fn lightest(&self) -> Color {
        self.tones[0]
    }

    pub fn darkest(&self) -> Color {
        self.tones[10]
    }
}
