//! Shape, spacing, elevation, border and motion scales.
//!
//! Every scale is a fixed set of multipliers of the configured base unit so
//! the resulting token names never depend on the input.

use crate::color::Color;
use crate::config::{CornerStyle, ShapeConfig, SpacingConfig};
use crate::tokens::{TokenSet, px};

/// Corner radius multipliers of the base unit.
const CORNERS: [(&str, f64); 6] = [
    ("none", 0.0),
    ("extra-small", 1.0),
    ("small", 2.0),
    ("medium", 3.0),
    ("large", 4.0),
    ("extra-large", 7.0),
];

/// Spacing multipliers of the base unit.
const SPACING: [(&str, f64); 10] = [
    ("none", 0.0),
    ("xxs", 1.0),
    ("xs", 2.0),
    ("sm", 3.0),
    ("md", 4.0),
    ("lg", 6.0),
    ("xl", 8.0),
    ("2xl", 12.0),
    ("3xl", 16.0),
    ("4xl", 20.0),
];

/// `(y offset, blur, alpha)` per elevation level above zero.
const ELEVATION: [(f64, f64, f64); 5] = [
    (1.0, 3.0, 0.15),
    (2.0, 6.0, 0.18),
    (4.0, 8.0, 0.2),
    (6.0, 10.0, 0.22),
    (8.0, 12.0, 0.25),
];

/// Highest elevation level.
pub const MAX_ELEVATION: u8 = 5;

const BORDER_WIDTHS: [(&str, f64); 3] = [("thin", 1.0), ("medium", 2.0), ("thick", 4.0)];

const MOTION: [(&str, &str); 4] = [
    ("motion-duration-short", "100ms"),
    ("motion-duration-medium", "250ms"),
    ("motion-duration-long", "400ms"),
    ("motion-easing-standard", "cubic-bezier(0.2, 0, 0, 1)"),
];

/// `shape-corner-*`.
pub fn write_shape_tokens(shape: &ShapeConfig, spacing: &SpacingConfig, tokens: &mut TokenSet) {
    let factor = shape.corner_style.factor();
    for (name, multiplier) in CORNERS {
        tokens.insert(format!("shape-corner-{name}"), px(spacing.base_unit * multiplier * factor));
    }
    let full = if shape.corner_style == CornerStyle::Sharp { "0px" } else { "9999px" };
    tokens.insert("shape-corner-full", full);
}

/// `spacing-*`.
pub fn write_spacing_tokens(spacing: &SpacingConfig, tokens: &mut TokenSet) {
    for (name, multiplier) in SPACING {
        tokens.insert(format!("spacing-{name}"), px(spacing.base_unit * multiplier));
    }
}

/// CSS box shadow for an elevation level, tinted with `shadow`.
pub fn elevation_shadow(level: u8, shadow: Color) -> String {
    match level {
        0 => "none".to_string(),
        level => {
            let (y, blur, alpha) = ELEVATION[usize::from(level.min(MAX_ELEVATION)) - 1];
            format!("0px {} {} {}", px(y), px(blur), shadow.to_rgba_string(alpha))
        }
    }
}

/// `elevation-level-0` to `elevation-level-5`.
pub fn write_elevation_tokens(shadow: Color, tokens: &mut TokenSet) {
    for level in 0..=MAX_ELEVATION {
        tokens.insert(format!("elevation-level-{level}"), elevation_shadow(level, shadow));
    }
}

/// `border-width-*` and `motion-*`.
pub fn write_border_and_motion_tokens(tokens: &mut TokenSet) {
    for (name, width) in BORDER_WIDTHS {
        tokens.insert(format!("border-width-{name}"), px(width));
    }
    for (name, value) in MOTION {
        tokens.insert(name, value);
    }
}
