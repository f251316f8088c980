//! Declarative design configuration.
//!
//! A configuration is replaced wholesale whenever the user changes a choice;
//! it is never patched in place. Every optional field has a default so a
//! minimal JSON document only needs a primary seed color.

use crate::color::Color;
use crate::contrast::ContrastTarget;
use crate::error::{ThemeError, ThemeResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Seed colors. Only `primary` is required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorSeeds {
    pub primary: String,
    /// Derived from the primary seed when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary: Option<String>,
    /// No tertiary tokens are emitted when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tertiary: Option<String>,
    /// Derived from the primary hue when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neutral: Option<String>,
    /// Defaults to [`DEFAULT_ERROR_SEED`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub const DEFAULT_ERROR_SEED: &str = "#ba1a1a";

impl ColorSeeds {
    pub fn new(primary: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            secondary: None,
            tertiary: None,
            neutral: None,
            error: None,
        }
    }
}

/// Which palette steps the semantic color roles map to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    #[default]
    Light,
    Dark,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypographyConfig {
    pub heading_family: String,
    pub body_family: String,
    pub mono_family: String,
    /// Body size in px.
    pub base_size: f64,
    /// Ratio between adjacent type-scale steps.
    pub scale_ratio: f64,
}

impl Default for TypographyConfig {
    fn default() -> Self {
        Self {
            heading_family: "Inter, system-ui, sans-serif".to_string(),
            body_family: "Inter, system-ui, sans-serif".to_string(),
            mono_family: "'JetBrains Mono', ui-monospace, monospace".to_string(),
            base_size: 16.0,
            scale_ratio: 1.2,
        }
    }
}

/// How rounded corners are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CornerStyle {
    Sharp,
    Subtle,
    #[default]
    Rounded,
    Pill,
}

impl CornerStyle {
    /// Multiplier applied to the corner scale.
    pub fn factor(self) -> f64 {
        match self {
            CornerStyle::Sharp => 0.0,
            CornerStyle::Subtle => 0.5,
            CornerStyle::Rounded => 1.0,
            CornerStyle::Pill => 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeConfig {
    pub corner_style: CornerStyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpacingConfig {
    /// Base unit in px; spacing and corner scales are multiples of it.
    pub base_unit: f64,
}

impl Default for SpacingConfig {
    fn default() -> Self {
        Self { base_unit: 4.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextCasing {
    #[default]
    None,
    Uppercase,
    Lowercase,
    Capitalize,
}

impl TextCasing {
    /// CSS `text-transform` value.
    pub fn as_css(self) -> &'static str {
        match self {
            TextCasing::None => "none",
            TextCasing::Uppercase => "uppercase",
            TextCasing::Lowercase => "lowercase",
            TextCasing::Capitalize => "capitalize",
        }
    }
}

/// Per-component style hints. Unset fields use the component's default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentHints {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elevation: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_casing: Option<TextCasing>,
}

/// Everything the derivation engine needs to produce a token set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignConfiguration {
    #[serde(default = "default_name")]
    pub name: String,
    pub colors: ColorSeeds,
    #[serde(default)]
    pub scheme: ColorScheme,
    #[serde(default)]
    pub contrast: ContrastTarget,
    #[serde(default)]
    pub typography: TypographyConfig,
    #[serde(default)]
    pub shape: ShapeConfig,
    #[serde(default)]
    pub spacing: SpacingConfig,
    /// Hints keyed by catalog component name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub components: BTreeMap<String, ComponentHints>,
}

fn default_name() -> String {
    "Themecraft".to_string()
}

impl DesignConfiguration {
    /// Configuration with defaults everywhere except the primary seed.
    pub fn new(primary: impl Into<String>) -> Self {
        Self {
            name: default_name(),
            colors: ColorSeeds::new(primary),
            scheme: ColorScheme::default(),
            contrast: ContrastTarget::default(),
            typography: TypographyConfig::default(),
            shape: ShapeConfig::default(),
            spacing: SpacingConfig::default(),
            components: BTreeMap::new(),
        }
    }

    pub fn from_json(json: &str) -> ThemeResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> ThemeResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check every field before derivation.
    pub fn validate(&self) -> ThemeResult<()> {
        for seed in self.seed_strings() {
            Color::from_hex(seed)?;
        }

        let spacing = self.spacing.base_unit;
        if !spacing.is_finite() || spacing <= 0.0 {
            return Err(invalid(format!("spacing base unit must be positive, got {spacing}")));
        }
        let size = self.typography.base_size;
        if !size.is_finite() || size <= 0.0 {
            return Err(invalid(format!("typography base size must be positive, got {size}")));
        }
        let ratio = self.typography.scale_ratio;
        if !ratio.is_finite() || ratio <= 1.0 || ratio > 2.0 {
            return Err(invalid(format!("type scale ratio must be in (1, 2], got {ratio}")));
        }
        let target = self.contrast.ratio();
        if !target.is_finite() || !(1.0..=21.0).contains(&target) {
            return Err(invalid(format!("contrast target must be in [1, 21], got {target}")));
        }
        let families = [
            ("heading", &self.typography.heading_family),
            ("body", &self.typography.body_family),
            ("mono", &self.typography.mono_family),
        ];
        for (role, family) in families {
            if family.trim().is_empty() {
                return Err(invalid(format!("{role} font family is empty")));
            }
        }
        Ok(())
    }

    fn seed_strings(&self) -> impl Iterator<Item = &String> {
        let seeds = &self.colors;
        std::iter::once(&seeds.primary).chain(
            [&seeds.secondary, &seeds.tertiary, &seeds.neutral, &seeds.error]
                .into_iter()
                .flatten(),
        )
    }
}

fn invalid(message: String) -> ThemeError {
    ThemeError::InvalidConfiguration(message)
}
