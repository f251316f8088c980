//! Component catalog: which tokens each component's styles are built from.
//!
//! A catalog only names tokens. Checking them against a derived token set
//! and substituting fallbacks is the job of [`crate::variants`].

use crate::error::ThemeResult;
use crate::tokens::TokenCategory;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Built-in components with their default elevation level.
///
/// Derivation emits `component-{name}-shadow` and
/// `component-{name}-text-transform` hint tokens for each of these.
pub const STANDARD_COMPONENTS: [(&str, u8); 7] = [
    ("button", 1),
    ("card", 1),
    ("chip", 0),
    ("dialog", 3),
    ("fab", 3),
    ("input-field", 0),
    ("toolbar", 2),
];

/// A reference to a token, with an optional explicit fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRef {
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<String>,
}

impl TokenRef {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into(), fallback: None }
    }

    pub fn with_fallback(token: impl Into<String>, fallback: impl Into<String>) -> Self {
        Self { token: token.into(), fallback: Some(fallback.into()) }
    }

    /// Substitutes to try when `token` is absent: the explicit fallback,
    /// then the default for the token's category.
    pub fn fallback_chain(&self) -> impl Iterator<Item = &str> {
        let category = default_fallback(&self.token).filter(|name| *name != self.token);
        self.fallback.as_deref().into_iter().chain(category)
    }
}

/// Documented fallback for a missing token, chosen by category.
///
/// | Category | Fallback |
/// |---|---|
/// | color | `color-primary` |
/// | typography | the `body-medium` value of the same property |
/// | shape | `shape-corner-medium` |
/// | spacing | `spacing-md` |
/// | elevation, component shadow | `elevation-level-1` |
/// | border | `border-width-thin` |
/// | motion | `motion-duration-medium` |
pub fn default_fallback(token: &str) -> Option<&'static str> {
    match TokenCategory::of(token) {
        TokenCategory::Color => Some("color-primary"),
        TokenCategory::Typography => {
            const TYPE_FALLBACKS: [(&str, &str); 4] = [
                ("-line-height", "typescale-body-medium-line-height"),
                ("-size", "typescale-body-medium-size"),
                ("-weight", "typescale-body-medium-weight"),
                ("-family", "font-family-body"),
            ];
            TYPE_FALLBACKS
                .iter()
                .find(|(suffix, _)| token.ends_with(suffix))
                .map(|(_, fallback)| *fallback)
        }
        TokenCategory::Shape => Some("shape-corner-medium"),
        TokenCategory::Spacing => Some("spacing-md"),
        TokenCategory::Elevation => Some("elevation-level-1"),
        TokenCategory::Border => Some("border-width-thin"),
        TokenCategory::Motion => Some("motion-duration-medium"),
        TokenCategory::Component if token.ends_with("-shadow") => Some("elevation-level-1"),
        TokenCategory::Component | TokenCategory::Other => None,
    }
}

/// A style property as declared in a catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum StyleRule {
    Token(TokenRef),
    Literal { value: String },
    Gradient { from: TokenRef, to: TokenRef, angle_degrees: f64 },
}

/// Catalog entry for one component.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ComponentSpec {
    #[serde(default)]
    pub description: String,
    pub base: BTreeMap<String, StyleRule>,
    /// Variant name to the properties it overrides.
    #[serde(default)]
    pub variants: BTreeMap<String, BTreeMap<String, StyleRule>>,
}

impl ComponentSpec {
    pub fn new(description: impl Into<String>) -> Self {
        Self { description: description.into(), ..Default::default() }
    }

    pub fn with_base<'a>(mut self, rules: impl IntoIterator<Item = (&'a str, StyleRule)>) -> Self {
        self.base
            .extend(rules.into_iter().map(|(property, rule)| (property.to_string(), rule)));
        self
    }

    pub fn with_variant<'a>(
        mut self,
        name: &str,
        overrides: impl IntoIterator<Item = (&'a str, StyleRule)>,
    ) -> Self {
        let overrides = overrides
            .into_iter()
            .map(|(property, rule)| (property.to_string(), rule))
            .collect();
        self.variants.insert(name.to_string(), overrides);
        self
    }

    /// A variant identical to the base style.
    pub fn with_plain_variant(mut self, name: &str) -> Self {
        self.variants.insert(name.to_string(), BTreeMap::new());
        self
    }
}

/// Named components, in name order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ComponentCatalog {
    pub components: BTreeMap<String, ComponentSpec>,
}

impl ComponentCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, spec: ComponentSpec) {
        self.components.insert(name.into(), spec);
    }

    pub fn get(&self, name: &str) -> Option<&ComponentSpec> {
        self.components.get(name)
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn from_json(json: &str) -> ThemeResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> ThemeResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The built-in catalog.
    pub fn standard() -> Self {
        let mut catalog = Self::new();
        catalog.insert("button", button());
        catalog.insert("card", card());
        catalog.insert("chip", chip());
        catalog.insert("dialog", dialog());
        catalog.insert("fab", fab());
        catalog.insert("input-field", input_field());
        catalog.insert("toolbar", toolbar());
        catalog
    }
}

fn token(name: &str) -> StyleRule {
    StyleRule::Token(TokenRef::new(name))
}

fn token_or(name: &str, fallback: &str) -> StyleRule {
    StyleRule::Token(TokenRef::with_fallback(name, fallback))
}

fn literal(value: &str) -> StyleRule {
    StyleRule::Literal { value: value.to_string() }
}

fn outline() -> [(&'static str, StyleRule); 3] {
    [
        ("border-style", literal("solid")),
        ("border-width", token("border-width-thin")),
        ("border-color", token("color-outline")),
    ]
}

fn button() -> ComponentSpec {
    ComponentSpec::new("Clickable action with a text label")
        .with_base([
            ("background-color", token("color-primary")),
            ("color", token("color-on-primary")),
            ("border-radius", token("shape-corner-medium")),
            ("border-style", literal("none")),
            ("padding-block", token("spacing-sm")),
            ("padding-inline", token("spacing-lg")),
            ("font-family", token("typescale-label-large-family")),
            ("font-size", token("typescale-label-large-size")),
            ("font-weight", token("typescale-label-large-weight")),
            ("line-height", token("typescale-label-large-line-height")),
            ("text-transform", token("component-button-text-transform")),
            ("box-shadow", token("component-button-shadow")),
            ("transition-duration", token("motion-duration-short")),
        ])
        .with_plain_variant("filled")
        .with_variant(
            "outlined",
            [
                ("background-color", literal("transparent")),
                ("color", token("color-primary")),
                ("box-shadow", token("elevation-level-0")),
            ]
            .into_iter()
            .chain(outline()),
        )
        .with_variant(
            "text",
            [
                ("background-color", literal("transparent")),
                ("color", token("color-primary")),
                ("box-shadow", token("elevation-level-0")),
                ("padding-inline", token("spacing-sm")),
            ],
        )
        .with_variant(
            "tonal",
            [
                ("background-color", token("color-secondary-container")),
                ("color", token("color-on-secondary-container")),
            ],
        )
        .with_variant(
            "gradient",
            [
                (
                    "background-image",
                    StyleRule::Gradient {
                        from: TokenRef::new("color-primary"),
                        to: TokenRef::with_fallback("color-tertiary", "color-secondary"),
                        angle_degrees: 135.0,
                    },
                ),
                ("color", token("color-on-primary")),
            ],
        )
        .with_variant(
            "tertiary",
            [
                ("background-color", token_or("color-tertiary", "color-secondary")),
                ("color", token_or("color-on-tertiary", "color-on-secondary")),
            ],
        )
}

fn card() -> ComponentSpec {
    ComponentSpec::new("Container grouping related content")
        .with_base([
            ("background-color", token("color-surface")),
            ("color", token("color-on-surface")),
            ("border-radius", token("shape-corner-large")),
            ("padding", token("spacing-lg")),
            ("box-shadow", token("component-card-shadow")),
        ])
        .with_variant("elevated", [("box-shadow", token("elevation-level-2"))])
        .with_variant(
            "outlined",
            [("box-shadow", token("elevation-level-0"))].into_iter().chain(outline()),
        )
        .with_variant(
            "filled",
            [
                ("background-color", token("color-surface-variant")),
                ("color", token("color-on-surface-variant")),
                ("box-shadow", token("elevation-level-0")),
            ],
        )
}

fn chip() -> ComponentSpec {
    ComponentSpec::new("Compact filter or choice element")
        .with_base(
            [
                ("background-color", literal("transparent")),
                ("color", token("color-on-surface-variant")),
                ("border-radius", token("shape-corner-small")),
                ("padding-block", token("spacing-xxs")),
                ("padding-inline", token("spacing-sm")),
                ("font-size", token("typescale-label-large-size")),
                ("font-weight", token("typescale-label-large-weight")),
                ("text-transform", token("component-chip-text-transform")),
                ("box-shadow", token("component-chip-shadow")),
            ]
            .into_iter()
            .chain(outline()),
        )
        .with_variant(
            "selected",
            [
                ("background-color", token("color-secondary-container")),
                ("color", token("color-on-secondary-container")),
                ("border-color", token("color-secondary-container")),
            ],
        )
        .with_plain_variant("outlined")
}

fn dialog() -> ComponentSpec {
    ComponentSpec::new("Modal surface for focused tasks")
        .with_base([
            ("background-color", token("color-surface")),
            ("color", token("color-on-surface")),
            ("border-radius", token("shape-corner-extra-large")),
            ("padding", token("spacing-xl")),
            ("font-family", token("typescale-body-medium-family")),
            ("font-size", token("typescale-body-medium-size")),
            ("box-shadow", token("component-dialog-shadow")),
        ])
        .with_plain_variant("default")
}

fn fab() -> ComponentSpec {
    ComponentSpec::new("Floating action button for the primary screen action")
        .with_base([
            ("background-color", token("color-primary-container")),
            ("color", token("color-on-primary-container")),
            ("border-radius", token("shape-corner-large")),
            ("padding", token("spacing-md")),
            ("box-shadow", token("component-fab-shadow")),
        ])
        .with_plain_variant("primary")
        .with_variant(
            "tertiary",
            [
                ("background-color", token_or("color-tertiary-container", "color-secondary-container")),
                ("color", token_or("color-on-tertiary-container", "color-on-secondary-container")),
            ],
        )
}

fn input_field() -> ComponentSpec {
    ComponentSpec::new("Single-line text entry")
        .with_base(
            [
                ("background-color", token("color-surface")),
                ("color", token("color-on-surface")),
                ("border-radius", token("shape-corner-extra-small")),
                ("padding-block", token("spacing-sm")),
                ("padding-inline", token("spacing-md")),
                ("font-family", token("typescale-body-large-family")),
                ("font-size", token("typescale-body-large-size")),
                ("line-height", token("typescale-body-large-line-height")),
                ("box-shadow", token("component-input-field-shadow")),
            ]
            .into_iter()
            .chain(outline()),
        )
        .with_plain_variant("outlined")
        .with_variant(
            "filled",
            [
                ("background-color", token("color-surface-variant")),
                ("border-color", token("color-on-surface-variant")),
            ],
        )
        .with_variant(
            "error",
            [
                ("color", token("color-error")),
                ("border-color", token("color-error")),
                ("border-width", token("border-width-medium")),
            ],
        )
}

fn toolbar() -> ComponentSpec {
    ComponentSpec::new("Horizontal bar of actions")
        .with_base([
            ("background-color", token("color-surface")),
            ("color", token("color-on-surface")),
            ("padding-block", token("spacing-sm")),
            ("padding-inline", token("spacing-md")),
            ("gap", token("spacing-sm")),
            ("font-family", token("typescale-title-large-family")),
            ("font-size", token("typescale-title-large-size")),
            ("box-shadow", token("component-toolbar-shadow")),
        ])
        .with_plain_variant("surface")
        .with_variant(
            "primary",
            [
                ("background-color", token("color-primary")),
                ("color", token("color-on-primary")),
            ],
        )
}
