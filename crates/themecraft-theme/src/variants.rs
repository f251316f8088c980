//! Variant generation: catalog plus token set in, token-referencing styles out.
//!
//! The output is the complete styling contract for preview renderers: every
//! token it names exists in the token set it was generated from. Absent
//! tokens are replaced by their documented fallback and reported as
//! [`MissingToken`] warnings, never as errors.

use crate::catalog::{ComponentCatalog, StyleRule, TokenRef};
use crate::error::ThemeResult;
use crate::tokens::TokenSet;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// A style property value in generated output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum StyleValue {
    Token { token: String },
    Literal { value: String },
    Gradient { from: String, to: String, angle_degrees: f64 },
}

impl StyleValue {
    /// Token names this value refers to.
    pub fn tokens(&self) -> Vec<&str> {
        match self {
            StyleValue::Token { token } => vec![token.as_str()],
            StyleValue::Literal { .. } => Vec::new(),
            StyleValue::Gradient { from, to, .. } => vec![from.as_str(), to.as_str()],
        }
    }

    /// The literal CSS value, looking tokens up in `tokens`.
    pub fn resolve(&self, tokens: &TokenSet) -> Option<String> {
        match self {
            StyleValue::Token { token } => tokens.get(token).map(str::to_string),
            StyleValue::Literal { value } => Some(value.clone()),
            StyleValue::Gradient { from, to, angle_degrees } => Some(format!(
                "linear-gradient({angle_degrees}deg, {}, {})",
                tokens.get(from)?,
                tokens.get(to)?
            )),
        }
    }
}

/// A token reference that had to be replaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingToken {
    pub component: String,
    /// `None` for the base style.
    pub variant: Option<String>,
    pub property: String,
    pub token: String,
    /// The substituted token, or `None` if the property was dropped.
    pub fallback: Option<String>,
}

impl fmt::Display for MissingToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.component)?;
        if let Some(variant) = &self.variant {
            write!(f, "--{variant}")?;
        }
        write!(f, " {}: token '{}' is missing", self.property, self.token)?;
        match &self.fallback {
            Some(fallback) => write!(f, ", using '{fallback}'"),
            None => write!(f, ", property omitted"),
        }
    }
}

/// Generated styles for one component.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ComponentVariants {
    #[serde(default)]
    pub description: String,
    pub base_style: BTreeMap<String, StyleValue>,
    /// Variant name to the properties it overrides.
    pub named_variants: BTreeMap<String, BTreeMap<String, StyleValue>>,
}

impl ComponentVariants {
    /// Base style with a variant's overrides applied. `None` for unknown variants.
    pub fn merged(&self, variant: Option<&str>) -> Option<BTreeMap<String, StyleValue>> {
        let mut style = self.base_style.clone();
        if let Some(variant) = variant {
            let overrides = self.named_variants.get(variant)?;
            style.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        Some(style)
    }
}

/// Styles for every catalog component, plus any fallbacks that were needed.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ComponentVariantMap {
    pub components: BTreeMap<String, ComponentVariants>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<MissingToken>,
}

impl ComponentVariantMap {
    pub fn get(&self, component: &str) -> Option<&ComponentVariants> {
        self.components.get(component)
    }

    /// Literal styles for `component` (and optionally one variant), ready
    /// for a renderer that knows nothing about tokens.
    pub fn resolve(
        &self,
        component: &str,
        variant: Option<&str>,
        tokens: &TokenSet,
    ) -> Option<BTreeMap<String, String>> {
        let style = self.get(component)?.merged(variant)?;
        Some(
            style
                .into_iter()
                .filter_map(|(property, value)| value.resolve(tokens).map(|v| (property, v)))
                .collect(),
        )
    }

    /// Every token name referenced anywhere in the map.
    pub fn references(&self) -> BTreeSet<&str> {
        self.components
            .values()
            .flat_map(|c| c.base_style.values().chain(c.named_variants.values().flat_map(|v| v.values())))
            .flat_map(StyleValue::tokens)
            .collect()
    }

    pub fn to_json(&self) -> ThemeResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> ThemeResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Where in the catalog a reference is being resolved.
struct Site<'a> {
    component: &'a str,
    variant: Option<&'a str>,
}

struct Generator<'a> {
    tokens: &'a TokenSet,
    missing: Vec<MissingToken>,
}

impl Generator<'_> {
    fn reference(&mut self, site: &Site<'_>, property: &str, reference: &TokenRef) -> Option<String> {
        if self.tokens.contains(&reference.token) {
            return Some(reference.token.clone());
        }
        let fallback = reference
            .fallback_chain()
            .find(|name| self.tokens.contains(name))
            .map(str::to_string);
        let missing = MissingToken {
            component: site.component.to_string(),
            variant: site.variant.map(str::to_string),
            property: property.to_string(),
            token: reference.token.clone(),
            fallback: fallback.clone(),
        };
        log::warn!("{missing}");
        self.missing.push(missing);
        fallback
    }

    fn rule(&mut self, site: &Site<'_>, property: &str, rule: &StyleRule) -> Option<StyleValue> {
        match rule {
            StyleRule::Token(reference) => {
                let token = self.reference(site, property, reference)?;
                Some(StyleValue::Token { token })
            }
            StyleRule::Literal { value } => Some(StyleValue::Literal { value: value.clone() }),
            StyleRule::Gradient { from, to, angle_degrees } => {
                let from = self.reference(site, property, from);
                let to = self.reference(site, property, to);
                Some(StyleValue::Gradient { from: from?, to: to?, angle_degrees: *angle_degrees })
            }
        }
    }

    fn rules(&mut self, site: &Site<'_>, rules: &BTreeMap<String, StyleRule>) -> BTreeMap<String, StyleValue> {
        rules
            .iter()
            .filter_map(|(property, rule)| self.rule(site, property, rule).map(|value| (property.clone(), value)))
            .collect()
    }
}

/// Generate styles for every catalog component against `tokens`.
pub fn generate_variants(tokens: &TokenSet, catalog: &ComponentCatalog) -> ComponentVariantMap {
    let mut generator = Generator { tokens, missing: Vec::new() };
    let mut components = BTreeMap::new();

    for (name, spec) in &catalog.components {
        let base_style = generator.rules(&Site { component: name, variant: None }, &spec.base);
        let named_variants = spec
            .variants
            .iter()
            .map(|(variant, overrides)| {
                let site = Site { component: name, variant: Some(variant.as_str()) };
                (variant.clone(), generator.rules(&site, overrides))
            })
            .collect();
        components.insert(
            name.clone(),
            ComponentVariants { description: spec.description.clone(), base_style, named_variants },
        );
    }

    if !generator.missing.is_empty() {
        log::debug!("{} token references fell back", generator.missing.len());
    }
    ComponentVariantMap { components, missing: generator.missing }
}
