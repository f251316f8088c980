//! The flat token map produced by derivation.

use crate::error::ThemeResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Token family, inferred from the name prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TokenCategory {
    Color,
    Typography,
    Shape,
    Spacing,
    Elevation,
    Border,
    Motion,
    Component,
    Other,
}

impl TokenCategory {
    pub fn of(name: &str) -> Self {
        const PREFIXES: [(&str, TokenCategory); 9] = [
            ("color-", TokenCategory::Color),
            ("typescale-", TokenCategory::Typography),
            ("font-", TokenCategory::Typography),
            ("shape-", TokenCategory::Shape),
            ("spacing-", TokenCategory::Spacing),
            ("elevation-", TokenCategory::Elevation),
            ("border-", TokenCategory::Border),
            ("motion-", TokenCategory::Motion),
            ("component-", TokenCategory::Component),
        ];
        PREFIXES
            .iter()
            .find(|(prefix, _)| name.starts_with(prefix))
            .map_or(TokenCategory::Other, |(_, category)| *category)
    }

    /// Human-readable heading used in documentation.
    pub fn title(self) -> &'static str {
        match self {
            TokenCategory::Color => "Color",
            TokenCategory::Typography => "Typography",
            TokenCategory::Shape => "Shape",
            TokenCategory::Spacing => "Spacing",
            TokenCategory::Elevation => "Elevation",
            TokenCategory::Border => "Border",
            TokenCategory::Motion => "Motion",
            TokenCategory::Component => "Component hints",
            TokenCategory::Other => "Other",
        }
    }
}

/// Token name to literal value (`#6750a4`, `16px`, `500`, a font stack, ...).
///
/// Ordered, so that serialized output is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenSet {
    tokens: BTreeMap<String, String>,
}

impl TokenSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a token.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.tokens.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.tokens.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tokens.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Tokens in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.tokens.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tokens.keys().map(String::as_str)
    }

    /// Tokens grouped by category, each group in name order.
    pub fn by_category(&self) -> BTreeMap<TokenCategory, Vec<(&str, &str)>> {
        let mut groups: BTreeMap<TokenCategory, Vec<(&str, &str)>> = BTreeMap::new();
        for (name, value) in self.iter() {
            groups.entry(TokenCategory::of(name)).or_default().push((name, value));
        }
        groups
    }

    pub fn to_json(&self) -> ThemeResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> ThemeResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TokenSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = TokenSet::new();
        for (name, value) in iter {
            set.insert(name, value);
        }
        set
    }
}

/// Format a px length with at most two decimals (`16px`, `19.2px`).
pub fn px(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    // Avoid "-0px".
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format!("{rounded}px")
}
