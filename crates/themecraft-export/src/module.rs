//! Code module description: what a consuming code module can import.

use crate::css::{class_name, custom_property};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use themecraft_theme::{ComponentVariantMap, TokenSet};

/// Version of the `module.json` layout.
pub const MODULE_FORMAT_VERSION: u32 = 1;

/// Class names for one component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentClasses {
    pub class: String,
    /// Variant name to the modifier class added next to `class`.
    pub variants: BTreeMap<String, String>,
}

/// Describes the generated stylesheet as an importable module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDescription {
    pub version: u32,
    pub name: String,
    /// Stylesheet bundling tokens, components and element rules.
    pub stylesheet: String,
    /// Token name to its custom property.
    pub tokens: BTreeMap<String, String>,
    pub components: BTreeMap<String, ComponentClasses>,
    /// Other files of the bundle.
    pub files: Vec<String>,
}

impl ModuleDescription {
    pub fn new(name: &str, stylesheet: &str, tokens: &TokenSet, variants: &ComponentVariantMap) -> Self {
        let tokens = tokens
            .names()
            .map(|token| (token.to_string(), custom_property(token)))
            .collect();
        let components = variants
            .components
            .iter()
            .map(|(component, styles)| {
                let variants = styles
                    .named_variants
                    .keys()
                    .map(|variant| (variant.clone(), class_name(component, Some(variant))))
                    .collect();
                let classes = ComponentClasses { class: class_name(component, None), variants };
                (component.clone(), classes)
            })
            .collect();
        Self {
            version: MODULE_FORMAT_VERSION,
            name: name.to_string(),
            stylesheet: stylesheet.to_string(),
            tokens,
            components,
            files: Vec::new(),
        }
    }
}
