//! Stylesheet writers.
//!
//! Tokens become custom properties on `:root`; component styles and element
//! overrides refer to them through `var(--token)` so a theme can be swapped
//! by replacing `tokens.css` alone.

use serde::{Deserialize, Serialize};
use themecraft_core::{DesignElement, ElementId, SceneDescription};
use themecraft_theme::{ComponentVariantMap, StyleValue, TokenRef, TokenSet};

/// Prefix of every generated component class.
pub const CLASS_PREFIX: &str = "tc";

/// Replace anything that is not valid in a CSS identifier with `-`.
pub fn css_ident(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '-' })
        .collect()
}

/// `--{token}`.
pub fn custom_property(token: &str) -> String {
    format!("--{}", css_ident(token))
}

/// `var(--{token})`.
pub fn var(token: &str) -> String {
    format!("var({})", custom_property(token))
}

/// `tc-{component}` or `tc-{component}--{variant}`.
pub fn class_name(component: &str, variant: Option<&str>) -> String {
    match variant {
        Some(variant) => format!("{CLASS_PREFIX}-{}--{}", css_ident(component), css_ident(variant)),
        None => format!("{CLASS_PREFIX}-{}", css_ident(component)),
    }
}

/// CSS value for a generated style, referring to tokens by custom property.
pub fn css_value(value: &StyleValue) -> String {
    match value {
        StyleValue::Token { token } => var(token),
        StyleValue::Literal { value } => value.clone(),
        StyleValue::Gradient { from, to, angle_degrees } => {
            format!("linear-gradient({angle_degrees}deg, {}, {})", var(from), var(to))
        }
    }
}

fn rule<'a>(selector: &str, declarations: impl IntoIterator<Item = (&'a str, String)>) -> String {
    let mut css = format!("{selector} {{\n");
    for (property, value) in declarations {
        css.push_str(&format!("  {property}: {value};\n"));
    }
    css.push_str("}\n");
    css
}

/// `:root { --token: value; ... }`, grouped by category.
pub fn tokens_css(tokens: &TokenSet) -> String {
    let mut css = String::from(":root {\n");
    for (index, (category, entries)) in tokens.by_category().into_iter().enumerate() {
        if index > 0 {
            css.push('\n');
        }
        css.push_str(&format!("  /* {} */\n", category.title()));
        for (name, value) in entries {
            css.push_str(&format!("  {}: {value};\n", custom_property(name)));
        }
    }
    css.push_str("}\n");
    css
}

/// One block per component and one per named variant.
pub fn components_css(variants: &ComponentVariantMap) -> String {
    let mut blocks = Vec::new();
    for (name, component) in &variants.components {
        let base = component
            .base_style
            .iter()
            .map(|(property, value)| (property.as_str(), css_value(value)));
        blocks.push(rule(&format!(".{}", class_name(name, None)), base));

        for (variant, overrides) in &component.named_variants {
            if overrides.is_empty() {
                continue;
            }
            let declarations = overrides
                .iter()
                .map(|(property, value)| (property.as_str(), css_value(value)));
            blocks.push(rule(&format!(".{}", class_name(name, Some(variant))), declarations));
        }
    }
    blocks.join("\n")
}

/// A theme binding on an element whose token is not in the token set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingIssue {
    pub element: ElementId,
    pub property: String,
    pub token: String,
    /// Substituted token, or `None` if the declaration was dropped.
    pub fallback: Option<String>,
}

/// Element-level rules for every element with bindings or literal styles.
///
/// Bindings come first and literal overrides win over them. Bindings to
/// unknown tokens use the token's category fallback and are reported.
pub fn elements_css(scene: &SceneDescription, tokens: &TokenSet) -> (String, Vec<BindingIssue>) {
    let mut issues = Vec::new();
    let mut blocks = Vec::new();
    for element in scene.styled_elements() {
        blocks.push(element_rule(element, tokens, &mut issues));
    }
    (blocks.join("\n"), issues)
}

fn element_rule(element: &DesignElement, tokens: &TokenSet, issues: &mut Vec<BindingIssue>) -> String {
    let mut declarations: Vec<(&str, String)> = Vec::new();
    for (property, token) in &element.theme_bindings {
        if element.custom_styles.contains_key(property) {
            continue;
        }
        if tokens.contains(token) {
            declarations.push((property.as_str(), var(token)));
            continue;
        }
        let reference = TokenRef::new(token.as_str());
        let fallback = reference.fallback_chain().find(|name| tokens.contains(name));
        log::warn!(
            "Element {} binds {property} to missing token '{token}'",
            element.id
        );
        issues.push(BindingIssue {
            element: element.id,
            property: property.clone(),
            token: token.clone(),
            fallback: fallback.map(str::to_string),
        });
        if let Some(fallback) = fallback {
            declarations.push((property.as_str(), var(fallback)));
        }
    }
    for (property, value) in &element.custom_styles {
        declarations.push((property.as_str(), value.clone()));
    }
    declarations.sort_by(|a, b| a.0.cmp(b.0));
    rule(&format!("[data-element-id=\"{}\"]", element.id), declarations)
}
