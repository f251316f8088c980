//! Modular type scale.

use crate::config::TypographyConfig;
use crate::tokens::{TokenSet, px};

/// Which configured family a role uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    Heading,
    Body,
}

/// One row of the type scale.
#[derive(Debug, Clone, Copy)]
struct TypeRole {
    name: &'static str,
    /// Power of the scale ratio relative to the base size.
    step: f64,
    weight: u16,
    line_height: f64,
    family: Family,
}

const fn role(name: &'static str, step: f64, weight: u16, line_height: f64, family: Family) -> TypeRole {
    TypeRole { name, step, weight, line_height, family }
}

const ROLES: [TypeRole; 15] = [
    role("display-large", 7.0, 400, 1.12, Family::Heading),
    role("display-medium", 6.0, 400, 1.15, Family::Heading),
    role("display-small", 5.0, 400, 1.2, Family::Heading),
    role("headline-large", 4.0, 400, 1.25, Family::Heading),
    role("headline-medium", 3.0, 400, 1.28, Family::Heading),
    role("headline-small", 2.0, 400, 1.33, Family::Heading),
    role("title-large", 1.0, 500, 1.4, Family::Heading),
    role("title-medium", 0.0, 500, 1.5, Family::Body),
    role("title-small", -1.0, 500, 1.45, Family::Body),
    role("body-large", 0.5, 400, 1.5, Family::Body),
    role("body-medium", 0.0, 400, 1.5, Family::Body),
    role("body-small", -1.0, 400, 1.35, Family::Body),
    role("label-large", -0.5, 500, 1.4, Family::Body),
    role("label-medium", -1.0, 500, 1.35, Family::Body),
    role("label-small", -1.5, 500, 1.3, Family::Body),
];

/// Names of all type roles, largest first.
pub fn type_roles() -> impl Iterator<Item = &'static str> {
    ROLES.iter().map(|r| r.name)
}

/// Write `font-family-*` and `typescale-{role}-{size,line-height,weight,family}`.
pub fn write_tokens(config: &TypographyConfig, tokens: &mut TokenSet) {
    tokens.insert("font-family-heading", config.heading_family.as_str());
    tokens.insert("font-family-body", config.body_family.as_str());
    tokens.insert("font-family-mono", config.mono_family.as_str());

    for role in &ROLES {
        let size = config.base_size * config.scale_ratio.powf(role.step);
        let line_height = (size * role.line_height).round();
        let family = match role.family {
            Family::Heading => &config.heading_family,
            Family::Body => &config.body_family,
        };
        let prefix = format!("typescale-{}", role.name);
        tokens.insert(format!("{prefix}-size"), px(size));
        tokens.insert(format!("{prefix}-line-height"), px(line_height));
        tokens.insert(format!("{prefix}-weight"), role.weight.to_string());
        tokens.insert(format!("{prefix}-family"), family.as_str());
    }
}
