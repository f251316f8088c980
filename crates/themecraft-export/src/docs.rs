//! Markdown documentation for an exported theme.

use crate::css::{class_name, css_value, custom_property};
use crate::report::ExportReport;
use themecraft_theme::{ComponentVariantMap, TokenSet};

/// Escape `|` so values do not break table columns.
fn cell(text: &str) -> String {
    text.replace('|', "\\|")
}

/// Render `README.md`.
pub fn readme(report: &ExportReport, tokens: &TokenSet, variants: &ComponentVariantMap) -> String {
    let mut md = format!("# {}\n\n", report.name);
    md.push_str(&format!(
        "{} tokens, {} components, {} scene elements.\n\n",
        report.token_count, report.component_count, report.element_count
    ));
    md.push_str("## Files\n\n");
    md.push_str("- `tokens.css`: custom properties for every token\n");
    md.push_str("- `components.css`: component classes referring to those properties\n");
    md.push_str("- `theme.css`: both of the above plus element rules\n");
    md.push_str("- `tokens.json`, `variants.json`, `scene.json`, `module.json`, `report.json`\n\n");

    md.push_str("## Tokens\n");
    for (category, entries) in tokens.by_category() {
        md.push_str(&format!("\n### {}\n\n| Property | Value |\n|---|---|\n", category.title()));
        for (name, value) in entries {
            md.push_str(&format!("| `{}` | `{}` |\n", custom_property(name), cell(value)));
        }
    }

    md.push_str("\n## Components\n");
    for (name, component) in &variants.components {
        md.push_str(&format!("\n### {name}\n\n"));
        if !component.description.is_empty() {
            md.push_str(&format!("{}\n\n", component.description));
        }
        md.push_str(&format!("Class: `.{}`\n\n", class_name(name, None)));
        md.push_str("| Property | Value |\n|---|---|\n");
        for (property, value) in &component.base_style {
            md.push_str(&format!("| `{property}` | `{}` |\n", cell(&css_value(value))));
        }
        if !component.named_variants.is_empty() {
            md.push_str("\nVariants:\n\n");
            for (variant, overrides) in &component.named_variants {
                md.push_str(&format!(
                    "- `{variant}` (`.{}`): {} override(s)\n",
                    class_name(name, Some(variant)),
                    overrides.len()
                ));
            }
        }
    }

    if !report.contrast.is_empty() {
        md.push_str("\n## Contrast\n\n| Background | Foreground | Ratio | Target |\n|---|---|---|---|\n");
        for pairing in &report.contrast {
            md.push_str(&format!(
                "| `{}` | `{}` | {:.2} | {:.1} |\n",
                pairing.background, pairing.foreground, pairing.ratio, pairing.target
            ));
        }
    }

    let warnings = report.warnings();
    if !warnings.is_empty() {
        md.push_str("\n## Warnings\n\n");
        for warning in warnings {
            md.push_str(&format!("- {warning}\n"));
        }
    }
    md
}
