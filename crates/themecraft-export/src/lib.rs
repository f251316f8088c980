//! Themecraft Export Library
//!
//! Renders a derived theme, its component variants and a scene into a set of
//! artifacts: CSS custom properties, component classes, element rules, JSON
//! dumps, a module description and Markdown docs. The whole set can be
//! written to a directory or packed into a single zip archive.

pub mod bundle;
pub mod css;
pub mod docs;
pub mod error;
pub mod module;
pub mod report;

pub use bundle::{ExportBundle, ExportInput};
pub use css::{BindingIssue, class_name, components_css, custom_property, elements_css, tokens_css};
pub use docs::readme;
pub use error::{ExportError, ExportResult};
pub use module::{ComponentClasses, ModuleDescription};
pub use report::ExportReport;

use themecraft_core::SceneDescription;
use themecraft_theme::{ComponentCatalog, DerivedTheme, DesignConfiguration, derive_theme, generate_variants};

/// Derive the theme for `config`, generate variants for `catalog` and bundle
/// everything together with `scene`.
pub fn export_theme(
    config: &DesignConfiguration,
    catalog: &ComponentCatalog,
    scene: &SceneDescription,
) -> ExportResult<ExportBundle> {
    let theme = derive_theme(config)?;
    export_derived(&config.name, &theme, catalog, scene)
}

/// Bundle an already derived theme, generating variants for `catalog`.
pub fn export_derived(
    name: &str,
    theme: &DerivedTheme,
    catalog: &ComponentCatalog,
    scene: &SceneDescription,
) -> ExportResult<ExportBundle> {
    let variants = generate_variants(&theme.tokens, catalog);
    let bundle = ExportBundle::build(&ExportInput { name, theme, variants: &variants, scene })?;
    let report = bundle.report();
    log::info!(
        "Exported '{name}': {} tokens, {} components, {} elements",
        report.token_count,
        report.component_count,
        report.element_count
    );
    Ok(bundle)
}
