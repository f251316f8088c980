//! End-to-end export: configuration and scene in, files and archive out.

use kurbo::Rect;
use std::io::{Cursor, Read};
use themecraft_core::{DesignElement, SceneDescription};
use themecraft_export::bundle::{MODULE_JSON, REPORT_JSON, THEME_CSS, TOKENS_JSON};
use themecraft_export::{ExportReport, ModuleDescription, export_derived, export_theme};
use themecraft_theme::{ComponentCatalog, DesignConfiguration, TokenSet, derive_theme};

fn scene() -> (SceneDescription, DesignElement, DesignElement) {
    let card = DesignElement::component("card", Some("outlined"), Rect::new(0.0, 0.0, 200.0, 120.0))
        .with_binding("background-color", "color-surface")
        .with_binding("border-color", "color-brand")
        .with_binding("color", "color-on-surface")
        .with_style("color", "#123456");
    let label = DesignElement::text("Hello", Rect::new(10.0, 10.0, 90.0, 30.0));
    let scene = SceneDescription {
        root_order: vec![card.id, label.id],
        elements: vec![card.clone(), label.clone()],
        ..SceneDescription::default()
    };
    (scene, card, label)
}

fn config() -> DesignConfiguration {
    let mut config = DesignConfiguration::new("#6750a4");
    config.name = "Acme".to_string();
    config.colors.tertiary = Some("#7d5260".to_string());
    config
}

#[test]
fn element_rules_use_bindings_fallbacks_and_overrides() {
    let (scene, card, label) = scene();
    let bundle = export_theme(&config(), &ComponentCatalog::standard(), &scene).unwrap();
    let css = bundle.get(THEME_CSS).unwrap();

    let selector = format!("[data-element-id=\"{}\"] {{\n", card.id);
    let start = css.find(&selector).unwrap();
    let block = &css[start..start + css[start..].find('}').unwrap()];
    assert!(block.contains("  background-color: var(--color-surface);\n"));
    assert!(block.contains("  border-color: var(--color-primary);\n"));
    assert!(block.contains("  color: #123456;\n"));
    assert!(!block.contains("--color-on-surface"));

    // Unstyled elements get no rule.
    assert!(!css.contains(&label.id.to_string()));

    let report: ExportReport = serde_json::from_str(bundle.get(REPORT_JSON).unwrap()).unwrap();
    assert!(report.missing_tokens.is_empty());
    assert_eq!(report.unresolved_bindings.len(), 1);
    let issue = &report.unresolved_bindings[0];
    assert_eq!(issue.element, card.id);
    assert_eq!(issue.token, "color-brand");
    assert_eq!(issue.fallback.as_deref(), Some("color-primary"));
    assert_eq!(report.element_count, 2);
}

#[test]
fn json_artifacts_parse_back() {
    let (scene, _, _) = scene();
    let bundle = export_theme(&config(), &ComponentCatalog::standard(), &scene).unwrap();

    let tokens = TokenSet::from_json(bundle.get(TOKENS_JSON).unwrap()).unwrap();
    assert_eq!(tokens.len(), bundle.report().token_count);

    let module: ModuleDescription = serde_json::from_str(bundle.get(MODULE_JSON).unwrap()).unwrap();
    assert_eq!(module.name, "Acme");
    assert_eq!(module.stylesheet, THEME_CSS);
    assert!(module.files.iter().all(|file| bundle.get(file).is_some()));
    assert_eq!(module.components["button"].variants["tonal"], "tc-button--tonal");

    let parsed = SceneDescription::from_json(bundle.get("scene.json").unwrap()).unwrap();
    assert_eq!(parsed, scene);
}

#[test]
fn archive_and_directory_hold_the_same_files() {
    let (scene, _, _) = scene();
    let bundle = export_theme(&config(), &ComponentCatalog::standard(), &scene).unwrap();

    let bytes = bundle.to_zip().unwrap();
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    assert_eq!(archive.len(), bundle.len());

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("acme");
    bundle.write_to_dir(&out).unwrap();

    for path in bundle.paths() {
        let mut zipped = String::new();
        archive.by_name(path).unwrap().read_to_string(&mut zipped).unwrap();
        let written = std::fs::read_to_string(out.join(path)).unwrap();
        assert_eq!(zipped, written);
        assert_eq!(written, bundle.get(path).unwrap());
    }

    let zip_path = dir.path().join("nested").join("acme.zip");
    bundle.write_zip(&zip_path).unwrap();
    assert!(zip_path.exists());
}

#[test]
fn invalid_configuration_is_rejected() {
    let config = DesignConfiguration::new("not-a-color");
    assert!(export_theme(&config, &ComponentCatalog::standard(), &SceneDescription::default()).is_err());
}

#[test]
fn pre_derived_theme_exports_the_same_bundle() {
    let (scene, _, _) = scene();
    let config = config();
    let catalog = ComponentCatalog::standard();
    let theme = derive_theme(&config).unwrap();
    let derived = export_derived(&config.name, &theme, &catalog, &scene).unwrap();
    assert_eq!(derived, export_theme(&config, &catalog, &scene).unwrap());
}
