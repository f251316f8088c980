//! Multi-file export bundles.
//!
//! Building a bundle is pure; only [`ExportBundle::to_zip`] and
//! [`ExportBundle::write_to_dir`] touch the outside world.

use crate::css::{components_css, elements_css, tokens_css};
use crate::docs::readme;
use crate::error::ExportResult;
use crate::module::ModuleDescription;
use crate::report::ExportReport;
use std::collections::BTreeMap;
use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;
use themecraft_core::SceneDescription;
use themecraft_theme::{ComponentVariantMap, DerivedTheme};
use zip::CompressionMethod;
use zip::write::{SimpleFileOptions, ZipWriter};

pub const TOKENS_CSS: &str = "tokens.css";
pub const COMPONENTS_CSS: &str = "components.css";
pub const THEME_CSS: &str = "theme.css";
pub const TOKENS_JSON: &str = "tokens.json";
pub const VARIANTS_JSON: &str = "variants.json";
pub const SCENE_JSON: &str = "scene.json";
pub const MODULE_JSON: &str = "module.json";
pub const README_MD: &str = "README.md";
pub const REPORT_JSON: &str = "report.json";

/// Everything a bundle is made from.
#[derive(Debug, Clone, Copy)]
pub struct ExportInput<'a> {
    pub name: &'a str,
    pub theme: &'a DerivedTheme,
    pub variants: &'a ComponentVariantMap,
    pub scene: &'a SceneDescription,
}

/// Named text files, in path order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExportBundle {
    files: BTreeMap<String, String>,
    report: ExportReport,
}

impl ExportBundle {
    /// Render every artifact.
    pub fn build(input: &ExportInput<'_>) -> ExportResult<Self> {
        let tokens = &input.theme.tokens;
        let tokens_css = tokens_css(tokens);
        let components_css = components_css(input.variants);
        let (elements_css, unresolved_bindings) = elements_css(input.scene, tokens);

        let mut theme_css = format!("/* {} */\n\n{tokens_css}", input.name);
        for section in [&components_css, &elements_css] {
            if !section.is_empty() {
                theme_css.push('\n');
                theme_css.push_str(section);
            }
        }

        let report = ExportReport {
            name: input.name.to_string(),
            token_count: tokens.len(),
            component_count: input.variants.components.len(),
            element_count: input.scene.elements.len(),
            missing_tokens: input.variants.missing.clone(),
            unresolved_bindings,
            contrast: input.theme.pairings.clone(),
        };

        let mut module = ModuleDescription::new(input.name, THEME_CSS, tokens, input.variants);
        module.files = [TOKENS_CSS, COMPONENTS_CSS, TOKENS_JSON, VARIANTS_JSON, SCENE_JSON, README_MD, REPORT_JSON]
            .iter()
            .map(|path| path.to_string())
            .collect();

        let mut files = BTreeMap::new();
        files.insert(TOKENS_CSS.to_string(), tokens_css);
        files.insert(COMPONENTS_CSS.to_string(), components_css);
        files.insert(THEME_CSS.to_string(), theme_css);
        files.insert(TOKENS_JSON.to_string(), serde_json::to_string_pretty(tokens)?);
        files.insert(VARIANTS_JSON.to_string(), serde_json::to_string_pretty(input.variants)?);
        files.insert(SCENE_JSON.to_string(), serde_json::to_string_pretty(input.scene)?);
        files.insert(MODULE_JSON.to_string(), serde_json::to_string_pretty(&module)?);
        files.insert(README_MD.to_string(), readme(&report, tokens, input.variants));
        files.insert(REPORT_JSON.to_string(), serde_json::to_string_pretty(&report)?);

        if report.warning_count() > 0 {
            log::warn!("Export '{}' finished with {} warning(s)", input.name, report.warning_count());
        }
        log::debug!("Built export bundle '{}' with {} files", input.name, files.len());
        Ok(Self { files, report })
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn report(&self) -> &ExportReport {
        &self.report
    }

    /// Package every file into a deflate-compressed zip archive.
    pub fn to_zip(&self) -> ExportResult<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        for (path, contents) in &self.files {
            zip.start_file(path.as_str(), options)?;
            zip.write_all(contents.as_bytes())?;
        }
        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }

    /// Write every file into `dir`, creating it if needed.
    pub fn write_to_dir(&self, dir: &Path) -> ExportResult<()> {
        fs::create_dir_all(dir)?;
        for (path, contents) in &self.files {
            fs::write(dir.join(path), contents)?;
        }
        log::info!("Wrote {} files to {}", self.files.len(), dir.display());
        Ok(())
    }

    /// Write the zip archive to `path`.
    pub fn write_zip(&self, path: &Path) -> ExportResult<()> {
        let bytes = self.to_zip()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, bytes)?;
        log::info!("Wrote bundle archive {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use themecraft_theme::{ComponentCatalog, DesignConfiguration, derive_theme, generate_variants};

    fn bundle() -> ExportBundle {
        let theme = derive_theme(&DesignConfiguration::new("#6750a4")).unwrap();
        let variants = generate_variants(&theme.tokens, &ComponentCatalog::standard());
        let scene = SceneDescription::default();
        ExportBundle::build(&ExportInput { name: "Demo", theme: &theme, variants: &variants, scene: &scene }).unwrap()
    }

    #[test]
    fn test_bundle_contains_every_artifact() {
        let bundle = bundle();
        let paths: Vec<&str> = bundle.paths().collect();
        assert_eq!(
            paths,
            [
                COMPONENTS_CSS,
                MODULE_JSON,
                README_MD,
                REPORT_JSON,
                SCENE_JSON,
                THEME_CSS,
                TOKENS_CSS,
                TOKENS_JSON,
                VARIANTS_JSON
            ]
        );
        let theme = bundle.get(THEME_CSS).unwrap();
        assert!(theme.contains(bundle.get(TOKENS_CSS).unwrap()));
        assert!(theme.contains(bundle.get(COMPONENTS_CSS).unwrap()));
    }

    #[test]
    fn test_build_is_deterministic() {
        assert_eq!(bundle(), bundle());
        assert_eq!(bundle().to_zip().unwrap(), bundle().to_zip().unwrap());
    }

    #[test]
    fn test_zip_round_trip() {
        let bundle = bundle();
        let bytes = bundle.to_zip().unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), bundle.len());
        let mut readme = String::new();
        archive.by_name(README_MD).unwrap().read_to_string(&mut readme).unwrap();
        assert_eq!(readme, bundle.get(README_MD).unwrap());
    }
}
