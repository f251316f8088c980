//! Export report: counts plus every warning raised on the way.

use crate::css::BindingIssue;
use serde::{Deserialize, Serialize};
use themecraft_theme::{ContrastPairing, MissingToken};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExportReport {
    pub name: String,
    pub token_count: usize,
    pub component_count: usize,
    pub element_count: usize,
    /// Catalog references replaced by a fallback.
    pub missing_tokens: Vec<MissingToken>,
    /// Element bindings to tokens the theme does not define.
    pub unresolved_bindings: Vec<BindingIssue>,
    pub contrast: Vec<ContrastPairing>,
}

impl ExportReport {
    /// Number of warnings a user should look at.
    pub fn warning_count(&self) -> usize {
        self.missing_tokens.len()
            + self.unresolved_bindings.len()
            + self.contrast.iter().filter(|p| p.adjusted).count()
    }

    /// Human-readable warning lines.
    pub fn warnings(&self) -> Vec<String> {
        let mut lines: Vec<String> = self.missing_tokens.iter().map(ToString::to_string).collect();
        for issue in &self.unresolved_bindings {
            let outcome = match &issue.fallback {
                Some(fallback) => format!("using '{fallback}'"),
                None => "declaration omitted".to_string(),
            };
            lines.push(format!(
                "element {} {}: token '{}' is missing, {outcome}",
                issue.element, issue.property, issue.token
            ));
        }
        for pairing in self.contrast.iter().filter(|p| p.adjusted) {
            lines.push(format!(
                "{} was adjusted to reach {:.1}:1 against {}",
                pairing.background, pairing.target, pairing.foreground
            ));
        }
        lines
    }
}
