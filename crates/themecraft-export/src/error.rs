//! Export errors.

use thiserror::Error;

/// Reasons a bundle could not be produced or written.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Theme error: {0}")]
    Theme(#[from] themecraft_theme::ThemeError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;
