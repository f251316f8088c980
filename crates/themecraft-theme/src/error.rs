//! Theme derivation errors.

use thiserror::Error;

/// Reasons a configuration could not be turned into tokens.
///
/// A failed derivation never replaces the active token set.
#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Invalid color: {0}")]
    InvalidColor(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for theme operations.
pub type ThemeResult<T> = Result<T, ThemeError>;
