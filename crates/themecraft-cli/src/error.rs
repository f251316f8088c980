use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Theme(#[from] themecraft_theme::ThemeError),
    #[error(transparent)]
    Scene(#[from] themecraft_core::SceneError),
    #[error(transparent)]
    Export(#[from] themecraft_export::ExportError),
    #[error("derivation was superseded by a newer configuration")]
    Superseded,
}

pub type CliResult<T> = Result<T, CliError>;
