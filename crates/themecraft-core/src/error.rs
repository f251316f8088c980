//! Scene store errors.

use crate::element::ElementId;
use crate::geometry::GeometryError;
use thiserror::Error;

/// Reasons a scene operation was rejected.
///
/// Every rejection leaves the scene exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SceneError {
    #[error("Element not found: {0}")]
    NotFound(ElementId),
    #[error("Invalid hierarchy: {0}")]
    InvalidHierarchy(String),
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(#[from] GeometryError),
    #[error("No gesture in progress")]
    NoActiveGesture,
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for SceneError {
    fn from(err: serde_json::Error) -> Self {
        SceneError::Serialization(err.to_string())
    }
}

/// Result type for scene operations.
pub type SceneResult<T> = Result<T, SceneError>;
