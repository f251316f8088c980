//! Versioned, serializable description of a scene.

use crate::element::{DesignElement, ElementId};
use crate::error::{SceneError, SceneResult};
use crate::scene::SceneState;
use serde::{Deserialize, Serialize};

/// Current scene description format version.
pub const SCENE_FORMAT_VERSION: u32 = 1;

/// Everything needed to rebuild an element tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDescription {
    pub version: u32,
    /// Top-level element ids.
    pub root_order: Vec<ElementId>,
    /// Every element, back to front.
    pub elements: Vec<DesignElement>,
}

impl Default for SceneDescription {
    fn default() -> Self {
        Self {
            version: SCENE_FORMAT_VERSION,
            root_order: Vec::new(),
            elements: Vec::new(),
        }
    }
}

impl SceneDescription {
    pub fn from_state(state: &SceneState) -> Self {
        let elements = state
            .paint_order()
            .into_iter()
            .filter_map(|id| state.get(id).cloned())
            .collect();
        Self {
            version: SCENE_FORMAT_VERSION,
            root_order: state.root_order().to_vec(),
            elements,
        }
    }

    /// Rebuild and validate the scene.
    pub fn to_state(&self) -> SceneResult<SceneState> {
        if self.version > SCENE_FORMAT_VERSION {
            return Err(SceneError::Serialization(format!(
                "unsupported scene format version {}",
                self.version
            )));
        }
        let mut state = SceneState::new();
        for element in &self.elements {
            if state.elements.insert(element.id, element.clone()).is_some() {
                return Err(SceneError::InvalidHierarchy(format!(
                    "duplicate element id {}",
                    element.id
                )));
            }
        }
        state.root_order = self.root_order.clone();
        state.validate()?;
        Ok(state)
    }

    pub fn to_json(&self) -> SceneResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> SceneResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Elements carrying theme bindings or literal style overrides.
    pub fn styled_elements(&self) -> impl Iterator<Item = &DesignElement> {
        self.elements
            .iter()
            .filter(|e| !e.theme_bindings.is_empty() || !e.custom_styles.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneStore;
    use kurbo::Rect;

    #[test]
    fn test_round_trip_through_json() {
        let mut store = SceneStore::new();
        let frame = store
            .insert_element(DesignElement::container(Rect::new(0.0, 0.0, 200.0, 100.0)), None)
            .unwrap();
        store
            .insert_element(
                DesignElement::text("Title", Rect::new(10.0, 10.0, 110.0, 30.0))
                    .with_binding("color", "color-on-surface"),
                Some(frame),
            )
            .unwrap();

        let description = SceneDescription::from_state(store.state());
        let json = description.to_json().unwrap();
        let parsed = SceneDescription::from_json(&json).unwrap();
        assert_eq!(&parsed.to_state().unwrap(), store.state());
        assert_eq!(parsed.styled_elements().count(), 1);
    }

    #[test]
    fn test_rejects_future_version() {
        let description = SceneDescription { version: SCENE_FORMAT_VERSION + 1, ..Default::default() };
        assert!(matches!(description.to_state(), Err(SceneError::Serialization(_))));
    }

    #[test]
    fn test_rejects_dangling_root() {
        let description = SceneDescription {
            root_order: vec![uuid::Uuid::new_v4()],
            ..Default::default()
        };
        assert!(matches!(description.to_state(), Err(SceneError::NotFound(_))));
    }

    #[test]
    fn test_rejects_bad_json() {
        assert!(matches!(
            SceneDescription::from_json("{ nope"),
            Err(SceneError::Serialization(_))
        ));
    }
}
