//! Design elements: the nodes of the canvas scene graph.

use crate::geometry::{
    GeometryError, GeometryResult, rotate_point, rotated_bounding_box, validate_rect,
};
use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Unique identifier for an element.
pub type ElementId = Uuid;

/// What an element represents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ElementKind {
    /// A plain box primitive.
    Rectangle,
    /// A run of text.
    Text { content: String },
    /// A frame that owns ordered children.
    Container,
    /// An instance of a catalog component, optionally pinned to a variant.
    ComponentInstance {
        component: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        variant: Option<String>,
    },
}

impl ElementKind {
    /// Short name used in logs and exported descriptions.
    pub fn name(&self) -> &'static str {
        match self {
            ElementKind::Rectangle => "rectangle",
            ElementKind::Text { .. } => "text",
            ElementKind::Container => "container",
            ElementKind::ComponentInstance { .. } => "component-instance",
        }
    }
}

/// A positioned, sized and rotatable node.
///
/// Positions are absolute canvas coordinates of the unrotated frame's top-left
/// corner; rotation is applied around the frame center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignElement {
    pub id: ElementId,
    pub kind: ElementKind,
    pub position: Point,
    pub size: Size,
    #[serde(default)]
    pub rotation_degrees: f64,
    #[serde(default)]
    pub z_order: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<ElementId>,
    /// Ordered child ids; only containers have children.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ElementId>,
    /// Style property to token name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub theme_bindings: BTreeMap<String, String>,
    /// Literal style overrides.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom_styles: BTreeMap<String, String>,
    #[serde(default)]
    pub locked: bool,
}

impl DesignElement {
    /// Create a new element of `kind` occupying `frame`.
    pub fn new(kind: ElementKind, frame: Rect) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            position: frame.origin(),
            size: frame.size(),
            rotation_degrees: 0.0,
            z_order: 0,
            parent_id: None,
            children: Vec::new(),
            theme_bindings: BTreeMap::new(),
            custom_styles: BTreeMap::new(),
            locked: false,
        }
    }

    pub fn rectangle(frame: Rect) -> Self {
        Self::new(ElementKind::Rectangle, frame)
    }

    pub fn text(content: impl Into<String>, frame: Rect) -> Self {
        Self::new(ElementKind::Text { content: content.into() }, frame)
    }

    pub fn container(frame: Rect) -> Self {
        Self::new(ElementKind::Container, frame)
    }

    pub fn component(component: impl Into<String>, variant: Option<&str>, frame: Rect) -> Self {
        Self::new(
            ElementKind::ComponentInstance {
                component: component.into(),
                variant: variant.map(str::to_string),
            },
            frame,
        )
    }

    /// Set the rotation (builder style).
    pub fn with_rotation(mut self, degrees: f64) -> Self {
        self.rotation_degrees = degrees;
        self
    }

    /// Bind a style property to a token (builder style).
    pub fn with_binding(mut self, property: impl Into<String>, token: impl Into<String>) -> Self {
        self.theme_bindings.insert(property.into(), token.into());
        self
    }

    /// Add a literal style override (builder style).
    pub fn with_style(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_styles.insert(property.into(), value.into());
        self
    }

    /// Mark the element as locked (builder style).
    pub fn locked(mut self) -> Self {
        self.locked = true;
        self
    }

    pub fn is_container(&self) -> bool {
        matches!(self.kind, ElementKind::Container)
    }

    /// The unrotated frame.
    pub fn frame(&self) -> Rect {
        Rect::from_origin_size(self.position, self.size)
    }

    /// Replace position and size from a frame.
    pub fn set_frame(&mut self, frame: Rect) {
        self.position = frame.origin();
        self.size = frame.size();
    }

    /// Axis-aligned bounds of the rotated frame.
    pub fn bounds(&self) -> Rect {
        rotated_bounding_box(self.frame(), self.rotation_degrees).unwrap_or_else(|_| self.frame())
    }

    /// Whether `point` lies on the rotated frame, grown by `tolerance`.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let frame = self.frame();
        let local = rotate_point(point, frame.center(), -self.rotation_degrees);
        frame.inflate(tolerance, tolerance).contains(local)
    }

    /// Shift the element by `delta`.
    pub fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }

    /// Reject NaN/infinite values and negative sizes.
    pub fn validate(&self) -> GeometryResult<()> {
        validate_rect(self.frame())?;
        if !self.rotation_degrees.is_finite() {
            return Err(GeometryError::NonFinite("rotation"));
        }
        Ok(())
    }
}

/// A partial update applied by [`crate::SceneStore::update_elements`].
///
/// `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Point>,
    /// Relative move, applied after `position`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translate: Option<Vec2>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation_degrees: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
    /// New text content; ignored for non-text elements.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Bindings to add or replace.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub theme_bindings: BTreeMap<String, String>,
    /// Style overrides to add or replace; an empty value removes the override.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub custom_styles: BTreeMap<String, String>,
}

impl ElementPatch {
    pub fn translate(delta: Vec2) -> Self {
        Self { translate: Some(delta), ..Default::default() }
    }

    pub fn frame(frame: Rect) -> Self {
        Self {
            position: Some(frame.origin()),
            size: Some(frame.size()),
            ..Default::default()
        }
    }

    pub fn rotation(degrees: f64) -> Self {
        Self { rotation_degrees: Some(degrees), ..Default::default() }
    }

    pub fn locked(locked: bool) -> Self {
        Self { locked: Some(locked), ..Default::default() }
    }

    /// Whether the patch changes an element's position.
    pub fn moves(&self) -> bool {
        self.position.is_some() || self.translate.is_some()
    }

    /// Apply to `element`, validating the result first.
    ///
    /// On error the element is not modified.
    pub fn apply(&self, element: &mut DesignElement) -> GeometryResult<()> {
        let mut updated = element.clone();
        if let Some(position) = self.position {
            updated.position = position;
        }
        if let Some(delta) = self.translate {
            updated.translate(delta);
        }
        if let Some(size) = self.size {
            updated.size = size;
        }
        if let Some(rotation) = self.rotation_degrees {
            updated.rotation_degrees = rotation;
        }
        if let Some(locked) = self.locked {
            updated.locked = locked;
        }
        if let (Some(text), ElementKind::Text { content }) = (&self.content, &mut updated.kind) {
            content.clone_from(text);
        }
        for (property, token) in &self.theme_bindings {
            updated.theme_bindings.insert(property.clone(), token.clone());
        }
        for (property, value) in &self.custom_styles {
            if value.is_empty() {
                updated.custom_styles.remove(property);
            } else {
                updated.custom_styles.insert(property.clone(), value.clone());
            }
        }
        updated.validate()?;
        *element = updated;
        Ok(())
    }
}
