//! Themecraft Core Library
//!
//! Platform-agnostic scene model and direct-manipulation logic for the
//! Themecraft design canvas: geometry, snapping, an undoable element tree and
//! the pointer/keyboard gesture state machine.

pub mod camera;
pub mod canvas;
pub mod description;
pub mod element;
pub mod error;
pub mod events;
pub mod geometry;
pub mod history;
pub mod input;
pub mod interaction;
pub mod scene;
pub mod selection;
pub mod snap;

pub use camera::Camera;
pub use canvas::{Canvas, CanvasConfig};
pub use description::SceneDescription;
pub use element::{DesignElement, ElementId, ElementKind, ElementPatch};
pub use error::{SceneError, SceneResult};
pub use events::{CanvasEvent, CanvasEventKind, ListenerId};
pub use geometry::{GeometryError, ResizeHandle};
pub use history::History;
pub use input::{KeyEvent, Modifiers, MouseButton, PointerEvent};
pub use interaction::{GestureState, InteractionController};
pub use scene::{ClipboardFragment, DeleteMode, SceneState, SceneStore, SelectMode};
pub use snap::{GuideAxis, SnapConfig, SnapGuide, SnapMode, SnapPrecedence};
