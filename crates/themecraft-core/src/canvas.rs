//! The embeddable canvas: scene store, camera, gesture controller and listeners.

use crate::camera::Camera;
use crate::description::SceneDescription;
use crate::element::ElementId;
use crate::error::SceneResult;
use crate::events::{CanvasEvent, CanvasEventKind, EventBus, ListenerId};
use crate::geometry::MIN_ELEMENT_SIZE;
use crate::history::DEFAULT_HISTORY_DEPTH;
use crate::input::{KeyEvent, PointerEvent};
use crate::interaction::InteractionController;
use crate::scene::SceneStore;
use crate::snap::{SnapConfig, SnapGuide, SnapMode};
use kurbo::Rect;
use serde::{Deserialize, Serialize};

/// Zoom factor applied per scroll notch with the command modifier held.
const SCROLL_ZOOM_STEP: f64 = 1.1;

/// Canvas behaviour settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub snap: SnapConfig,
    pub history_depth: usize,
    /// Offset applied to pasted and duplicated elements.
    pub paste_offset: f64,
    /// Arrow-key nudge distance; shift multiplies it by ten.
    pub nudge_step: f64,
    pub min_element_size: f64,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            snap: SnapConfig::default(),
            history_depth: DEFAULT_HISTORY_DEPTH,
            paste_offset: 10.0,
            nudge_step: 1.0,
            min_element_size: MIN_ELEMENT_SIZE,
        }
    }
}

/// What listeners have already been told about.
#[derive(Debug, Clone, PartialEq)]
struct Observed {
    selection: Vec<ElementId>,
    revision: u64,
    live_revision: u64,
    can_undo: bool,
    can_redo: bool,
}

/// A self-contained design canvas.
///
/// Each canvas owns its scene and history exclusively. Input is expected in
/// screen coordinates and converted through the camera.
#[derive(Debug, Default)]
pub struct Canvas {
    config: CanvasConfig,
    store: SceneStore,
    camera: Camera,
    controller: InteractionController,
    events: EventBus,
}

impl Canvas {
    pub fn new() -> Self {
        Self::with_config(CanvasConfig::default())
    }

    pub fn with_config(config: CanvasConfig) -> Self {
        Self {
            store: SceneStore::with_history_depth(config.history_depth),
            config,
            camera: Camera::new(),
            controller: InteractionController::new(),
            events: EventBus::new(),
        }
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn store(&self) -> &SceneStore {
        &self.store
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    pub fn set_snap_mode(&mut self, mode: SnapMode) {
        self.config.snap.mode = mode;
    }

    /// Guides of the last snapped gesture frame, for rendering.
    pub fn guides(&self) -> &[SnapGuide] {
        self.controller.guides()
    }

    /// Marquee rectangle in world coordinates while marquee-selecting.
    pub fn marquee_rect(&self) -> Option<Rect> {
        self.controller.marquee_rect()
    }

    /// Replace the scene. History is cleared; invalid descriptions are rejected.
    pub fn load_scene(&mut self, description: &SceneDescription) -> SceneResult<()> {
        let state = description.to_state()?;
        self.controller.cancel(&mut self.store);
        self.edit(|store| store.load(state))
    }

    /// Description of the last committed scene.
    pub fn get_scene(&self) -> SceneDescription {
        SceneDescription::from_state(self.store.committed_state())
    }

    pub fn on(&mut self, kind: CanvasEventKind, handler: impl FnMut(&CanvasEvent) + 'static) -> ListenerId {
        self.events.on(kind, handler)
    }

    pub fn off(&mut self, id: ListenerId) -> bool {
        self.events.off(id)
    }

    /// Handle a pointer event in screen coordinates.
    ///
    /// Scrolling pans the view, or zooms around the pointer with the command
    /// modifier held.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> SceneResult<()> {
        if let PointerEvent::Scroll { position, delta, modifiers } = event {
            if modifiers.command() {
                let factor = if delta.y < 0.0 { SCROLL_ZOOM_STEP } else { 1.0 / SCROLL_ZOOM_STEP };
                self.camera.zoom_at(position, factor);
            } else {
                self.camera.pan(-delta);
            }
            return Ok(());
        }
        let camera = &self.camera;
        let world = event.map_position(|p| camera.screen_to_world(p));
        let zoom = self.camera.zoom;
        let config = self.config.clone();
        let controller = &mut self.controller;
        let result = Self::observe(&mut self.store, &mut self.events, |store| {
            controller.handle_pointer(store, world, zoom, &config)
        });
        result.inspect_err(|err| log::debug!("Pointer event rejected: {err}"))
    }

    /// Handle a key press. Returns whether it was consumed.
    pub fn handle_key(&mut self, event: &KeyEvent) -> SceneResult<bool> {
        let config = self.config.clone();
        let controller = &mut self.controller;
        Self::observe(&mut self.store, &mut self.events, |store| {
            controller.handle_key(store, event, &config)
        })
    }

    /// Run a programmatic edit (e.g. from a property inspector) and notify listeners.
    ///
    /// Any gesture in progress is cancelled first.
    pub fn edit<R>(&mut self, f: impl FnOnce(&mut SceneStore) -> R) -> R {
        if !self.controller.is_idle() {
            self.controller.cancel(&mut self.store);
        }
        Self::observe(&mut self.store, &mut self.events, f)
    }

    pub fn undo(&mut self) -> bool {
        self.edit(SceneStore::undo)
    }

    pub fn redo(&mut self) -> bool {
        self.edit(SceneStore::redo)
    }

    fn observe<R>(store: &mut SceneStore, events: &mut EventBus, f: impl FnOnce(&mut SceneStore) -> R) -> R {
        let before = Self::observed(store);
        let result = f(store);
        let after = Self::observed(store);

        if after.revision != before.revision {
            events.emit(&CanvasEvent::ElementsChanged { committed: true });
        } else if after.live_revision != before.live_revision {
            events.emit(&CanvasEvent::ElementsChanged { committed: !store.is_transient() });
        }
        if after.selection != before.selection {
            events.emit(&CanvasEvent::SelectionChanged(after.selection.clone()));
        }
        if (after.can_undo, after.can_redo) != (before.can_undo, before.can_redo) {
            events.emit(&CanvasEvent::HistoryChanged {
                can_undo: after.can_undo,
                can_redo: after.can_redo,
            });
        }
        result
    }

    fn observed(store: &SceneStore) -> Observed {
        Observed {
            selection: store.selection().to_vec(),
            revision: store.revision(),
            live_revision: store.live_revision(),
            can_undo: store.can_undo(),
            can_redo: store.can_redo(),
        }
    }
}
