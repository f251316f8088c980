//! Gesture state machine turning pointer and keyboard input into scene edits.
//!
//! A gesture moves through `Idle -> Selecting -> (Dragging | Resizing |
//! Rotating | MarqueeSelecting) -> Idle`. While dragging, resizing or rotating
//! every pointer move is written to the store's transient view; only pointer-up
//! commits, producing one undo entry per gesture. Pointer positions given to
//! the controller are in world coordinates.

use crate::canvas::CanvasConfig;
use crate::element::{ElementId, ElementPatch};
use crate::error::SceneResult;
use crate::geometry::{ResizeHandle, ResizeOptions, angle_between, normalize_degrees, resize_rotated};
use crate::input::{KeyEvent, Modifiers, MouseButton, PointerEvent};
use crate::scene::{ClipboardFragment, DeleteMode, SceneState, SceneStore, SelectMode};
use crate::selection::{HANDLE_HIT_TOLERANCE, HandleKind, hit_test_handles};
use crate::snap::{ANGLE_SNAP_INCREMENT, SnapGuide, snap_angle, snap_move, snap_resize};
use kurbo::{Point, Rect, Vec2};
use std::collections::HashSet;

/// Pointer travel (screen pixels) before a press turns into a drag.
pub const DRAG_THRESHOLD: f64 = 3.0;

/// What the pointer went down on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PressTarget {
    Handle { element: ElementId, handle: ResizeHandle },
    Rotate { element: ElementId },
    /// An element; `toggle_on_release` deselects it on a plain shift-click.
    Element { id: ElementId, toggle_on_release: bool },
    Empty,
}

/// An in-progress move of the selection.
#[derive(Debug, Clone, PartialEq)]
pub struct DragGesture {
    pub start: Point,
    /// Union of the moved roots' bounds at gesture start; the snap subject.
    pub anchor: Rect,
    /// Every moved element (roots and descendants) with its start position.
    pub originals: Vec<(ElementId, Point)>,
    /// Static sibling bounds used for guide snapping.
    pub siblings: Vec<Rect>,
    /// Whether the moved elements are alt-drag copies.
    pub duplicate: bool,
}

/// An in-progress resize of one element.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeGesture {
    pub element: ElementId,
    pub handle: ResizeHandle,
    pub start: Point,
    pub original: Rect,
    pub rotation_degrees: f64,
    pub siblings: Vec<Rect>,
}

/// An in-progress rotation of one element.
#[derive(Debug, Clone, PartialEq)]
pub struct RotateGesture {
    pub element: ElementId,
    pub center: Point,
    pub start: Point,
    pub original_rotation: f64,
}

/// Current state of the gesture machine.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    Selecting {
        start: Point,
        target: PressTarget,
    },
    Dragging(DragGesture),
    Resizing(ResizeGesture),
    Rotating(RotateGesture),
    MarqueeSelecting {
        start: Point,
        current: Point,
        additive: bool,
    },
}

/// Interprets input events against a [`SceneStore`].
#[derive(Debug, Clone, Default)]
pub struct InteractionController {
    state: GestureState,
    guides: Vec<SnapGuide>,
    clipboard: Option<ClipboardFragment>,
    paste_count: u32,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == GestureState::Idle
    }

    /// Guides produced by the last snapped frame.
    pub fn guides(&self) -> &[SnapGuide] {
        &self.guides
    }

    pub fn clipboard(&self) -> Option<&ClipboardFragment> {
        self.clipboard.as_ref()
    }

    /// The marquee rectangle while marquee-selecting.
    pub fn marquee_rect(&self) -> Option<Rect> {
        match self.state {
            GestureState::MarqueeSelecting { start, current, .. } => Some(Rect::from_points(start, current)),
            _ => None,
        }
    }

    /// Feed a pointer event with its position already in world coordinates.
    pub fn handle_pointer(
        &mut self,
        store: &mut SceneStore,
        event: PointerEvent,
        zoom: f64,
        config: &CanvasConfig,
    ) -> SceneResult<()> {
        match event {
            PointerEvent::Down { position, button: MouseButton::Left, modifiers } => {
                self.pointer_down(store, position, modifiers, zoom)
            }
            PointerEvent::Move { position, modifiers } => self.pointer_move(store, position, modifiers, zoom, config),
            PointerEvent::Up { position, button: MouseButton::Left, modifiers } => {
                self.pointer_up(store, position, modifiers, zoom, config)
            }
            _ => Ok(()),
        }
    }

    /// Feed a keyboard event. Returns whether it was handled.
    ///
    /// During a gesture only Escape is honoured.
    pub fn handle_key(&mut self, store: &mut SceneStore, event: &KeyEvent, config: &CanvasConfig) -> SceneResult<bool> {
        let KeyEvent::Pressed { key, modifiers } = event else {
            return Ok(false);
        };
        if key == "Escape" {
            if self.is_idle() {
                return Ok(store.clear_selection());
            }
            self.cancel(store);
            return Ok(true);
        }
        if !self.is_idle() {
            return Ok(false);
        }

        let selection = store.selection().to_vec();
        let key = key.to_ascii_lowercase();
        let handled = match (key.as_str(), modifiers.command(), modifiers.shift) {
            ("c", true, _) => {
                self.copy(store, &selection)?;
                true
            }
            ("x", true, _) => {
                if self.copy(store, &selection)? {
                    let deletable = deletable_ids(store.state(), &selection);
                    if !deletable.is_empty() {
                        store.delete_elements(&deletable, DeleteMode::Cascade)?;
                    }
                }
                true
            }
            ("v", true, _) => {
                if let Some(fragment) = &self.clipboard {
                    self.paste_count += 1;
                    let offset = config.paste_offset * f64::from(self.paste_count);
                    store.paste(fragment, Vec2::new(offset, offset))?;
                }
                true
            }
            ("d", true, _) => {
                if !selection.is_empty() {
                    store.duplicate(&selection, Vec2::new(config.paste_offset, config.paste_offset))?;
                }
                true
            }
            ("a", true, _) => {
                store.select_all();
                true
            }
            ("z", true, false) => {
                store.undo();
                true
            }
            ("z", true, true) | ("y", true, _) => {
                store.redo();
                true
            }
            ("g", true, false) => {
                if !selection.is_empty() {
                    store.group(&selection)?;
                }
                true
            }
            ("g", true, true) => {
                for id in &selection {
                    if store.get(*id).is_some_and(|e| e.is_container()) {
                        store.ungroup(*id)?;
                    }
                }
                true
            }
            ("]", true, _) => {
                store.bring_to_front(&selection)?;
                true
            }
            ("[", true, _) => {
                store.send_to_back(&selection)?;
                true
            }
            ("delete" | "backspace", _, _) => {
                let deletable = deletable_ids(store.state(), &selection);
                if !deletable.is_empty() {
                    store.delete_elements(&deletable, DeleteMode::Cascade)?;
                }
                true
            }
            ("arrowleft" | "arrowright" | "arrowup" | "arrowdown", false, shift) => {
                let step = if shift { config.nudge_step * 10.0 } else { config.nudge_step };
                let delta = match key.as_str() {
                    "arrowleft" => Vec2::new(-step, 0.0),
                    "arrowright" => Vec2::new(step, 0.0),
                    "arrowup" => Vec2::new(0.0, -step),
                    _ => Vec2::new(0.0, step),
                };
                let roots = movable_roots(store.state(), &selection);
                if !roots.is_empty() {
                    store.update_elements(&roots, &ElementPatch::translate(delta))?;
                }
                true
            }
            _ => false,
        };
        Ok(handled)
    }

    /// Abort the current gesture, restoring the pre-gesture scene.
    pub fn cancel(&mut self, store: &mut SceneStore) {
        if store.is_transient() && store.cancel_transient().is_ok() {
            log::debug!("Gesture cancelled");
        }
        self.guides.clear();
        self.state = GestureState::Idle;
    }

    fn copy(&mut self, store: &SceneStore, selection: &[ElementId]) -> SceneResult<bool> {
        if selection.is_empty() {
            return Ok(false);
        }
        self.clipboard = Some(store.copy(selection)?);
        self.paste_count = 0;
        Ok(true)
    }

    fn pointer_down(&mut self, store: &mut SceneStore, position: Point, modifiers: Modifiers, zoom: f64) -> SceneResult<()> {
        if !self.is_idle() {
            self.cancel(store);
        }
        let target = match press_target(store, position, zoom) {
            PressTarget::Element { id, .. } => {
                let was_selected = store.is_selected(id);
                if !was_selected {
                    let mode = if modifiers.shift { SelectMode::Add } else { SelectMode::Replace };
                    store.select(&[id], mode)?;
                }
                PressTarget::Element { id, toggle_on_release: was_selected && modifiers.shift }
            }
            other => other,
        };
        self.state = GestureState::Selecting { start: position, target };
        Ok(())
    }

    fn pointer_move(
        &mut self,
        store: &mut SceneStore,
        position: Point,
        modifiers: Modifiers,
        zoom: f64,
        config: &CanvasConfig,
    ) -> SceneResult<()> {
        if let GestureState::Selecting { start, target } = self.state {
            if (position - start).hypot() * zoom.max(f64::EPSILON) < DRAG_THRESHOLD {
                return Ok(());
            }
            self.state = begin_gesture(store, start, target, modifiers)?;
        }

        match &mut self.state {
            GestureState::Dragging(drag) => {
                let result = snap_move(drag.anchor, position - drag.start, &drag.siblings, &config.snap, zoom);
                let delta = result.offset_from(drag.anchor);
                let updates: Vec<(ElementId, ElementPatch)> = drag
                    .originals
                    .iter()
                    .map(|(id, origin)| {
                        (*id, ElementPatch { position: Some(*origin + delta), ..Default::default() })
                    })
                    .collect();
                self.guides = result.guides;
                store.preview(&updates)
            }
            GestureState::Resizing(resize) => {
                let options = ResizeOptions {
                    keep_aspect_ratio: modifiers.shift,
                    min_size: config.min_element_size,
                };
                let mut frame = resize_rotated(
                    resize.handle,
                    resize.original,
                    resize.rotation_degrees,
                    position - resize.start,
                    options,
                )?;
                self.guides.clear();
                if normalize_degrees(resize.rotation_degrees) == 0.0 && !modifiers.shift {
                    let result = snap_resize(frame, resize.handle, &resize.siblings, &config.snap, zoom);
                    frame = result.rect;
                    self.guides = result.guides;
                }
                store.preview(&[(resize.element, ElementPatch::frame(frame))])
            }
            GestureState::Rotating(rotate) => {
                let swept = angle_between(rotate.center, rotate.start, position);
                let angle = rotate.original_rotation + swept;
                let angle = if modifiers.shift {
                    snap_angle(angle, ANGLE_SNAP_INCREMENT)
                } else {
                    normalize_degrees(angle)
                };
                store.preview(&[(rotate.element, ElementPatch::rotation(angle))])
            }
            GestureState::MarqueeSelecting { current, .. } => {
                *current = position;
                Ok(())
            }
            GestureState::Idle | GestureState::Selecting { .. } => Ok(()),
        }
    }

    fn pointer_up(
        &mut self,
        store: &mut SceneStore,
        position: Point,
        modifiers: Modifiers,
        zoom: f64,
        config: &CanvasConfig,
    ) -> SceneResult<()> {
        if matches!(
            self.state,
            GestureState::Dragging(_) | GestureState::Resizing(_) | GestureState::Rotating(_)
        ) {
            self.pointer_move(store, position, modifiers, zoom, config)?;
        }

        let state = std::mem::take(&mut self.state);
        self.guides.clear();
        match state {
            GestureState::Selecting { target, .. } => match target {
                PressTarget::Element { id, toggle_on_release: true } => {
                    store.select(&[id], SelectMode::Toggle)?;
                }
                PressTarget::Element { id, .. } if !modifiers.shift => {
                    store.select(&[id], SelectMode::Replace)?;
                }
                PressTarget::Empty if !modifiers.shift => {
                    store.clear_selection();
                }
                _ => {}
            },
            GestureState::Dragging(_) | GestureState::Resizing(_) | GestureState::Rotating(_) => {
                if store.is_transient() {
                    store.commit_transient()?;
                }
            }
            GestureState::MarqueeSelecting { start, additive, .. } => {
                let ids = store.state().elements_in_rect(Rect::from_points(start, position));
                let mode = if additive { SelectMode::Add } else { SelectMode::Replace };
                store.select(&ids, mode)?;
            }
            GestureState::Idle => {}
        }
        Ok(())
    }
}

/// Selected ids that a keyboard delete may remove: neither the element nor
/// anything nested inside it is locked.
fn deletable_ids(state: &SceneState, selection: &[ElementId]) -> Vec<ElementId> {
    let is_locked = |id: &ElementId| state.get(*id).is_none_or(|e| e.locked);
    selection
        .iter()
        .copied()
        .filter(|id| {
            let protected = is_locked(id) || state.descendants(*id).iter().any(is_locked);
            if protected {
                log::debug!("Keeping {id}: it or a nested element is locked");
            }
            !protected
        })
        .collect()
}

/// Selected, unlocked elements that have no selected ancestor.
pub fn movable_roots(state: &SceneState, selection: &[ElementId]) -> Vec<ElementId> {
    let picked: HashSet<ElementId> = selection
        .iter()
        .copied()
        .filter(|id| state.get(*id).is_some_and(|e| !e.locked))
        .collect();
    selection
        .iter()
        .copied()
        .filter(|id| picked.contains(id))
        .filter(|id| !state.ancestors(*id).iter().any(|a| picked.contains(a)))
        .collect()
}

/// Handles of selected elements first, then elements front to back.
///
/// A hit inside a selected element's subtree resolves to that selected
/// element; otherwise to the hit element's top-level ancestor.
fn press_target(store: &SceneStore, position: Point, zoom: f64) -> PressTarget {
    let zoom = zoom.max(f64::EPSILON);
    let tolerance = HANDLE_HIT_TOLERANCE / zoom;
    for id in store.selection().iter().rev() {
        let Some(element) = store.get(*id) else { continue };
        match hit_test_handles(element, position, tolerance, zoom) {
            Some(HandleKind::Resize(handle)) => return PressTarget::Handle { element: *id, handle },
            Some(HandleKind::Rotate) => return PressTarget::Rotate { element: *id },
            None => {}
        }
    }

    let state = store.state();
    match state.hit_test(position, 0.0) {
        Some(hit) => {
            let selected = std::iter::once(hit)
                .chain(state.ancestors(hit))
                .find(|id| store.is_selected(*id));
            PressTarget::Element {
                id: selected.unwrap_or_else(|| state.top_level(hit)),
                toggle_on_release: false,
            }
        }
        None => PressTarget::Empty,
    }
}

/// Leave `Selecting` once the pointer passed the drag threshold.
fn begin_gesture(
    store: &mut SceneStore,
    start: Point,
    target: PressTarget,
    modifiers: Modifiers,
) -> SceneResult<GestureState> {
    let gesture = match target {
        PressTarget::Empty => GestureState::MarqueeSelecting {
            start,
            current: start,
            additive: modifiers.shift,
        },
        PressTarget::Element { id, toggle_on_release } => {
            let locked = store.get(id).is_none_or(|e| e.locked);
            let roots = movable_roots(store.state(), store.selection());
            if locked || roots.is_empty() {
                return Ok(GestureState::Selecting { start, target: PressTarget::Element { id, toggle_on_release } });
            }
            store.begin_transient();
            let (roots, duplicate) = if modifiers.alt {
                let fragment = store.copy(&roots)?;
                (store.preview_paste(&fragment, Vec2::ZERO)?, true)
            } else {
                (roots, false)
            };
            let state = store.state();
            let mut originals = Vec::new();
            for root in &roots {
                for id in std::iter::once(*root).chain(state.descendants(*root)) {
                    if let Some(element) = state.get(id) {
                        originals.push((id, element.position));
                    }
                }
            }
            let moving: HashSet<ElementId> = originals.iter().map(|(id, _)| *id).collect();
            let parent = roots.first().and_then(|id| state.parent_of(*id));
            let anchor = state.bounds_of(&roots).unwrap_or(Rect::from_origin_size(start, (0.0, 0.0)));
            log::debug!("Drag started with {} elements", originals.len());
            GestureState::Dragging(DragGesture {
                start,
                anchor,
                originals,
                siblings: state.sibling_bounds(parent, &moving),
                duplicate,
            })
        }
        PressTarget::Handle { element, handle } => {
            let Some(el) = store.get(element) else {
                return Ok(GestureState::Idle);
            };
            let gesture = ResizeGesture {
                element,
                handle,
                start,
                original: el.frame(),
                rotation_degrees: el.rotation_degrees,
                siblings: store
                    .state()
                    .sibling_bounds(el.parent_id, &HashSet::from([element])),
            };
            store.begin_transient();
            GestureState::Resizing(gesture)
        }
        PressTarget::Rotate { element } => {
            let Some(el) = store.get(element) else {
                return Ok(GestureState::Idle);
            };
            let gesture = RotateGesture {
                element,
                center: el.frame().center(),
                start,
                original_rotation: el.rotation_degrees,
            };
            store.begin_transient();
            GestureState::Rotating(gesture)
        }
    };
    Ok(gesture)
}
