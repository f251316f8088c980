//! Change notifications for code embedding the canvas.

use crate::element::ElementId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Notification emitted by [`crate::Canvas`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CanvasEvent {
    /// The selection changed; carries the new selection.
    SelectionChanged(Vec<ElementId>),
    /// Elements changed. `committed` is false for live gesture frames.
    ElementsChanged { committed: bool },
    /// Undo/redo availability changed.
    HistoryChanged { can_undo: bool, can_redo: bool },
}

impl CanvasEvent {
    pub fn kind(&self) -> CanvasEventKind {
        match self {
            CanvasEvent::SelectionChanged(_) => CanvasEventKind::SelectionChanged,
            CanvasEvent::ElementsChanged { .. } => CanvasEventKind::ElementsChanged,
            CanvasEvent::HistoryChanged { .. } => CanvasEventKind::HistoryChanged,
        }
    }
}

/// Event filter used when registering a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CanvasEventKind {
    SelectionChanged,
    ElementsChanged,
    HistoryChanged,
}

/// Handle returned by [`EventBus::on`], used to unregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// Boxed event handler.
pub type Listener = Box<dyn FnMut(&CanvasEvent)>;

/// Registered listeners, called in registration order.
#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    listeners: Vec<(ListenerId, CanvasEventKind, Listener)>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(&mut self, kind: CanvasEventKind, handler: impl FnMut(&CanvasEvent) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, kind, Box::new(handler)));
        id
    }

    /// Unregister a listener. Returns `false` for unknown ids.
    pub fn off(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener, _, _)| *listener != id);
        self.listeners.len() != before
    }

    pub fn emit(&mut self, event: &CanvasEvent) {
        let kind = event.kind();
        for (_, filter, handler) in &mut self.listeners {
            if *filter == kind {
                handler(event);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}
