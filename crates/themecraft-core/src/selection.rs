//! Selection handles around selected elements.

use crate::element::DesignElement;
use crate::geometry::{ResizeHandle, handle_position, rotate_point};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Handle hit tolerance in screen pixels.
pub const HANDLE_HIT_TOLERANCE: f64 = 10.0;

/// Distance from the top edge to the rotation handle, in screen pixels.
pub const ROTATE_HANDLE_OFFSET: f64 = 25.0;

/// Type of selection handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleKind {
    Resize(ResizeHandle),
    /// Rotation handle above the top edge.
    Rotate,
}

/// A selection handle with its position and type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handle {
    /// Position in world coordinates.
    pub position: Point,
    pub kind: HandleKind,
}

impl Handle {
    pub fn new(position: Point, kind: HandleKind) -> Self {
        Self { position, kind }
    }

    /// Check if a world point hits this handle. `tolerance` is in world units.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        (point - self.position).hypot2() <= tolerance * tolerance
    }
}

/// Handles of a single element, rotated with it.
///
/// `zoom` keeps the rotation handle at a constant on-screen distance. Locked
/// elements have no handles.
pub fn get_handles(element: &DesignElement, zoom: f64) -> Vec<Handle> {
    if element.locked {
        return Vec::new();
    }
    frame_handles(element.frame(), element.rotation_degrees, zoom)
}

/// Eight resize handles plus the rotation handle for a frame rotated about its center.
pub fn frame_handles(frame: Rect, rotation_degrees: f64, zoom: f64) -> Vec<Handle> {
    let center = frame.center();
    let mut handles: Vec<Handle> = ResizeHandle::ALL
        .iter()
        .map(|handle| {
            Handle::new(
                rotate_point(handle_position(*handle, frame), center, rotation_degrees),
                HandleKind::Resize(*handle),
            )
        })
        .collect();
    let offset = if zoom > 0.0 { ROTATE_HANDLE_OFFSET / zoom } else { ROTATE_HANDLE_OFFSET };
    let rotate = Point::new(center.x, frame.y0 - offset);
    handles.push(Handle::new(
        rotate_point(rotate, center, rotation_degrees),
        HandleKind::Rotate,
    ));
    handles
}

/// Find which handle (if any) is hit at `point`.
///
/// Corners win over edges when they overlap on tiny elements.
pub fn hit_test_handles(element: &DesignElement, point: Point, tolerance: f64, zoom: f64) -> Option<HandleKind> {
    get_handles(element, zoom)
        .into_iter()
        .find(|handle| handle.hit_test(point, tolerance))
        .map(|handle| handle.kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handles_cover_frame() {
        let element = DesignElement::rectangle(Rect::new(0.0, 0.0, 100.0, 50.0));
        let handles = get_handles(&element, 1.0);
        assert_eq!(handles.len(), 9);
        let se = handles
            .iter()
            .find(|h| h.kind == HandleKind::Resize(ResizeHandle::BottomRight))
            .unwrap();
        assert_eq!(se.position, Point::new(100.0, 50.0));
        let rotate = handles.iter().find(|h| h.kind == HandleKind::Rotate).unwrap();
        assert_eq!(rotate.position, Point::new(50.0, -25.0));
    }

    #[test]
    fn test_hit_test_handles() {
        let element = DesignElement::rectangle(Rect::new(0.0, 0.0, 100.0, 50.0));
        assert_eq!(
            hit_test_handles(&element, Point::new(98.0, 2.0), 5.0, 1.0),
            Some(HandleKind::Resize(ResizeHandle::TopRight))
        );
        assert_eq!(
            hit_test_handles(&element, Point::new(50.0, 25.0), 5.0, 1.0),
            None
        );
        assert_eq!(
            hit_test_handles(&element, Point::new(51.0, -24.0), 5.0, 1.0),
            Some(HandleKind::Rotate)
        );
    }

    #[test]
    fn test_rotated_handles_follow_element() {
        let element = DesignElement::rectangle(Rect::new(0.0, 0.0, 100.0, 100.0)).with_rotation(90.0);
        let handles = get_handles(&element, 1.0);
        let nw = handles
            .iter()
            .find(|h| h.kind == HandleKind::Resize(ResizeHandle::TopLeft))
            .unwrap();
        // Top-left rotates a quarter turn clockwise to the top-right corner
        assert!((nw.position.x - 100.0).abs() < 1e-9);
        assert!(nw.position.y.abs() < 1e-9);
    }

    #[test]
    fn test_locked_has_no_handles() {
        let element = DesignElement::rectangle(Rect::new(0.0, 0.0, 10.0, 10.0)).locked();
        assert!(get_handles(&element, 1.0).is_empty());
    }
}
