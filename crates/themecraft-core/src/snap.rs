//! Snap functionality for aligning moving elements to a grid and to sibling elements.

use crate::geometry::{MIN_ELEMENT_SIZE, ResizeHandle, normalize_degrees};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Default grid size for snapping.
pub const GRID_SIZE: f64 = 20.0;

/// Default distance (in screen pixels) within which guides attract.
pub const GUIDE_SNAP_TOLERANCE: f64 = 6.0;

/// Angle snap increment in degrees.
pub const ANGLE_SNAP_INCREMENT: f64 = 15.0;

/// Snap mode for aligning elements to the grid or to other elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SnapMode {
    /// No snapping.
    None,
    /// Snap to grid lines.
    Grid,
    /// Snap to sibling edges and centers.
    #[default]
    Guides,
    /// Snap to both grid and guides.
    All,
}

impl SnapMode {
    /// Cycle to the next snap mode.
    pub fn next(self) -> Self {
        match self {
            SnapMode::None => SnapMode::Grid,
            SnapMode::Grid => SnapMode::Guides,
            SnapMode::Guides => SnapMode::All,
            SnapMode::All => SnapMode::None,
        }
    }

    /// Check if grid snapping is enabled.
    pub fn snaps_to_grid(self) -> bool {
        matches!(self, SnapMode::Grid | SnapMode::All)
    }

    /// Check if guide snapping is enabled.
    pub fn snaps_to_guides(self) -> bool {
        matches!(self, SnapMode::Guides | SnapMode::All)
    }

    /// Check if any snapping is enabled.
    pub fn is_enabled(self) -> bool {
        self != SnapMode::None
    }
}

/// Which snap wins on an axis where both grid and guide snapping apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SnapPrecedence {
    #[default]
    GuideFirst,
    GridFirst,
}

/// Snapping parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapConfig {
    pub mode: SnapMode,
    pub grid_size: f64,
    /// Guide tolerance in screen pixels; divided by the zoom factor before use.
    pub tolerance: f64,
    pub precedence: SnapPrecedence,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            mode: SnapMode::default(),
            grid_size: GRID_SIZE,
            tolerance: GUIDE_SNAP_TOLERANCE,
            precedence: SnapPrecedence::default(),
        }
    }
}

impl SnapConfig {
    /// Guide tolerance in world units at the given zoom.
    pub fn world_tolerance(&self, zoom: f64) -> f64 {
        if zoom > 0.0 { self.tolerance / zoom } else { self.tolerance }
    }

    fn grid_enabled(&self) -> bool {
        self.mode.snaps_to_grid() && self.grid_size > 0.0
    }
}

/// Orientation of an alignment guide line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuideAxis {
    /// A horizontal line at `y = position`.
    Horizontal,
    /// A vertical line at `x = position`.
    Vertical,
}

/// A transient alignment line shown while dragging.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SnapGuide {
    pub axis: GuideAxis,
    pub position: f64,
}

/// Result of snapping a moving rectangle.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapResult {
    /// The adjusted rectangle.
    pub rect: Rect,
    /// Guides that produced the snap (at most one per axis).
    pub guides: Vec<SnapGuide>,
    /// Whether the X coordinate was snapped.
    pub snapped_x: bool,
    /// Whether the Y coordinate was snapped.
    pub snapped_y: bool,
}

impl SnapResult {
    /// Create a result with no snapping.
    pub fn none(rect: Rect) -> Self {
        Self {
            rect,
            guides: Vec::new(),
            snapped_x: false,
            snapped_y: false,
        }
    }

    /// Check if any snapping occurred.
    pub fn is_snapped(&self) -> bool {
        self.snapped_x || self.snapped_y
    }

    /// Translation from `original` to the snapped rectangle's origin.
    pub fn offset_from(&self, original: Rect) -> Vec2 {
        self.rect.origin() - original.origin()
    }
}

/// Snap a value to the nearest multiple of `grid_size`.
pub fn snap_value_to_grid(value: f64, grid_size: f64) -> f64 {
    if grid_size <= 0.0 {
        return value;
    }
    (value / grid_size).round() * grid_size
}

/// Snap a point to the nearest grid intersection.
pub fn snap_to_grid(point: Point, grid_size: f64) -> Point {
    Point::new(
        snap_value_to_grid(point.x, grid_size),
        snap_value_to_grid(point.y, grid_size),
    )
}

/// Snap an angle to the nearest increment, normalized to `[0, 360)`.
pub fn snap_angle(angle_degrees: f64, increment: f64) -> f64 {
    if increment <= 0.0 {
        return normalize_degrees(angle_degrees);
    }
    normalize_degrees((angle_degrees / increment).round() * increment)
}

/// Which line of a rectangle on one axis: leading edge, center or trailing edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    Start,
    Center,
    End,
}

fn axis_lines(rect: Rect, axis: GuideAxis) -> [(LineKind, f64); 3] {
    match axis {
        GuideAxis::Vertical => [
            (LineKind::Start, rect.x0),
            (LineKind::Center, (rect.x0 + rect.x1) / 2.0),
            (LineKind::End, rect.x1),
        ],
        GuideAxis::Horizontal => [
            (LineKind::Start, rect.y0),
            (LineKind::Center, (rect.y0 + rect.y1) / 2.0),
            (LineKind::End, rect.y1),
        ],
    }
}

/// Closest sibling line to any of the moving lines, within tolerance.
///
/// Returns the moving line kind and the sibling line it should land on.
/// The first pair wins on an exact tie, so results follow sibling order.
fn closest_alignment(
    moving: &[(LineKind, f64)],
    siblings: &[Rect],
    axis: GuideAxis,
    tolerance: f64,
) -> Option<(LineKind, f64)> {
    let mut best: Option<(LineKind, f64, f64)> = None;
    for sibling in siblings {
        for &(_, target) in &axis_lines(*sibling, axis) {
            for &(kind, line) in moving {
                let distance = (target - line).abs();
                if distance > tolerance {
                    continue;
                }
                if best.is_none_or(|(_, _, d)| distance < d) {
                    best = Some((kind, target, distance));
                }
            }
        }
    }
    best.map(|(kind, target, _)| (kind, target))
}

/// Move a rectangle's axis range so that `kind` lands on `target`.
fn place_span(start: f64, end: f64, kind: LineKind, target: f64) -> (f64, f64) {
    let len = end - start;
    match kind {
        LineKind::Start => (target, target + len),
        LineKind::Center => (target - len / 2.0, target + len / 2.0),
        LineKind::End => (target - len, target),
    }
}

fn with_span(rect: Rect, axis: GuideAxis, span: (f64, f64)) -> Rect {
    match axis {
        GuideAxis::Vertical => Rect::new(span.0, rect.y0, span.1, rect.y1),
        GuideAxis::Horizontal => Rect::new(rect.x0, span.0, rect.x1, span.1),
    }
}

fn span_of(rect: Rect, axis: GuideAxis) -> (f64, f64) {
    match axis {
        GuideAxis::Vertical => (rect.x0, rect.x1),
        GuideAxis::Horizontal => (rect.y0, rect.y1),
    }
}

/// Snap a translated rectangle.
///
/// `original` is the rectangle before the gesture and `raw_delta` the
/// unsnapped pointer movement. `siblings` are the static rectangles in the
/// same parent. An axis that has not moved is never grid-snapped, so a
/// horizontal drag leaves the vertical position alone.
pub fn snap_move(
    original: Rect,
    raw_delta: Vec2,
    siblings: &[Rect],
    config: &SnapConfig,
    zoom: f64,
) -> SnapResult {
    let candidate = original + raw_delta;
    if !config.mode.is_enabled() {
        return SnapResult::none(candidate);
    }

    let tolerance = config.world_tolerance(zoom);
    let mut result = SnapResult::none(candidate);

    for (axis, moved) in [
        (GuideAxis::Vertical, raw_delta.x != 0.0),
        (GuideAxis::Horizontal, raw_delta.y != 0.0),
    ] {
        let (start, end) = span_of(result.rect, axis);
        let guide = if config.mode.snaps_to_guides() {
            closest_alignment(&axis_lines(result.rect, axis), siblings, axis, tolerance)
        } else {
            None
        };
        let grid = if config.grid_enabled() && moved {
            Some(snap_value_to_grid(start, config.grid_size))
        } else {
            None
        };

        let use_guide = match (guide, grid, config.precedence) {
            (Some(_), Some(_), SnapPrecedence::GridFirst) => false,
            (Some(_), _, _) => true,
            _ => false,
        };

        let span = if use_guide {
            guide.map(|(kind, target)| {
                result.guides.push(SnapGuide { axis, position: target });
                place_span(start, end, kind, target)
            })
        } else {
            grid.map(|target| place_span(start, end, LineKind::Start, target))
        };

        if let Some(span) = span {
            result.rect = with_span(result.rect, axis, span);
            match axis {
                GuideAxis::Vertical => result.snapped_x = true,
                GuideAxis::Horizontal => result.snapped_y = true,
            }
        }
    }

    result
}

/// Snap the edges a resize handle is dragging.
///
/// Only the edges that `handle` moves are adjusted; the anchored edges keep
/// their position. Snaps that would shrink the rectangle below the minimum
/// element size are skipped.
pub fn snap_resize(
    rect: Rect,
    handle: ResizeHandle,
    siblings: &[Rect],
    config: &SnapConfig,
    zoom: f64,
) -> SnapResult {
    if !config.mode.is_enabled() {
        return SnapResult::none(rect);
    }

    let tolerance = config.world_tolerance(zoom);
    let (dir_x, dir_y) = handle.direction();
    let mut result = SnapResult::none(rect);

    for (axis, dir) in [(GuideAxis::Vertical, dir_x), (GuideAxis::Horizontal, dir_y)] {
        if dir == 0 {
            continue;
        }
        let (start, end) = span_of(result.rect, axis);
        let (kind, edge) = if dir > 0 { (LineKind::End, end) } else { (LineKind::Start, start) };

        let guide = if config.mode.snaps_to_guides() {
            closest_alignment(&[(kind, edge)], siblings, axis, tolerance).map(|(_, t)| t)
        } else {
            None
        };
        let grid = config
            .grid_enabled()
            .then(|| snap_value_to_grid(edge, config.grid_size));

        let (target, from_guide) = match (guide, grid, config.precedence) {
            (Some(_), Some(g), SnapPrecedence::GridFirst) => (g, false),
            (Some(t), _, _) => (t, true),
            (None, Some(g), _) => (g, false),
            (None, None, _) => continue,
        };

        let span = if dir > 0 { (start, target) } else { (target, end) };
        if span.1 - span.0 < MIN_ELEMENT_SIZE {
            continue;
        }
        result.rect = with_span(result.rect, axis, span);
        if from_guide {
            result.guides.push(SnapGuide { axis, position: target });
        }
        match axis {
            GuideAxis::Vertical => result.snapped_x = true,
            GuideAxis::Horizontal => result.snapped_y = true,
        }
    }

    result
}
