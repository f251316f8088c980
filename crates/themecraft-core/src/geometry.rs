//! Pure transform math: rotation, bounding boxes and handle-based resizing.
//!
//! Nothing in here holds state. Angles are expressed in degrees, matching the
//! `rotation_degrees` field stored on elements.

use kurbo::{Affine, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Smallest width or height a resize is allowed to produce.
pub const MIN_ELEMENT_SIZE: f64 = 8.0;

/// Rejected geometry input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("{0} is not a finite number")]
    NonFinite(&'static str),
    #[error("negative dimensions {width} x {height}")]
    NegativeSize { width: f64, height: f64 },
}

/// Result type for geometry operations.
pub type GeometryResult<T> = Result<T, GeometryError>;

/// The eight resize handles around an element's frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResizeHandle {
    #[serde(rename = "n")]
    Top,
    #[serde(rename = "s")]
    Bottom,
    #[serde(rename = "e")]
    Right,
    #[serde(rename = "w")]
    Left,
    #[serde(rename = "ne")]
    TopRight,
    #[serde(rename = "nw")]
    TopLeft,
    #[serde(rename = "se")]
    BottomRight,
    #[serde(rename = "sw")]
    BottomLeft,
}

impl ResizeHandle {
    /// All handles, corners first.
    pub const ALL: [ResizeHandle; 8] = [
        ResizeHandle::TopLeft,
        ResizeHandle::TopRight,
        ResizeHandle::BottomRight,
        ResizeHandle::BottomLeft,
        ResizeHandle::Top,
        ResizeHandle::Right,
        ResizeHandle::Bottom,
        ResizeHandle::Left,
    ];

    /// Which edges this handle drags: -1 = left/top, 1 = right/bottom, 0 = none.
    pub fn direction(self) -> (i8, i8) {
        match self {
            ResizeHandle::Top => (0, -1),
            ResizeHandle::Bottom => (0, 1),
            ResizeHandle::Right => (1, 0),
            ResizeHandle::Left => (-1, 0),
            ResizeHandle::TopRight => (1, -1),
            ResizeHandle::TopLeft => (-1, -1),
            ResizeHandle::BottomRight => (1, 1),
            ResizeHandle::BottomLeft => (-1, 1),
        }
    }

    /// The handle diagonally (or directly) across the frame.
    pub fn opposite(self) -> Self {
        match self {
            ResizeHandle::Top => ResizeHandle::Bottom,
            ResizeHandle::Bottom => ResizeHandle::Top,
            ResizeHandle::Right => ResizeHandle::Left,
            ResizeHandle::Left => ResizeHandle::Right,
            ResizeHandle::TopRight => ResizeHandle::BottomLeft,
            ResizeHandle::TopLeft => ResizeHandle::BottomRight,
            ResizeHandle::BottomRight => ResizeHandle::TopLeft,
            ResizeHandle::BottomLeft => ResizeHandle::TopRight,
        }
    }

    /// Short compass name (`n`, `se`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            ResizeHandle::Top => "n",
            ResizeHandle::Bottom => "s",
            ResizeHandle::Right => "e",
            ResizeHandle::Left => "w",
            ResizeHandle::TopRight => "ne",
            ResizeHandle::TopLeft => "nw",
            ResizeHandle::BottomRight => "se",
            ResizeHandle::BottomLeft => "sw",
        }
    }
}

/// Options controlling [`resize_from_handle_with`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeOptions {
    /// Preserve the original width/height ratio.
    pub keep_aspect_ratio: bool,
    /// Minimum width and height.
    pub min_size: f64,
}

impl Default for ResizeOptions {
    fn default() -> Self {
        Self {
            keep_aspect_ratio: false,
            min_size: MIN_ELEMENT_SIZE,
        }
    }
}

/// Reject rectangles with NaN/infinite coordinates or negative extent.
pub fn validate_rect(rect: Rect) -> GeometryResult<Rect> {
    if ![rect.x0, rect.y0, rect.x1, rect.y1].iter().all(|v| v.is_finite()) {
        return Err(GeometryError::NonFinite("rect"));
    }
    if rect.width() < 0.0 || rect.height() < 0.0 {
        return Err(GeometryError::NegativeSize {
            width: rect.width(),
            height: rect.height(),
        });
    }
    Ok(rect)
}

fn validate_scalar(value: f64, what: &'static str) -> GeometryResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(GeometryError::NonFinite(what))
    }
}

/// Normalize an angle into `[0, 360)`.
pub fn normalize_degrees(degrees: f64) -> f64 {
    let d = degrees.rem_euclid(360.0);
    if d >= 360.0 { 0.0 } else { d }
}

/// Rotate `point` around `center` by `angle_degrees` (clockwise on a y-down canvas).
pub fn rotate_point(point: Point, center: Point, angle_degrees: f64) -> Point {
    Affine::rotate_about(angle_degrees.to_radians(), center) * point
}

/// Rotate a vector by `angle_degrees`.
pub fn rotate_vec(v: Vec2, angle_degrees: f64) -> Vec2 {
    let (sin, cos) = angle_degrees.to_radians().sin_cos();
    Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

/// Axis-aligned rectangle enclosing `rect` rotated around its center.
pub fn rotated_bounding_box(rect: Rect, angle_degrees: f64) -> GeometryResult<Rect> {
    validate_rect(rect)?;
    validate_scalar(angle_degrees, "angle")?;
    if normalize_degrees(angle_degrees) == 0.0 {
        return Ok(rect);
    }

    let center = rect.center();
    let corners = [
        Point::new(rect.x0, rect.y0),
        Point::new(rect.x1, rect.y0),
        Point::new(rect.x1, rect.y1),
        Point::new(rect.x0, rect.y1),
    ];
    let mut bounds = Rect::from_points(
        rotate_point(corners[0], center, angle_degrees),
        rotate_point(corners[0], center, angle_degrees),
    );
    for corner in &corners[1..] {
        bounds = bounds.union_pt(rotate_point(*corner, center, angle_degrees));
    }
    Ok(bounds)
}

/// Union of a set of rectangles, or `None` when empty.
pub fn bounding_box_of(rects: impl IntoIterator<Item = Rect>) -> Option<Rect> {
    rects.into_iter().reduce(|acc, r| acc.union(r))
}

/// Position of a handle on an unrotated frame.
pub fn handle_position(handle: ResizeHandle, rect: Rect) -> Point {
    let (dx, dy) = handle.direction();
    let x = match dx {
        -1 => rect.x0,
        1 => rect.x1,
        _ => rect.center().x,
    };
    let y = match dy {
        -1 => rect.y0,
        1 => rect.y1,
        _ => rect.center().y,
    };
    Point::new(x, y)
}

/// The point that stays fixed while dragging `handle`.
pub fn handle_anchor(handle: ResizeHandle, rect: Rect) -> Point {
    handle_position(handle.opposite(), rect)
}

/// Resize `rect` by dragging `handle` by `delta`, keeping the opposite edge or corner fixed.
pub fn resize_from_handle(handle: ResizeHandle, rect: Rect, delta: Vec2) -> GeometryResult<Rect> {
    resize_from_handle_with(handle, rect, delta, ResizeOptions::default())
}

/// [`resize_from_handle`] with explicit aspect-ratio and minimum-size options.
pub fn resize_from_handle_with(
    handle: ResizeHandle,
    rect: Rect,
    delta: Vec2,
    options: ResizeOptions,
) -> GeometryResult<Rect> {
    validate_rect(rect)?;
    validate_scalar(delta.x, "delta.x")?;
    validate_scalar(delta.y, "delta.y")?;
    let min = validate_scalar(options.min_size, "min_size")?.max(0.0);

    let (dir_x, dir_y) = handle.direction();
    let old_w = rect.width();
    let old_h = rect.height();

    let mut w = if dir_x == 0 { old_w } else { old_w + f64::from(dir_x) * delta.x };
    let mut h = if dir_y == 0 { old_h } else { old_h + f64::from(dir_y) * delta.y };
    w = w.max(min);
    h = h.max(min);

    if options.keep_aspect_ratio && old_w > 0.0 && old_h > 0.0 {
        let aspect = old_w / old_h;
        match (dir_x, dir_y) {
            (0, _) => w = h * aspect,
            (_, 0) => h = w / aspect,
            _ => {
                let scale = (w / old_w).max(h / old_h);
                w = old_w * scale;
                h = old_h * scale;
            }
        }
        // Grow both sides together until neither is under the minimum
        let under = (min / w).max(min / h);
        if under > 1.0 {
            w *= under;
            h *= under;
        }
    }

    let (x0, x1) = match dir_x {
        1 => (rect.x0, rect.x0 + w),
        -1 => (rect.x1 - w, rect.x1),
        _ => {
            let cx = rect.center().x;
            (cx - w / 2.0, cx + w / 2.0)
        }
    };
    let (y0, y1) = match dir_y {
        1 => (rect.y0, rect.y0 + h),
        -1 => (rect.y1 - h, rect.y1),
        _ => {
            let cy = rect.center().y;
            (cy - h / 2.0, cy + h / 2.0)
        }
    };
    Ok(Rect::new(x0, y0, x1, y1))
}

/// Resize a rotated element.
///
/// `rect` is the element's unrotated frame and `world_delta` the pointer
/// movement in canvas space. The delta is mapped into the element's local
/// frame before resizing, and the result is shifted so the anchor handle
/// keeps its on-screen position.
pub fn resize_rotated(
    handle: ResizeHandle,
    rect: Rect,
    rotation_degrees: f64,
    world_delta: Vec2,
    options: ResizeOptions,
) -> GeometryResult<Rect> {
    validate_scalar(rotation_degrees, "rotation")?;
    if normalize_degrees(rotation_degrees) == 0.0 {
        return resize_from_handle_with(handle, rect, world_delta, options);
    }

    let local_delta = rotate_vec(world_delta, -rotation_degrees);
    let resized = resize_from_handle_with(handle, rect, local_delta, options)?;

    let anchor_before = rotate_point(handle_anchor(handle, rect), rect.center(), rotation_degrees);
    let anchor_after = rotate_point(
        handle_anchor(handle, resized),
        resized.center(),
        rotation_degrees,
    );
    Ok(resized + (anchor_before - anchor_after))
}

/// Signed angle in degrees swept from `from` to `to` around `center`.
pub fn angle_between(center: Point, from: Point, to: Point) -> f64 {
    let a = (from.y - center.y).atan2(from.x - center.x);
    let b = (to.y - center.y).atan2(to.x - center.x);
    (b - a).to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_rotate_point_quarter_turn() {
        let p = rotate_point(Point::new(10.0, 0.0), Point::ZERO, 90.0);
        assert!(approx(p.x, 0.0));
        assert!(approx(p.y, 10.0));
    }

    #[test]
    fn test_rotated_bounding_box_square_45() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        let bb = rotated_bounding_box(rect, 45.0).unwrap();
        let half_diag = 50.0_f64.sqrt();
        assert!(approx(bb.x0, 5.0 - half_diag));
        assert!(approx(bb.x1, 5.0 + half_diag));
        assert!(approx(bb.center().x, 5.0));
    }

    #[test]
    fn test_rotated_bounding_box_identity() {
        let rect = Rect::new(1.0, 2.0, 30.0, 40.0);
        assert_eq!(rotated_bounding_box(rect, 360.0).unwrap(), rect);
    }

    #[test]
    fn test_rejects_nan_and_negative() {
        let nan = Rect::new(f64::NAN, 0.0, 10.0, 10.0);
        assert!(matches!(rotated_bounding_box(nan, 0.0), Err(GeometryError::NonFinite(_))));

        let inverted = Rect::new(10.0, 0.0, 0.0, 10.0);
        assert!(matches!(
            resize_from_handle(ResizeHandle::BottomRight, inverted, Vec2::ZERO),
            Err(GeometryError::NegativeSize { .. })
        ));
    }

    #[test]
    fn test_resize_se_keeps_top_left() {
        let rect = Rect::new(10.0, 20.0, 110.0, 70.0);
        let r = resize_from_handle(ResizeHandle::BottomRight, rect, Vec2::new(15.0, -5.0)).unwrap();
        assert_eq!((r.x0, r.y0), (10.0, 20.0));
        assert_eq!((r.width(), r.height()), (115.0, 45.0));
    }

    #[test]
    fn test_resize_nw_keeps_bottom_right() {
        let rect = Rect::new(10.0, 20.0, 110.0, 70.0);
        let r = resize_from_handle(ResizeHandle::TopLeft, rect, Vec2::new(30.0, 10.0)).unwrap();
        assert_eq!((r.x1, r.y1), (110.0, 70.0));
        assert_eq!((r.x0, r.y0), (40.0, 30.0));
    }

    #[test]
    fn test_resize_clamps_to_minimum() {
        let rect = Rect::new(0.0, 0.0, 50.0, 50.0);
        // Dragging the left edge far past the right edge must not invert
        let r = resize_from_handle(ResizeHandle::Left, rect, Vec2::new(500.0, 0.0)).unwrap();
        assert_eq!(r.x1, 50.0);
        assert_eq!(r.width(), MIN_ELEMENT_SIZE);
        assert_eq!(r.height(), 50.0);
    }

    #[test]
    fn test_edge_handle_ignores_cross_axis() {
        let rect = Rect::new(0.0, 0.0, 50.0, 50.0);
        let r = resize_from_handle(ResizeHandle::Right, rect, Vec2::new(10.0, 99.0)).unwrap();
        assert_eq!(r, Rect::new(0.0, 0.0, 60.0, 50.0));
    }

    #[test]
    fn test_aspect_ratio_corner() {
        let rect = Rect::new(0.0, 0.0, 100.0, 50.0);
        let options = ResizeOptions { keep_aspect_ratio: true, ..Default::default() };
        let r = resize_from_handle_with(ResizeHandle::BottomRight, rect, Vec2::new(100.0, 10.0), options)
            .unwrap();
        assert!(approx(r.width() / r.height(), 2.0));
        assert_eq!((r.x0, r.y0), (0.0, 0.0));
    }

    #[test]
    fn test_aspect_ratio_edge_centers_cross_axis() {
        let rect = Rect::new(0.0, 0.0, 100.0, 50.0);
        let options = ResizeOptions { keep_aspect_ratio: true, ..Default::default() };
        let r = resize_from_handle_with(ResizeHandle::Bottom, rect, Vec2::new(0.0, 50.0), options)
            .unwrap();
        assert!(approx(r.width(), 200.0));
        assert!(approx(r.center().x, 50.0));
        assert_eq!(r.y0, 0.0);
    }

    #[test]
    fn test_resize_rotated_keeps_world_anchor() {
        let rect = Rect::new(0.0, 0.0, 100.0, 40.0);
        let rotation = 30.0;
        let handle = ResizeHandle::BottomRight;
        let before = rotate_point(handle_anchor(handle, rect), rect.center(), rotation);

        let r = resize_rotated(handle, rect, rotation, Vec2::new(25.0, 12.0), ResizeOptions::default())
            .unwrap();
        let after = rotate_point(handle_anchor(handle, r), r.center(), rotation);
        assert!(approx(before.x, after.x));
        assert!(approx(before.y, after.y));
    }

    #[test]
    fn test_resize_rotated_maps_delta_to_local_frame() {
        // Rotated a quarter turn, pushing the pointer down grows the local width
        let rect = Rect::new(0.0, 0.0, 100.0, 40.0);
        let r = resize_rotated(
            ResizeHandle::Right,
            rect,
            90.0,
            Vec2::new(0.0, 20.0),
            ResizeOptions::default(),
        )
        .unwrap();
        assert!(approx(r.width(), 120.0));
        assert!(approx(r.height(), 40.0));
    }

    #[test]
    fn test_angle_between() {
        let a = angle_between(Point::ZERO, Point::new(1.0, 0.0), Point::new(0.0, 1.0));
        assert!(approx(a, 90.0));
    }

    #[test]
    fn test_normalize_degrees() {
        assert!(approx(normalize_degrees(-90.0), 270.0));
        assert!(approx(normalize_degrees(720.0), 0.0));
    }
}
