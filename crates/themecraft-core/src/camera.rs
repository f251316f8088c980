//! Pan/zoom view transform for the canvas.

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Zoom level shown as "100%".
pub const BASE_ZOOM: f64 = 1.0;

/// Converts between screen and canvas (world) coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Screen-space translation.
    pub offset: Vec2,
    pub zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            zoom: BASE_ZOOM,
            min_zoom: 0.1,
            max_zoom: 10.0,
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    /// World to screen.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.zoom)
    }

    /// Screen to world.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.zoom) * Affine::translate(-self.offset)
    }

    pub fn screen_to_world(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    pub fn world_to_screen(&self, world_point: Point) -> Point {
        self.transform() * world_point
    }

    /// Convert a screen-space length (e.g. a snap tolerance) to world units.
    pub fn screen_to_world_distance(&self, distance: f64) -> f64 {
        distance / self.zoom
    }

    /// Pan by a delta in screen coordinates.
    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    /// Zoom by `factor`, keeping `screen_point` fixed on screen.
    pub fn zoom_at(&mut self, screen_point: Point, factor: f64) {
        let new_zoom = (self.zoom * factor).clamp(self.min_zoom, self.max_zoom);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return;
        }
        let world_point = self.screen_to_world(screen_point);
        self.zoom = new_zoom;
        self.offset += screen_point - self.world_to_screen(world_point);
    }

    fn reset(&mut self) {
        self.offset = Vec2::ZERO;
        self.zoom = BASE_ZOOM;
    }

    /// Center `bounds` in `viewport`, leaving `padding` screen pixels around it.
    pub fn fit_to_bounds(&mut self, bounds: Rect, viewport: Size, padding: f64) {
        if bounds.is_zero_area() {
            self.reset();
            return;
        }
        let available = Size::new(
            (viewport.width - padding * 2.0).max(1.0),
            (viewport.height - padding * 2.0).max(1.0),
        );
        let scale_x = available.width / bounds.width();
        let scale_y = available.height / bounds.height();
        self.zoom = scale_x.min(scale_y).clamp(self.min_zoom, self.max_zoom);

        let center = bounds.center();
        self.offset = Vec2::new(
            viewport.width / 2.0 - center.x * self.zoom,
            viewport.height / 2.0 - center.y * self.zoom,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_identity() {
        let camera = Camera::new();
        let screen = Point::new(100.0, 200.0);
        assert_eq!(camera.screen_to_world(screen), screen);
    }

    #[test]
    fn test_screen_to_world_with_offset_and_zoom() {
        let camera = Camera { offset: Vec2::new(50.0, 100.0), zoom: 2.0, ..Default::default() };
        let world = camera.screen_to_world(Point::new(150.0, 300.0));
        assert!((world.x - 50.0).abs() < 1e-10);
        assert!((world.y - 100.0).abs() < 1e-10);
    }

    #[test]
    fn test_roundtrip_conversion() {
        let camera = Camera { offset: Vec2::new(30.0, -20.0), zoom: 1.5, ..Default::default() };
        let original = Point::new(123.0, 456.0);
        let back = camera.world_to_screen(camera.screen_to_world(original));
        assert!((back.x - original.x).abs() < 1e-10);
        assert!((back.y - original.y).abs() < 1e-10);
    }

    #[test]
    fn test_zoom_at_keeps_point_fixed() {
        let mut camera = Camera::new();
        let anchor = Point::new(200.0, 100.0);
        let world_before = camera.screen_to_world(anchor);
        camera.zoom_at(anchor, 2.0);
        let world_after = camera.screen_to_world(anchor);
        assert!((world_before.x - world_after.x).abs() < 1e-10);
        assert!((world_before.y - world_after.y).abs() < 1e-10);
    }

    #[test]
    fn test_zoom_clamp() {
        let mut camera = Camera::new();
        camera.zoom_at(Point::ZERO, 0.001);
        assert!((camera.zoom - camera.min_zoom).abs() < f64::EPSILON);
        camera.zoom_at(Point::ZERO, 1e6);
        assert!((camera.zoom - camera.max_zoom).abs() < f64::EPSILON);
    }

    #[test]
    fn test_tolerance_scales_inverse_to_zoom() {
        let camera = Camera { zoom: 2.0, ..Default::default() };
        assert_eq!(camera.screen_to_world_distance(6.0), 3.0);
    }

    #[test]
    fn test_fit_to_bounds_centers() {
        let mut camera = Camera::new();
        camera.fit_to_bounds(Rect::new(0.0, 0.0, 100.0, 50.0), Size::new(400.0, 400.0), 0.0);
        assert!((camera.zoom - 4.0).abs() < 1e-10);
        let center = camera.world_to_screen(Point::new(50.0, 25.0));
        assert!((center.x - 200.0).abs() < 1e-10);
        assert!((center.y - 200.0).abs() < 1e-10);
    }
}
