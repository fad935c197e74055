use crate::sim::{Rect, Vec2};

use super::raster::ScreenRect;

pub const ZOOM_STEP: f32 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// Follows a world point at a zoom factor. World y grows downward, like
/// screen y, so no axis flip is needed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub center: Vec2,
    zoom: f32,
}

impl Camera {
    pub fn new(center: Vec2, zoom: f32) -> Self {
        let zoom = if zoom.is_finite() && zoom > 0.0 {
            zoom
        } else {
            1.0
        };
        Self { center, zoom }
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Applies zoom steps one at a time. A step that would reach zero or
    /// below is skipped, so zoom stays strictly positive.
    pub fn apply_zoom_steps(&mut self, steps: i32) {
        let delta = ZOOM_STEP * steps.signum() as f32;
        for _ in 0..steps.unsigned_abs() {
            let next = self.zoom + delta;
            if next > 0.0 {
                self.zoom = next;
            }
        }
    }
}

pub fn world_to_screen(world: Vec2, camera: &Camera, viewport: Viewport) -> (i32, i32) {
    let x = (world.x - camera.center.x) * camera.zoom + viewport.width as f32 * 0.5;
    let y = (world.y - camera.center.y) * camera.zoom + viewport.height as f32 * 0.5;
    (x.round() as i32, y.round() as i32)
}

pub(crate) fn rect_to_screen(rect: &Rect, camera: &Camera, viewport: Viewport) -> ScreenRect {
    let (left, top) = world_to_screen(Vec2::new(rect.left(), rect.top()), camera, viewport);
    let (right, bottom) =
        world_to_screen(Vec2::new(rect.right(), rect.bottom()), camera, viewport);
    ScreenRect::new(left, top, right - left, bottom - top)
}
