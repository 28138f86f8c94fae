//! Follow camera
//!
//! Only the parts the simulation reads: where the camera sits and where the
//! mouse points in world space. Projection lives with the renderer.

use glam::Vec2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub position: Vec2,
    /// Visible world height
    pub view_height: f32,
    /// Mouse position relative to the camera, in world units
    pub mouse_world: Vec2,
    /// Last mouse position in pixels
    pub mouse_screen: Vec2,
}

impl Camera {
    pub fn new(view_height: f32) -> Self {
        Self {
            position: Vec2::ZERO,
            view_height,
            mouse_world: Vec2::ZERO,
            mouse_screen: Vec2::ZERO,
        }
    }

    /// Map a pixel position (origin top-left, y down) to a camera-relative
    /// world offset for a viewport of `viewport` pixels.
    pub fn set_mouse_screen(&mut self, screen: Vec2, viewport: Vec2) {
        self.mouse_screen = screen;
        if viewport.x <= 0.0 || viewport.y <= 0.0 {
            return;
        }

        let norm = screen / viewport;
        let aspect = viewport.x / viewport.y;
        let h = self.view_height;
        let w = h * aspect;

        self.mouse_world = Vec2::new(-0.5 * w + w * norm.x, 0.5 * h - h * norm.y);
    }

    /// World-space point under the mouse
    #[inline]
    pub fn aim_point(&self) -> Vec2 {
        self.position + self.mouse_world
    }

    /// Ease toward `target`; `rate` is the per-second blend factor.
    pub fn follow(&mut self, target: Vec2, dt: f32, rate: f32) {
        self.position = self.position.lerp(target, (dt * rate).clamp(0.0, 1.0));
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(15.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mouse_center_is_camera() {
        let mut cam = Camera::new(10.0);
        cam.position = Vec2::new(3.0, 4.0);
        cam.set_mouse_screen(Vec2::new(640.0, 360.0), Vec2::new(1280.0, 720.0));
        assert!(cam.mouse_world.length() < 1e-5);
        assert_eq!(cam.aim_point(), Vec2::new(3.0, 4.0));
    }

    #[test]
    fn test_mouse_corners() {
        let mut cam = Camera::new(10.0);
        cam.set_mouse_screen(Vec2::ZERO, Vec2::new(200.0, 100.0));
        // Top-left: x = -w/2 with w = 20, y = +h/2
        assert!((cam.mouse_world - Vec2::new(-10.0, 5.0)).length() < 1e-5);
    }

    #[test]
    fn test_follow_converges_without_overshoot() {
        let mut cam = Camera::default();
        let target = Vec2::new(10.0, 0.0);
        for _ in 0..1000 {
            cam.follow(target, 1.0 / 64.0, 2.0);
            assert!(cam.position.x <= target.x);
        }
        assert!((cam.position - target).length() < 1e-3);

        // Huge dt snaps instead of overshooting
        cam.follow(Vec2::ZERO, 10.0, 2.0);
        assert_eq!(cam.position, Vec2::ZERO);
    }
}
