//! Viewport that follows the player inside the arena

use glam::Vec2;
use serde::Serialize;

use super::state::Arena;

/// Top-left offset of the visible window, in world units
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Camera {
    pub offset: Vec2,
    pub viewport: Vec2,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            viewport: Vec2::new(1280.0, 720.0),
        }
    }
}

impl Camera {
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport = Vec2::new(width.max(0.0), height.max(0.0));
    }

    /// Center on `target`, never showing anything outside the arena.
    /// A viewport larger than the arena pins the offset to the origin.
    pub fn follow(&mut self, target: Vec2, arena: &Arena) {
        let max = (arena.size() - self.viewport).max(Vec2::ZERO);
        self.offset = (target - self.viewport * 0.5).clamp(Vec2::ZERO, max);
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        world - self.offset
    }

    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        screen + self.offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_follow_centers_player() {
        let arena = Arena::default();
        let mut cam = Camera::default();
        cam.follow(Vec2::new(1200.0, 700.0), &arena);
        assert_eq!(cam.offset, Vec2::new(560.0, 340.0));
        assert_eq!(cam.world_to_screen(Vec2::new(1200.0, 700.0)), Vec2::new(640.0, 360.0));
    }

    #[test]
    fn test_follow_clamps_at_edges() {
        let arena = Arena::default();
        let mut cam = Camera::default();
        cam.follow(Vec2::new(10.0, 1390.0), &arena);
        assert_eq!(cam.offset, Vec2::new(0.0, 1400.0 - 720.0));
    }

    #[test]
    fn test_oversized_viewport_pins_origin() {
        let arena = Arena::default();
        let mut cam = Camera::default();
        cam.set_viewport(3000.0, 2000.0);
        cam.follow(arena.center(), &arena);
        assert_eq!(cam.offset, Vec2::ZERO);
    }

    #[test]
    fn test_screen_world_inverse() {
        let cam = Camera {
            offset: Vec2::new(300.0, 120.0),
            viewport: Vec2::new(800.0, 600.0),
        };
        let p = Vec2::new(42.0, 17.0);
        assert_eq!(cam.world_to_screen(cam.screen_to_world(p)), p);
    }
}
