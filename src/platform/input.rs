//! Raw input collection
//!
//! Browser events update an [`InputState`]; each frame it is flattened into
//! a [`TickInput`] for the simulation.

use std::collections::HashSet;

use glam::Vec2;

use crate::sim::TickInput;

/// Held keys (DOM `KeyboardEvent.code` values), pointer and fire button
#[derive(Debug, Clone, Default)]
pub struct InputState {
    held: HashSet<String>,
    pointer: Vec2,
    fire: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_down(&mut self, code: &str) {
        self.held.insert(code.to_string());
    }

    pub fn key_up(&mut self, code: &str) {
        self.held.remove(code);
    }

    pub fn is_held(&self, code: &str) -> bool {
        self.held.contains(code)
    }

    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        self.pointer = Vec2::new(x, y);
    }

    pub fn set_fire(&mut self, down: bool) {
        self.fire = down;
    }

    /// Drop everything held (window blur: key-up events never arrive)
    pub fn release_all(&mut self) {
        self.held.clear();
        self.fire = false;
    }

    /// Whether the browser should suppress the key's default action
    pub fn is_game_key(code: &str) -> bool {
        matches!(
            code,
            "ArrowUp" | "ArrowDown" | "ArrowLeft" | "ArrowRight" | "Space"
        )
    }

    pub fn to_tick_input(&self) -> TickInput {
        TickInput {
            up: self.is_held("KeyW"),
            down: self.is_held("KeyS"),
            left: self.is_held("KeyA"),
            right: self.is_held("KeyD"),
            dash: self.is_held("ShiftLeft") || self.is_held("ShiftRight"),
            pointer: self.pointer,
            fire: self.fire,
        }
    }
}
