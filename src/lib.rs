//! Kargo & Kaçış - a roguelite arena shooter
//!
//! Core modules:
//! - `sim`: Simulation (movement, enemy AI, combat, waves, upgrades)
//! - `session`: Top-level menu/play/upgrade/dead state machine
//! - `platform`: Browser/native capabilities (storage, input, render surface)
//! - `persistence`: Cross-run save record
//! - `settings`: Player preferences
//! - `snapshot`: Read-only per-frame view handed to the renderer

pub mod error;
pub mod persistence;
pub mod platform;
pub mod session;
pub mod settings;
pub mod sim;
pub mod snapshot;

pub use error::{PlatformError, ShopError, StorageError};
pub use persistence::{PermLevels, PersistentSave};
pub use session::{AppState, Phase, Session, UiAction};
pub use settings::{QualityPreset, Settings};

use glam::Vec2;

/// Game balance constants
pub mod consts {
    /// Largest frame delta the simulation will integrate (seconds)
    pub const MAX_FRAME_DT: f32 = 0.033;

    /// Arena dimensions (world units)
    pub const ARENA_WIDTH: f32 = 2400.0;
    pub const ARENA_HEIGHT: f32 = 1400.0;
    /// Enemies spawn this far inside the arena wall
    pub const SPAWN_MARGIN: f32 = 40.0;
    /// Bullets are culled once this far outside the arena
    pub const BULLET_CULL_MARGIN: f32 = 50.0;

    /// Player defaults
    pub const PLAYER_RADIUS: f32 = 14.0;
    pub const PLAYER_MAX_HP: f32 = 100.0;
    pub const PLAYER_SPEED: f32 = 260.0;
    pub const PLAYER_DAMAGE: f32 = 18.0;
    pub const PLAYER_FIRE_RATE: f32 = 7.0;
    pub const PLAYER_BULLET_SPEED: f32 = 650.0;
    pub const PLAYER_BULLET_LIFE: f32 = 0.9;
    pub const PLAYER_BULLET_RADIUS: f32 = 4.0;
    /// Cap for the lifesteal fraction
    pub const MAX_LIFESTEAL: f32 = 0.2;

    /// Dash
    pub const DASH_SPEED_MULT: f32 = 2.15;
    pub const DASH_COOLDOWN: f32 = 1.2;
    pub const DASH_DURATION: f32 = 0.18;
    pub const DASH_INVULN: f32 = 0.22;

    /// Invulnerability windows after taking damage
    pub const CONTACT_INVULN: f32 = 0.45;
    pub const ENEMY_BULLET_INVULN: f32 = 0.35;

    /// Flash time after an enemy is hit
    pub const ENEMY_FLASH: f32 = 0.07;
    /// Damage multiplier applied each time a bullet pierces
    pub const PIERCE_DAMAGE_FALLOFF: f32 = 0.92;

    /// Shooter behaviour
    pub const SHOOTER_PREFERRED_DIST: f32 = 340.0;
    pub const SHOOTER_DIST_BAND: f32 = 220.0;
    pub const ENEMY_BULLET_SPEED: f32 = 520.0;
    pub const ENEMY_BULLET_RADIUS: f32 = 3.5;
    pub const ENEMY_BULLET_LIFE: f32 = 1.4;
    pub const ENEMY_BULLET_DAMAGE_MULT: f32 = 0.7;

    /// Waves
    pub const WAVE_CLEAR_GRACE: f32 = 0.65;
    pub const WAVE_START_HEAL: f32 = 10.0;
    pub const UPGRADE_OFFER_SIZE: usize = 3;

    /// Coins
    pub const COIN_RADIUS: f32 = 6.0;
    pub const COIN_LIFE: f32 = 20.0;
    pub const MAX_COINS_PER_KILL: u32 = 6;
    /// Fraction of coin velocity remaining after one second
    pub const COIN_DRAG: f32 = 0.02;
    pub const MAGNET_BASE_RADIUS: f32 = 70.0;
    pub const MAGNET_PULL: f32 = 900.0;

    /// Particles
    pub const PARTICLE_DRAG: f32 = 0.01;
    pub const LABEL_PARTICLE_LIFE: f32 = 0.4;

    /// Persistent upgrade effects per level
    pub const PERM_HP_PER_LEVEL: f32 = 10.0;
    pub const PERM_DAMAGE_PER_LEVEL: f32 = 0.06;
    pub const PERM_SPEED_PER_LEVEL: f32 = 0.05;

    /// Coin balance of a fresh save
    pub const STARTING_COINS: u64 = 100_000;
}

/// Squared distance between two points
#[inline]
pub fn dist2(a: Vec2, b: Vec2) -> f32 {
    (a - b).length_squared()
}

/// Circle-circle overlap test without a square root
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    let r = ra + rb;
    dist2(a, b) < r * r
}

/// Clamp a position so a circle of `radius` stays inside `[0, w] x [0, h]`
#[inline]
pub fn clamp_to_arena(pos: Vec2, radius: f32, w: f32, h: f32) -> Vec2 {
    Vec2::new(
        pos.x.max(radius).min(w - radius),
        pos.y.max(radius).min(h - radius),
    )
}

/// Count a timer down by `dt`, floored at zero
#[inline]
pub fn decay(timer: f32, dt: f32) -> f32 {
    (timer - dt).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circles_overlap_strict() {
        let a = Vec2::new(0.0, 0.0);
        assert!(circles_overlap(a, 5.0, Vec2::new(9.9, 0.0), 5.0));
        // Touching is not overlapping
        assert!(!circles_overlap(a, 5.0, Vec2::new(10.0, 0.0), 5.0));
    }

    #[test]
    fn test_clamp_to_arena_insets_by_radius() {
        let p = clamp_to_arena(Vec2::new(-50.0, 5000.0), 14.0, 2400.0, 1400.0);
        assert_eq!(p, Vec2::new(14.0, 1386.0));
    }

    #[test]
    fn test_decay_floors_at_zero() {
        assert_eq!(decay(0.01, 0.033), 0.0);
        assert!((decay(1.0, 0.25) - 0.75).abs() < 1e-6);
    }
}
