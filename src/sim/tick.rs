//! Per-frame simulation tick
//!
//! Camera -> particles -> (if the wave is active) player, bullets, enemies,
//! combat, coins -> death check -> wave director.

use glam::Vec2;

use super::state::Run;
use super::wave::{self, WaveEvent};
use super::{ai, combat, movement, pickup};

/// Input for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub dash: bool,
    /// Pointer position in screen space
    pub pointer: Vec2,
    /// Fire button held
    pub fire: bool,
}

impl TickInput {
    /// Held direction keys collapsed to a unit vector (or zero)
    pub fn move_axis(&self) -> Vec2 {
        let mut axis = Vec2::ZERO;
        if self.up {
            axis.y -= 1.0;
        }
        if self.down {
            axis.y += 1.0;
        }
        if self.left {
            axis.x -= 1.0;
        }
        if self.right {
            axis.x += 1.0;
        }
        axis.normalize_or_zero()
    }
}

/// What happened during one tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickOutcome {
    pub shots_fired: u32,
    pub enemy_shots: u32,
    pub player_hits: u32,
    pub enemy_hits: u32,
    pub kills: u32,
    pub coins_credited: u64,
    pub coins_collected: u32,
    pub wave_event: WaveEvent,
    pub player_died: bool,
}

/// Work that runs in every state: camera follow and particle motion
pub fn tick_cosmetic(run: &mut Run, dt: f32) {
    run.camera.follow(run.player.pos, &run.arena);
    movement::step_particles(&mut run.fx.particles, dt);
}

/// Advance the run by `dt` seconds
pub fn tick(run: &mut Run, input: &TickInput, dt: f32) -> TickOutcome {
    let mut out = TickOutcome::default();

    tick_cosmetic(run, dt);
    if !run.wave_phase.is_active() {
        return out;
    }

    movement::step_player(run, input, dt);
    if input.fire {
        let aim = run.camera.screen_to_world(input.pointer);
        out.shots_fired = movement::fire(run, aim);
    }
    movement::step_bullets(run, dt);

    out.enemy_shots = ai::step_enemies(run, dt);

    let report = combat::resolve(run);
    out.player_hits = report.player_hits;
    out.enemy_hits = report.enemy_hits;
    out.kills = report.kills;
    out.coins_credited = report.coins_credited;

    out.coins_collected = pickup::step_coins(run, dt);

    // Death wins over a same-tick wave clear
    if run.player.is_dead() {
        out.player_died = true;
        return out;
    }

    out.wave_event = wave::advance(run, dt);
    out
}
