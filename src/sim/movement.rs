//! Movement integration, dashing and player fire

use glam::Vec2;

use super::state::{Bullet, BulletOwner, Particle, Run};
use super::tick::TickInput;
use crate::consts::*;
use crate::decay;

/// Advance player timers, apply movement input and dash, clamp to arena
pub fn step_player(run: &mut Run, input: &TickInput, dt: f32) {
    let player = &mut run.player;

    player.fire_cd = decay(player.fire_cd, dt);
    player.dash_cd = decay(player.dash_cd, dt);
    player.dash_time = decay(player.dash_time, dt);
    player.invuln = decay(player.invuln, dt);

    let axis = input.move_axis();
    let speed = if player.is_dashing() {
        player.speed * DASH_SPEED_MULT
    } else {
        player.speed
    };
    player.vel = axis * speed;

    // Dash needs a direction; boost applies from the next tick
    if input.dash && player.dash_cd <= 0.0 && axis != Vec2::ZERO {
        player.dash_cd = DASH_COOLDOWN;
        player.dash_time = DASH_DURATION;
        player.invuln = DASH_INVULN;
        let pos = player.pos;
        run.fx.burst(&mut run.rng, pos, 12, 220.0);
    }

    let player = &mut run.player;
    player.pos = run.arena.clamp(player.pos + player.vel * dt, player.radius);
}

/// Angular gap between adjacent shots of a multishot volley
pub fn volley_spread(shots: u32) -> f32 {
    (0.08 + shots as f32 * 0.03).min(0.28)
}

/// Fire a volley toward `aim` (world space) if the fire cooldown allows.
/// Returns the number of bullets spawned.
pub fn fire(run: &mut Run, aim: Vec2) -> u32 {
    let player = &mut run.player;
    if player.fire_cd > 0.0 {
        return 0;
    }

    let to_aim = aim - player.pos;
    let base_angle = to_aim.y.atan2(to_aim.x);
    let shots = 1 + player.multishot;
    let spread = volley_spread(shots);

    for i in 0..shots {
        let offset = (i as f32 - (shots - 1) as f32 / 2.0) * spread;
        let dir = Vec2::from_angle(base_angle + offset);
        run.bullets.push(Bullet {
            pos: player.pos + dir * (player.radius + 4.0),
            vel: dir * player.bullet_speed,
            radius: PLAYER_BULLET_RADIUS,
            life: player.bullet_life,
            damage: player.damage,
            pierce: player.pierce,
            owner: BulletOwner::Player,
            spent: false,
        });
    }

    player.fire_cd = 1.0 / player.fire_rate;
    shots
}

/// Integrate bullets and drop the ones that expired or left the arena
pub fn step_bullets(run: &mut Run, dt: f32) {
    for b in &mut run.bullets {
        b.pos += b.vel * dt;
        b.life -= dt;
    }
    let arena = run.arena;
    run.bullets.retain(|b| b.is_live(&arena));
}

/// Move particles with frame-rate independent drag
pub fn step_particles(particles: &mut Vec<Particle>, dt: f32) {
    let drag = PARTICLE_DRAG.powf(dt);
    for p in particles.iter_mut() {
        p.pos += p.vel * dt;
        p.life -= dt;
        p.vel *= drag;
    }
    particles.retain(|p| p.life > 0.0);
}
