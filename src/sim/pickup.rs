//! Coin drift, magnet pull and pickup feedback

use super::state::Run;
use crate::consts::*;
use crate::dist2;

/// Radius inside which coins start seeking the player
pub fn magnet_radius(magnet_bonus: f32) -> f32 {
    MAGNET_BASE_RADIUS + magnet_bonus
}

/// Advance coins. Returns how many were picked up this tick.
///
/// Pickup is feedback only: the coin's value was credited when the enemy
/// died, so this never touches `coins_run`.
pub fn step_coins(run: &mut Run, dt: f32) -> u32 {
    let drag = COIN_DRAG.powf(dt);
    let player_pos = run.player.pos;
    let reach = magnet_radius(run.player.magnet);
    let reach2 = reach * reach;
    let mut collected = 0;

    for coin in &mut run.coins {
        coin.pos += coin.vel * dt;
        coin.vel *= drag;
        coin.life -= dt;

        let d2 = dist2(coin.pos, player_pos);
        if d2 < reach2 {
            let toward = (player_pos - coin.pos).normalize_or_zero();
            coin.vel += toward * (MAGNET_PULL * dt);
        }

        let touch = coin.radius + run.player.radius;
        if d2 < touch * touch {
            coin.collected = true;
            run.fx.label(coin.pos, "+1");
            collected += 1;
        }
    }

    run.coins.retain(|c| !c.collected && c.life > 0.0);
    collected
}
