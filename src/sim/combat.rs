//! Collision and combat resolution
//!
//! All hit tests are circle-circle on squared distances. Resolution order
//! within a tick:
//! 1. enemy bodies vs player (contact damage)
//! 2. enemy bullets vs player
//! 3. player bullets vs enemies (lifesteal, pierce)
//! 4. sweep of dead enemies (score, coins, drops)

use glam::Vec2;
use rand::Rng;

use super::state::{Coin, Run};
use crate::circles_overlap;
use crate::consts::*;

/// What happened during one combat pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CombatReport {
    /// Times the player was damaged (contact or enemy bullet)
    pub player_hits: u32,
    /// Player bullets that connected with an enemy
    pub enemy_hits: u32,
    pub kills: u32,
    /// Coins credited to the run by this pass
    pub coins_credited: u64,
}

/// Contact damage from enemy bodies, gated by player invulnerability
pub fn resolve_contact(run: &mut Run) -> u32 {
    let mut hits = 0;
    for enemy in &run.enemies {
        let player = &mut run.player;
        if player.is_invulnerable() {
            break;
        }
        if circles_overlap(enemy.pos, enemy.radius, player.pos, player.radius) {
            player.take_hit(enemy.damage, CONTACT_INVULN);
            let pos = player.pos;
            run.fx.burst(&mut run.rng, pos, 16, 260.0);
            hits += 1;
        }
    }
    hits
}

/// Enemy bullets against the player. A hit spends the bullet.
pub fn resolve_enemy_bullets(run: &mut Run) -> u32 {
    let mut hits = 0;
    for bullet in run.bullets.iter_mut().filter(|b| b.is_enemy() && !b.spent) {
        let player = &mut run.player;
        if player.is_invulnerable() {
            break;
        }
        if circles_overlap(bullet.pos, bullet.radius, player.pos, player.radius) {
            player.take_hit(bullet.damage, ENEMY_BULLET_INVULN);
            bullet.spent = true;
            let pos = player.pos;
            run.fx.burst(&mut run.rng, pos, 10, 220.0);
            hits += 1;
        }
    }
    hits
}

/// Player bullets against living enemies. Each bullet damages at most one
/// enemy per tick; pierce charges let it survive the hit.
pub fn resolve_player_bullets(run: &mut Run) -> u32 {
    let mut hits = 0;
    let Run {
        bullets,
        enemies,
        player,
        fx,
        rng,
        ..
    } = run;

    for bullet in bullets.iter_mut().filter(|b| !b.is_enemy() && !b.spent) {
        let Some(enemy) = enemies
            .iter_mut()
            .find(|e| !e.is_dead() && circles_overlap(bullet.pos, bullet.radius, e.pos, e.radius))
        else {
            continue;
        };

        enemy.hp -= bullet.damage;
        enemy.flash = ENEMY_FLASH;
        fx.burst(rng, bullet.pos, 6, 170.0);

        if player.lifesteal > 0.0 {
            player.heal(bullet.damage * player.lifesteal);
        }

        if bullet.pierce > 0 {
            bullet.pierce -= 1;
            bullet.damage *= PIERCE_DAMAGE_FALLOFF;
        } else {
            bullet.spent = true;
        }
        hits += 1;
    }

    hits
}

/// Score awarded per kill on the given wave
pub fn kill_score(wave: u32) -> u64 {
    10 + 2 * wave as u64
}

/// Remove dead enemies, crediting score and coins and dropping pickups.
/// Returns `(kills, coins_credited)`.
pub fn sweep_dead(run: &mut Run) -> (u32, u64) {
    let mut kills = 0;
    let mut credited = 0;
    let mut drops: Vec<(Vec2, u32)> = Vec::new();

    run.enemies.retain(|e| {
        if !e.is_dead() {
            return true;
        }
        kills += 1;
        credited += e.value as u64;
        drops.push((e.pos, e.value));
        false
    });

    run.player.score += kill_score(run.wave) * kills as u64;
    run.player.coins_run += credited;

    for (pos, value) in drops {
        for _ in 0..value.min(MAX_COINS_PER_KILL) {
            let jitter = Vec2::new(run.rng.random_range(-8.0..8.0), run.rng.random_range(-8.0..8.0));
            let vel = Vec2::new(run.rng.random_range(-40.0..40.0), run.rng.random_range(-40.0..40.0));
            run.coins.push(Coin {
                pos: pos + jitter,
                vel,
                radius: COIN_RADIUS,
                life: COIN_LIFE,
                collected: false,
            });
        }
        run.fx.burst(&mut run.rng, pos, 18, 240.0);
    }

    (kills, credited)
}

/// Full combat pass in the fixed resolution order
pub fn resolve(run: &mut Run) -> CombatReport {
    let mut report = CombatReport {
        player_hits: resolve_contact(run),
        ..Default::default()
    };
    report.player_hits += resolve_enemy_bullets(run);
    report.enemy_hits = resolve_player_bullets(run);
    run.bullets.retain(|b| !b.spent);

    let (kills, coins) = sweep_dead(run);
    report.kills = kills;
    report.coins_credited = coins;
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::PermLevels;
    use crate::sim::state::{Bullet, BulletOwner, Enemy};
    use proptest::prelude::*;

    fn run() -> Run {
        Run::new(11, &PermLevels::default(), 512)
    }

    fn player_bullet(pos: Vec2, damage: f32, pierce: u32) -> Bullet {
        Bullet {
            pos,
            vel: Vec2::X,
            radius: PLAYER_BULLET_RADIUS,
            life: 1.0,
            damage,
            pierce,
            owner: BulletOwner::Player,
            spent: false,
        }
    }

    fn enemy_bullet(pos: Vec2, damage: f32) -> Bullet {
        Bullet {
            owner: BulletOwner::Enemy,
            ..player_bullet(pos, damage, 0)
        }
    }

    #[test]
    fn test_contact_damage_gated_by_invulnerability() {
        let mut r = run();
        let p = r.player.pos;
        r.enemies.push(Enemy::chaser(p, 1));
        r.enemies.push(Enemy::chaser(p, 1));

        // Second overlapping enemy is blocked by the window the first opened
        assert_eq!(resolve_contact(&mut r), 1);
        assert!((r.player.hp - (100.0 - 15.2)).abs() < 1e-4);
        assert_eq!(r.player.invuln, CONTACT_INVULN);

        // Still invulnerable: no damage, window not refreshed
        r.player.invuln = 0.1;
        assert_eq!(resolve_contact(&mut r), 0);
        assert_eq!(r.player.invuln, 0.1);
    }

    #[test]
    fn test_enemy_bullet_spent_on_hit() {
        let mut r = run();
        let p = r.player.pos;
        r.bullets.push(enemy_bullet(p, 7.0));
        assert_eq!(resolve_enemy_bullets(&mut r), 1);
        assert!(r.bullets[0].spent);
        assert_eq!(r.player.hp, 93.0);
        assert_eq!(r.player.invuln, ENEMY_BULLET_INVULN);
    }

    #[test]
    fn test_enemy_bullet_gated_by_invulnerability() {
        let mut r = run();
        let p = r.player.pos;
        r.player.invuln = 0.2;
        r.bullets.push(enemy_bullet(p, 7.0));

        assert_eq!(resolve_enemy_bullets(&mut r), 0);
        assert_eq!(r.player.hp, 100.0);
        assert!(!r.bullets[0].spent);
        assert_eq!(r.player.invuln, 0.2);
    }

    #[test]
    fn test_player_bullet_skips_dead_enemy() {
        let mut r = run();
        let at = Vec2::new(300.0, 300.0);
        let mut corpse = Enemy::chaser(at, 1);
        corpse.hp = 0.0;
        r.enemies.push(corpse);
        r.enemies.push(Enemy::tank(at, 1));
        r.bullets.push(player_bullet(at, 20.0, 0));

        assert_eq!(resolve_player_bullets(&mut r), 1);
        assert_eq!(r.enemies[0].hp, 0.0);
        assert_eq!(r.enemies[0].flash, 0.0);
        assert_eq!(r.enemies[1].hp, r.enemies[1].max_hp - 20.0);
        assert!(r.bullets[0].spent);
    }

    #[test]
    fn test_enemy_bullets_do_not_hurt_enemies() {
        let mut r = run();
        let at = Vec2::new(300.0, 300.0);
        r.enemies.push(Enemy::chaser(at, 1));
        r.bullets.push(enemy_bullet(at, 50.0));
        assert_eq!(resolve_player_bullets(&mut r), 0);
        assert_eq!(r.enemies[0].hp, r.enemies[0].max_hp);
    }

    #[test]
    fn test_pierce_decrements_and_attenuates() {
        let mut r = run();
        let at = Vec2::new(300.0, 300.0);
        r.enemies.push(Enemy::tank(at, 1));
        r.enemies.push(Enemy::tank(at, 1));
        r.bullets.push(player_bullet(at, 20.0, 1));

        assert_eq!(resolve_player_bullets(&mut r), 1);
        // Exactly one enemy damaged
        assert_eq!(r.enemies[0].hp, r.enemies[0].max_hp - 20.0);
        assert_eq!(r.enemies[1].hp, r.enemies[1].max_hp);
        assert_eq!(r.bullets[0].pierce, 0);
        assert!(!r.bullets[0].spent);
        assert!((r.bullets[0].damage - 20.0 * PIERCE_DAMAGE_FALLOFF).abs() < 1e-5);
        assert_eq!(r.enemies[0].flash, ENEMY_FLASH);

        // Out of pierce: next hit consumes it
        assert_eq!(resolve_player_bullets(&mut r), 1);
        assert!(r.bullets[0].spent);
    }

    #[test]
    fn test_lifesteal_caps_at_max_hp() {
        let mut r = run();
        let at = Vec2::new(300.0, 300.0);
        r.player.hp = 99.0;
        r.player.lifesteal = MAX_LIFESTEAL;
        r.enemies.push(Enemy::tank(at, 1));
        r.bullets.push(player_bullet(at, 50.0, 0));
        resolve_player_bullets(&mut r);
        assert_eq!(r.player.hp, r.player.max_hp);
    }

    #[test]
    fn test_sweep_rewards_and_drops() {
        let mut r = run();
        r.wave = 4;
        let mut dead = Enemy::tank(Vec2::new(500.0, 500.0), 4);
        dead.hp = 0.0;
        r.enemies.push(dead);
        r.enemies.push(Enemy::chaser(Vec2::new(900.0, 900.0), 4));

        let (kills, coins) = sweep_dead(&mut r);
        assert_eq!(kills, 1);
        assert_eq!(coins, 5);
        assert_eq!(r.enemies.len(), 1);
        assert_eq!(r.player.score, 18);
        assert_eq!(r.player.coins_run, 5);
        assert_eq!(r.coins.len(), 5);
        assert!(!r.fx.particles.is_empty());
    }

    #[test]
    fn test_resolve_drops_spent_bullets() {
        let mut r = run();
        let at = Vec2::new(300.0, 300.0);
        let mut weak = Enemy::chaser(at, 1);
        weak.hp = 5.0;
        r.enemies.push(weak);
        r.bullets.push(player_bullet(at, 18.0, 0));

        let report = resolve(&mut r);
        assert_eq!(report.enemy_hits, 1);
        assert_eq!(report.kills, 1);
        assert_eq!(report.coins_credited, 2);
        assert!(r.bullets.is_empty());
        assert!(r.enemies.is_empty());
    }

    proptest! {
        #[test]
        fn prop_pierce_never_negative(pierce in 0u32..4, stacked in 1usize..8) {
            let mut r = run();
            let at = Vec2::new(600.0, 600.0);
            for _ in 0..stacked {
                r.enemies.push(Enemy::tank(at, 10));
            }
            r.bullets.push(player_bullet(at, 1.0, pierce));

            let mut damaged_total = 0;
            for _ in 0..stacked {
                let before: Vec<f32> = r.enemies.iter().map(|e| e.hp).collect();
                let hits = resolve_player_bullets(&mut r);
                let damaged = r.enemies.iter().zip(&before).filter(|(e, hp)| e.hp < **hp).count();
                prop_assert_eq!(damaged as u32, hits);
                prop_assert!(hits <= 1);
                damaged_total += damaged;
                r.bullets.retain(|b| !b.spent);
                if r.bullets.is_empty() {
                    break;
                }
            }
            prop_assert_eq!(damaged_total, (pierce as usize + 1).min(stacked));
        }
    }
}
