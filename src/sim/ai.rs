//! Enemy behaviour
//!
//! Each variant picks a velocity toward (or away from) the player once per
//! tick. Shooters may also return a projectile aimed at the player.

use glam::Vec2;
use rand::Rng;

use super::state::{Bullet, BulletOwner, Enemy, EnemyKind, Run};
use crate::consts::*;
use crate::decay;

/// Stand-off factor for shooters: -1 retreats, 0 holds, 1 closes in
pub fn standoff_factor(distance: f32) -> f32 {
    ((distance - SHOOTER_PREFERRED_DIST) / SHOOTER_DIST_BAND).clamp(-1.0, 1.0)
}

impl Enemy {
    /// Set velocity for this tick and advance the behaviour timers
    pub fn steer<R: Rng>(&mut self, target: Vec2, dt: f32, rng: &mut R) -> Option<Bullet> {
        let to_target = target - self.pos;
        let distance = to_target.length();
        let dir = if distance > 0.0 {
            to_target / distance
        } else {
            Vec2::ZERO
        };

        match &mut self.kind {
            EnemyKind::Chaser | EnemyKind::Tank => {
                self.vel = dir * self.speed;
                None
            }
            EnemyKind::Shooter { shoot_cd } => {
                self.vel = dir * self.speed * standoff_factor(distance);

                *shoot_cd -= dt;
                if *shoot_cd > 0.0 {
                    return None;
                }
                *shoot_cd = rng.random_range(0.9..1.6);

                let aim = if dir == Vec2::ZERO { Vec2::X } else { dir };
                Some(Bullet {
                    pos: self.pos + aim * (self.radius + 6.0),
                    vel: aim * ENEMY_BULLET_SPEED,
                    radius: ENEMY_BULLET_RADIUS,
                    life: ENEMY_BULLET_LIFE,
                    damage: self.damage * ENEMY_BULLET_DAMAGE_MULT,
                    pierce: 0,
                    owner: BulletOwner::Enemy,
                    spent: false,
                })
            }
        }
    }
}

/// Run AI, integrate and clamp every enemy. Returns shots fired.
pub fn step_enemies(run: &mut Run, dt: f32) -> u32 {
    let target = run.player.pos;
    let mut shots = 0;

    for enemy in &mut run.enemies {
        enemy.flash = decay(enemy.flash, dt);

        if let Some(bullet) = enemy.steer(target, dt, &mut run.rng) {
            run.bullets.push(bullet);
            shots += 1;
        }

        enemy.pos = run.arena.clamp(enemy.pos + enemy.vel * dt, enemy.radius);
    }

    shots
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::PermLevels;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_chaser_runs_at_full_speed() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut e = Enemy::chaser(Vec2::new(0.0, 0.0), 1);
        let shot = e.steer(Vec2::new(300.0, 400.0), 0.016, &mut rng);
        assert!(shot.is_none());
        assert!((e.vel.length() - e.speed).abs() < 1e-3);
        assert!((e.vel.normalize() - Vec2::new(0.6, 0.8)).length() < 1e-5);
    }

    #[test]
    fn test_shooter_standoff() {
        assert_eq!(standoff_factor(SHOOTER_PREFERRED_DIST), 0.0);
        assert_eq!(standoff_factor(2000.0), 1.0);
        assert_eq!(standoff_factor(0.0), -1.0);

        let mut rng = Pcg32::seed_from_u64(3);
        let mut e = Enemy::shooter(Vec2::ZERO, 2, 10.0);
        // Too close: backs away
        e.steer(Vec2::new(100.0, 0.0), 0.016, &mut rng);
        assert!(e.vel.x < 0.0);
        // At the preferred distance: holds position
        e.steer(Vec2::new(SHOOTER_PREFERRED_DIST, 0.0), 0.016, &mut rng);
        assert!(e.vel.length() < 1e-3);
    }

    #[test]
    fn test_shooter_fires_when_cooldown_expires() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut e = Enemy::shooter(Vec2::ZERO, 2, 0.01);
        let bullet = e.steer(Vec2::new(0.0, 500.0), 0.016, &mut rng).expect("should fire");
        assert_eq!(bullet.owner, BulletOwner::Enemy);
        assert!(bullet.vel.y > 0.0);
        assert!((bullet.damage - e.damage * ENEMY_BULLET_DAMAGE_MULT).abs() < 1e-5);
        match e.kind {
            EnemyKind::Shooter { shoot_cd } => assert!((0.9..1.6).contains(&shoot_cd)),
            _ => unreachable!(),
        }
        // Fresh cooldown means no immediate second shot
        assert!(e.steer(Vec2::new(0.0, 500.0), 0.016, &mut rng).is_none());
    }

    proptest! {
        #[test]
        fn prop_enemies_stay_in_arena(
            seed in any::<u64>(),
            px in 0.0f32..2400.0,
            py in 0.0f32..1400.0,
            ticks in 1usize..300,
        ) {
            let mut run = Run::new(seed, &PermLevels::default(), 0);
            run.player.pos = Vec2::new(px, py);
            run.enemies.push(Enemy::chaser(Vec2::new(40.0, 40.0), 3));
            run.enemies.push(Enemy::shooter(Vec2::new(2360.0, 40.0), 3, 0.5));
            run.enemies.push(Enemy::tank(Vec2::new(40.0, 1360.0), 3));
            for _ in 0..ticks {
                step_enemies(&mut run, 0.033);
                for e in &run.enemies {
                    prop_assert!(e.pos.x >= e.radius && e.pos.x <= run.arena.width - e.radius);
                    prop_assert!(e.pos.y >= e.radius && e.pos.y <= run.arena.height - e.radius);
                }
            }
        }
    }
}
