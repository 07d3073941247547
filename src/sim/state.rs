//! Run state and core simulation types
//!
//! Everything that lives for one run is owned by [`Run`]. Nothing here
//! survives a return to the menu.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;

use super::camera::Camera;
use super::wave::WavePhase;
use crate::consts::*;
use crate::persistence::PermLevels;

/// The rectangular play field, origin at the top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
}

impl Default for Arena {
    fn default() -> Self {
        Self {
            width: ARENA_WIDTH,
            height: ARENA_HEIGHT,
        }
    }
}

impl Arena {
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn center(&self) -> Vec2 {
        self.size() * 0.5
    }

    /// Clamp a circle of `radius` to stay fully inside the arena
    pub fn clamp(&self, pos: Vec2, radius: f32) -> Vec2 {
        crate::clamp_to_arena(pos, radius, self.width, self.height)
    }

    /// Whether `pos` lies inside the arena grown by `margin` on every side
    pub fn contains_with_margin(&self, pos: Vec2, margin: f32) -> bool {
        pos.x > -margin
            && pos.y > -margin
            && pos.x < self.width + margin
            && pos.y < self.height + margin
    }
}

/// The player's ship (run-scoped)
#[derive(Debug, Clone, Serialize)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub hp: f32,
    pub max_hp: f32,
    /// Base movement speed (units/sec)
    pub speed: f32,
    pub dash_cd: f32,
    pub dash_time: f32,
    pub invuln: f32,
    pub fire_cd: f32,
    pub damage: f32,
    /// Shots per second
    pub fire_rate: f32,
    pub bullet_speed: f32,
    pub bullet_life: f32,
    pub pierce: u32,
    pub multishot: u32,
    /// Fraction of dealt damage returned as health (0..=MAX_LIFESTEAL)
    pub lifesteal: f32,
    /// Extra coin attraction radius
    pub magnet: f32,
    /// Coins credited this run (folded into the save on death)
    pub coins_run: u64,
    pub score: u64,
}

impl Player {
    /// Fresh player at `pos` with permanent shop levels applied
    pub fn new(pos: Vec2, perm: &PermLevels) -> Self {
        let max_hp = PLAYER_MAX_HP + perm.hp as f32 * PERM_HP_PER_LEVEL;
        Self {
            pos,
            vel: Vec2::ZERO,
            radius: PLAYER_RADIUS,
            hp: max_hp,
            max_hp,
            speed: PLAYER_SPEED * (1.0 + perm.spd as f32 * PERM_SPEED_PER_LEVEL),
            dash_cd: 0.0,
            dash_time: 0.0,
            invuln: 0.0,
            fire_cd: 0.0,
            damage: PLAYER_DAMAGE * (1.0 + perm.dmg as f32 * PERM_DAMAGE_PER_LEVEL),
            fire_rate: PLAYER_FIRE_RATE,
            bullet_speed: PLAYER_BULLET_SPEED,
            bullet_life: PLAYER_BULLET_LIFE,
            pierce: 0,
            multishot: 0,
            lifesteal: 0.0,
            magnet: 0.0,
            coins_run: 0,
            score: 0,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.hp <= 0.0
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invuln > 0.0
    }

    pub fn is_dashing(&self) -> bool {
        self.dash_time > 0.0
    }

    /// Restore health, never above `max_hp`
    pub fn heal(&mut self, amount: f32) {
        self.hp = (self.hp + amount).min(self.max_hp);
    }

    /// Apply damage and open an invulnerability window
    pub fn take_hit(&mut self, damage: f32, invuln: f32) {
        self.hp = (self.hp - damage).max(0.0);
        self.invuln = invuln;
    }
}

/// Enemy behaviour variants
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EnemyKind {
    /// Runs straight at the player
    Chaser,
    /// Holds a stand-off distance and fires
    Shooter { shoot_cd: f32 },
    /// Slow, heavy chaser
    Tank,
}

impl EnemyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnemyKind::Chaser => "chaser",
            EnemyKind::Shooter { .. } => "shooter",
            EnemyKind::Tank => "tank",
        }
    }
}

/// An enemy entity (run-scoped)
#[derive(Debug, Clone, Serialize)]
pub struct Enemy {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub hp: f32,
    /// Spawn health, for the renderer's health bar
    pub max_hp: f32,
    pub speed: f32,
    /// Contact damage
    pub damage: f32,
    /// Coins credited on death
    pub value: u32,
    /// Hit flash timer
    pub flash: f32,
    #[serde(flatten)]
    pub kind: EnemyKind,
}

impl Enemy {
    pub fn chaser(pos: Vec2, wave: u32) -> Self {
        let w = wave as f32;
        Self::with_stats(pos, 16.0, 45.0 + w * 6.0, 155.0 + w * 4.0, 14.0 + w * 1.2, 2, EnemyKind::Chaser)
    }

    pub fn shooter(pos: Vec2, wave: u32, shoot_cd: f32) -> Self {
        let w = wave as f32;
        Self::with_stats(
            pos,
            15.0,
            35.0 + w * 5.0,
            120.0 + w * 2.0,
            10.0 + w,
            3,
            EnemyKind::Shooter { shoot_cd },
        )
    }

    pub fn tank(pos: Vec2, wave: u32) -> Self {
        let w = wave as f32;
        Self::with_stats(pos, 22.0, 120.0 + w * 12.0, 90.0 + w * 1.2, 22.0 + w * 1.6, 5, EnemyKind::Tank)
    }

    fn with_stats(
        pos: Vec2,
        radius: f32,
        hp: f32,
        speed: f32,
        damage: f32,
        value: u32,
        kind: EnemyKind,
    ) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            radius,
            hp,
            max_hp: hp,
            speed,
            damage,
            value,
            flash: 0.0,
            kind,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.hp <= 0.0
    }
}

/// Who fired a bullet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BulletOwner {
    /// Damages enemies, may pierce
    Player,
    /// Damages only the player, never pierces
    Enemy,
}

/// A projectile
#[derive(Debug, Clone, Serialize)]
pub struct Bullet {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Seconds left before expiry
    pub life: f32,
    pub damage: f32,
    /// Additional enemies this bullet may pass through
    pub pierce: u32,
    pub owner: BulletOwner,
    /// Consumed by a hit this tick
    #[serde(skip)]
    pub spent: bool,
}

impl Bullet {
    pub fn is_enemy(&self) -> bool {
        self.owner == BulletOwner::Enemy
    }

    /// Still flying: not spent, not expired, not far outside the arena
    pub fn is_live(&self, arena: &Arena) -> bool {
        !self.spent && self.life > 0.0 && arena.contains_with_margin(self.pos, BULLET_CULL_MARGIN)
    }
}

/// A coin pickup (feedback only; its value was credited at the kill)
#[derive(Debug, Clone, Serialize)]
pub struct Coin {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub life: f32,
    #[serde(skip)]
    pub collected: bool,
}

/// A cosmetic particle
#[derive(Debug, Clone, Serialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub life: f32,
    /// Floating text such as "+1"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<&'static str>,
}

/// Particle pool with a size budget
#[derive(Debug, Clone, Default)]
pub struct Effects {
    pub particles: Vec<Particle>,
    pub budget: usize,
}

impl Effects {
    pub fn new(budget: usize) -> Self {
        Self {
            particles: Vec::new(),
            budget,
        }
    }

    /// Spray `count` particles outward from `pos` at up to `speed`
    pub fn burst(&mut self, rng: &mut Pcg32, pos: Vec2, count: u32, speed: f32) {
        for _ in 0..count {
            if self.particles.len() >= self.budget {
                return;
            }
            let angle = rng.random_range(0.0..std::f32::consts::TAU);
            let v = rng.random_range(speed * 0.4..speed);
            self.particles.push(Particle {
                pos,
                vel: Vec2::from_angle(angle) * v,
                life: rng.random_range(0.25..0.6),
                label: None,
            });
        }
    }

    /// Floating text rising from `pos`
    pub fn label(&mut self, pos: Vec2, text: &'static str) {
        if self.particles.len() >= self.budget {
            return;
        }
        self.particles.push(Particle {
            pos,
            vel: Vec2::new(0.0, -40.0),
            life: LABEL_PARTICLE_LIFE,
            label: Some(text),
        });
    }
}

/// Complete run state
#[derive(Debug, Clone)]
pub struct Run {
    pub arena: Arena,
    pub player: Player,
    pub bullets: Vec<Bullet>,
    pub enemies: Vec<Enemy>,
    pub coins: Vec<Coin>,
    pub fx: Effects,
    pub camera: Camera,
    /// Current wave (0 before the first wave starts)
    pub wave: u32,
    pub wave_phase: WavePhase,
    pub(crate) rng: Pcg32,
}

impl Run {
    /// New run with a fresh player at the arena centre
    pub fn new(seed: u64, perm: &PermLevels, particle_budget: usize) -> Self {
        let arena = Arena::default();
        Self {
            arena,
            player: Player::new(arena.center(), perm),
            bullets: Vec::new(),
            enemies: Vec::new(),
            coins: Vec::new(),
            fx: Effects::new(particle_budget),
            camera: Camera::default(),
            wave: 0,
            wave_phase: WavePhase::Idle,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.fx.particles
    }

    /// True when no run-scoped entity is alive
    pub fn is_empty(&self) -> bool {
        self.bullets.is_empty()
            && self.enemies.is_empty()
            && self.coins.is_empty()
            && self.fx.particles.is_empty()
    }
}
