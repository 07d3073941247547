//! Arena simulation module
//!
//! All gameplay logic lives here. This module stays free of rendering and
//! platform dependencies:
//! - Variable timestep, capped by the caller
//! - Seeded RNG only
//! - Survivors are kept with `retain` after each pass

pub mod ai;
pub mod camera;
pub mod combat;
pub mod movement;
pub mod pickup;
pub mod state;
pub mod tick;
pub mod upgrades;
pub mod wave;

pub use camera::Camera;
pub use combat::CombatReport;
pub use state::{Arena, Bullet, BulletOwner, Coin, Effects, Enemy, EnemyKind, Particle, Player, Run};
pub use tick::{TickInput, TickOutcome, tick, tick_cosmetic};
pub use upgrades::{Card, ShopItem, draw_offer, purchase};
pub use wave::{WaveComposition, WaveEvent, WavePhase, choose_card, start_next_wave};
