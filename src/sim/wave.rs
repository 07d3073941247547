//! Wave director
//!
//! Fighting -> ClearPending -> Upgrade -> Fighting (next wave).
//! The upgrade offer only exists once the enemy list has emptied, so the
//! card screen can never open while enemies are alive.

use glam::Vec2;
use rand::Rng;
use serde::Serialize;

use super::state::{Arena, Enemy, Run};
use super::upgrades::{Card, draw_offer};
use crate::consts::*;

/// Wave progression state
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum WavePhase {
    /// Run created, first wave not started
    Idle,
    /// Enemies alive
    Fighting,
    /// All enemies dead; waiting out the grace period
    ClearPending { timer: f32 },
    /// Simulation suspended until a card is picked
    Upgrade { offer: [Card; UPGRADE_OFFER_SIZE] },
}

impl WavePhase {
    /// Whether the combat simulation runs in this phase
    pub fn is_active(&self) -> bool {
        matches!(self, WavePhase::Fighting | WavePhase::ClearPending { .. })
    }

    pub fn offer(&self) -> Option<&[Card; UPGRADE_OFFER_SIZE]> {
        match self {
            WavePhase::Upgrade { offer } => Some(offer),
            _ => None,
        }
    }
}

/// Wave director transitions reported to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WaveEvent {
    #[default]
    None,
    /// Last enemy died this tick
    Cleared,
    /// Grace period elapsed, cards dealt
    OfferOpened,
}

/// Enemy counts for one wave
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaveComposition {
    pub chasers: u32,
    pub shooters: u32,
    pub tanks: u32,
}

impl WaveComposition {
    pub fn for_wave(wave: u32) -> Self {
        Self {
            chasers: 5 + wave * 2,
            // floor(1.2w) and floor(0.7w), kept in integer math
            shooters: if wave >= 2 { wave * 6 / 5 } else { 0 },
            tanks: if wave >= 3 { wave * 7 / 10 } else { 0 },
        }
    }

    pub fn total(&self) -> u32 {
        self.chasers + self.shooters + self.tanks
    }
}

/// Random point just inside one of the four arena walls
pub fn spawn_point<R: Rng>(arena: &Arena, rng: &mut R) -> Vec2 {
    let m = SPAWN_MARGIN;
    match rng.random_range(0..4) {
        0 => Vec2::new(rng.random_range(m..arena.width - m), m),
        1 => Vec2::new(rng.random_range(m..arena.width - m), arena.height - m),
        2 => Vec2::new(m, rng.random_range(m..arena.height - m)),
        _ => Vec2::new(arena.width - m, rng.random_range(m..arena.height - m)),
    }
}

/// Advance to the next wave: spawn its enemies and grant the wave heal
pub fn start_next_wave(run: &mut Run) -> WaveComposition {
    run.wave += 1;
    run.wave_phase = WavePhase::Fighting;

    let wave = run.wave;
    let comp = WaveComposition::for_wave(wave);

    for _ in 0..comp.chasers {
        let pos = spawn_point(&run.arena, &mut run.rng);
        run.enemies.push(Enemy::chaser(pos, wave));
    }
    for _ in 0..comp.shooters {
        let pos = spawn_point(&run.arena, &mut run.rng);
        let shoot_cd = run.rng.random_range(0.4..1.1);
        run.enemies.push(Enemy::shooter(pos, wave, shoot_cd));
    }
    for _ in 0..comp.tanks {
        let pos = spawn_point(&run.arena, &mut run.rng);
        run.enemies.push(Enemy::tank(pos, wave));
    }

    run.player.heal(WAVE_START_HEAL);

    log::info!(
        "Wave {} started: {} chasers, {} shooters, {} tanks",
        wave,
        comp.chasers,
        comp.shooters,
        comp.tanks
    );
    comp
}

/// Check the clear condition and run the grace timer
pub fn advance(run: &mut Run, dt: f32) -> WaveEvent {
    match run.wave_phase {
        WavePhase::Fighting if run.enemies.is_empty() => {
            run.wave_phase = WavePhase::ClearPending { timer: dt };
            log::info!("Wave {} cleared", run.wave);
            WaveEvent::Cleared
        }
        WavePhase::ClearPending { timer } => {
            let timer = timer + dt;
            if timer > WAVE_CLEAR_GRACE {
                let offer = draw_offer(&mut run.rng);
                log::info!(
                    "Upgrade offer: {}, {}, {}",
                    offer[0].id(),
                    offer[1].id(),
                    offer[2].id()
                );
                run.wave_phase = WavePhase::Upgrade { offer };
                WaveEvent::OfferOpened
            } else {
                run.wave_phase = WavePhase::ClearPending { timer };
                WaveEvent::None
            }
        }
        _ => WaveEvent::None,
    }
}

/// Apply the card at `index` of the open offer and start the next wave.
/// Returns `None` (and changes nothing) if no offer is open or the index
/// is out of range.
pub fn choose_card(run: &mut Run, index: usize) -> Option<Card> {
    let card = *run.wave_phase.offer()?.get(index)?;
    card.apply(&mut run.player);
    log::info!("Picked {} ({})", card.id(), card.name());
    start_next_wave(run);
    Some(card)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::PermLevels;
    use crate::sim::state::EnemyKind;

    fn run() -> Run {
        Run::new(21, &PermLevels::default(), 128)
    }

    fn count(run: &Run, name: &str) -> u32 {
        run.enemies.iter().filter(|e| e.kind.as_str() == name).count() as u32
    }

    #[test]
    fn test_composition_by_wave() {
        assert_eq!(
            WaveComposition::for_wave(1),
            WaveComposition { chasers: 7, shooters: 0, tanks: 0 }
        );
        assert_eq!(
            WaveComposition::for_wave(2),
            WaveComposition { chasers: 9, shooters: 2, tanks: 0 }
        );
        assert_eq!(
            WaveComposition::for_wave(3),
            WaveComposition { chasers: 11, shooters: 3, tanks: 2 }
        );
        assert_eq!(WaveComposition::for_wave(10).shooters, 12);
        assert_eq!(WaveComposition::for_wave(10).tanks, 7);
    }

    #[test]
    fn test_composition_non_decreasing() {
        let mut prev = WaveComposition::for_wave(1);
        for w in 2..60 {
            let c = WaveComposition::for_wave(w);
            assert!(c.chasers >= prev.chasers);
            assert!(c.shooters >= prev.shooters);
            assert!(c.tanks >= prev.tanks);
            assert_eq!(c, WaveComposition::for_wave(w));
            prev = c;
        }
    }

    #[test]
    fn test_start_next_wave_spawns_inside_arena() {
        let mut r = run();
        let comp = start_next_wave(&mut r);
        assert_eq!(r.wave, 1);
        assert_eq!(r.enemies.len() as u32, comp.total());
        assert_eq!(count(&r, "chaser"), 7);
        for e in &r.enemies {
            assert!(r.arena.contains_with_margin(e.pos, 0.0));
        }
        assert_eq!(r.wave_phase, WavePhase::Fighting);
    }

    #[test]
    fn test_wave_heal_capped() {
        let mut r = run();
        r.player.hp = 95.0;
        start_next_wave(&mut r);
        assert_eq!(r.player.hp, r.player.max_hp);
        r.player.hp = 50.0;
        start_next_wave(&mut r);
        assert_eq!(r.player.hp, 60.0);
    }

    #[test]
    fn test_shooter_initial_cooldown_randomized() {
        let mut r = run();
        r.wave = 4;
        start_next_wave(&mut r);
        let cds: Vec<f32> = r
            .enemies
            .iter()
            .filter_map(|e| match e.kind {
                EnemyKind::Shooter { shoot_cd } => Some(shoot_cd),
                _ => None,
            })
            .collect();
        assert_eq!(cds.len(), 6);
        assert!(cds.iter().all(|cd| (0.4..1.1).contains(cd)));
    }

    #[test]
    fn test_clear_latches_once_then_offers() {
        let mut r = run();
        start_next_wave(&mut r);
        r.enemies.clear();

        assert_eq!(advance(&mut r, 0.033), WaveEvent::Cleared);
        // Already pending: does not re-latch
        assert_eq!(advance(&mut r, 0.033), WaveEvent::None);
        assert!(matches!(r.wave_phase, WavePhase::ClearPending { .. }));

        let mut opened = false;
        for _ in 0..30 {
            if advance(&mut r, 0.033) == WaveEvent::OfferOpened {
                opened = true;
                break;
            }
        }
        assert!(opened);
        assert!(r.wave_phase.offer().is_some());
        assert!(!r.wave_phase.is_active());
    }

    #[test]
    fn test_choose_card_applies_once_and_starts_next_wave() {
        let mut r = run();
        start_next_wave(&mut r);
        r.enemies.clear();
        r.wave_phase = WavePhase::Upgrade {
            offer: [Card::Pierce, Card::Damage, Card::Magnet],
        };

        assert_eq!(choose_card(&mut r, 5), None);
        assert_eq!(r.player.pierce, 0);

        assert_eq!(choose_card(&mut r, 0), Some(Card::Pierce));
        assert_eq!(r.player.pierce, 1);
        assert_eq!(r.wave, 2);
        assert_eq!(r.wave_phase, WavePhase::Fighting);
        assert_eq!(count(&r, "shooter"), 2);

        // Offer is gone
        assert_eq!(choose_card(&mut r, 0), None);
        assert_eq!(r.player.pierce, 1);
    }

    #[test]
    fn test_idle_run_never_clears() {
        let mut r = run();
        assert_eq!(advance(&mut r, 0.033), WaveEvent::None);
        assert_eq!(r.wave_phase, WavePhase::Idle);
    }
}
