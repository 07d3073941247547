//! Read-only frame snapshot for the renderer
//!
//! Built from the session every frame; never modifies anything. Serializes
//! to the JSON the browser renderer consumes.

use serde::Serialize;

use crate::persistence::PersistentSave;
use crate::session::{Phase, RunSummary, UiAction};
use crate::sim::{Arena, Bullet, Camera, Coin, Enemy, Particle, Player, Run, ShopItem, WavePhase};

/// One permanent-shop row on the menu
#[derive(Debug, Clone, Serialize)]
pub struct ShopRow {
    /// Opaque id reported back on click
    pub action: String,
    pub title: &'static str,
    pub level: u32,
    pub cost: u64,
    pub affordable: bool,
}

/// One card face on the upgrade screen
#[derive(Debug, Clone, Serialize)]
pub struct CardView {
    pub action: String,
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub preview: String,
}

/// Everything the renderer needs for one frame
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot<'a> {
    pub phase: Phase,
    pub wave: u32,
    /// Wave director state, including the clear grace timer
    pub wave_phase: WavePhase,
    pub arena: Arena,
    pub camera: Camera,
    pub player: &'a Player,
    pub enemies: &'a [Enemy],
    pub bullets: &'a [Bullet],
    pub coins: &'a [Coin],
    pub particles: &'a [Particle],
    pub persistent_coins: u64,
    /// Populated on the menu
    pub shop: Vec<ShopRow>,
    /// Populated on the upgrade screen
    pub offer: Vec<CardView>,
    /// Populated on the death screen
    pub summary: Option<RunSummary>,
}

impl<'a> Snapshot<'a> {
    pub fn build(
        phase: Phase,
        run: &'a Run,
        save: &PersistentSave,
        summary: Option<RunSummary>,
    ) -> Self {
        let shop = if phase == Phase::Menu {
            build_shop(save)
        } else {
            Vec::new()
        };
        let offer = if phase == Phase::Upgrade {
            build_offer(run)
        } else {
            Vec::new()
        };

        Self {
            phase,
            wave: run.wave,
            wave_phase: run.wave_phase,
            arena: run.arena,
            camera: run.camera,
            player: &run.player,
            enemies: &run.enemies,
            bullets: &run.bullets,
            coins: &run.coins,
            particles: run.particles(),
            persistent_coins: save.coins,
            shop,
            offer,
            summary: if phase == Phase::Dead { summary } else { None },
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

fn build_shop(save: &PersistentSave) -> Vec<ShopRow> {
    ShopItem::ALL
        .iter()
        .map(|item| {
            let level = item.level(&save.perm);
            let cost = item.cost(level);
            ShopRow {
                action: UiAction::Buy(*item).id(),
                title: item.title(),
                level,
                cost,
                affordable: save.coins >= cost,
            }
        })
        .collect()
}

fn build_offer(run: &Run) -> Vec<CardView> {
    let Some(offer) = run.wave_phase.offer() else {
        return Vec::new();
    };
    offer
        .iter()
        .enumerate()
        .map(|(i, card)| CardView {
            action: UiAction::PickCard(i).id(),
            id: card.id(),
            name: card.name(),
            description: card.description(),
            preview: card.preview(&run.player),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::PermLevels;
    use crate::sim::Card;

    #[test]
    fn test_menu_snapshot_lists_shop() {
        let run = Run::new(1, &PermLevels::default(), 16);
        let save = PersistentSave {
            coins: 40,
            perm: PermLevels { hp: 0, dmg: 0, spd: 0 },
        };
        let snap = Snapshot::build(Phase::Menu, &run, &save, None);
        assert_eq!(snap.shop.len(), 3);
        assert_eq!(snap.shop[0].action, "buy_hp");
        assert!(snap.shop[0].affordable);
        assert!(!snap.shop[1].affordable);
        assert!(snap.offer.is_empty());
    }

    #[test]
    fn test_upgrade_snapshot_lists_cards() {
        let mut run = Run::new(1, &PermLevels::default(), 16);
        run.wave_phase = WavePhase::Upgrade {
            offer: [Card::Magnet, Card::Pierce, Card::Speed],
        };
        let snap = Snapshot::build(Phase::Upgrade, &run, &PersistentSave::default(), None);
        assert_eq!(snap.offer.len(), 3);
        assert_eq!(snap.offer[2].action, "card_2");
        assert_eq!(snap.offer[0].id, "mag");
        assert!(snap.shop.is_empty());
    }

    #[test]
    fn test_snapshot_json_shape() {
        let run = Run::new(1, &PermLevels::default(), 16);
        let snap = Snapshot::build(Phase::Play, &run, &PersistentSave::default(), None);
        let json: serde_json::Value = serde_json::from_str(&snap.to_json().unwrap()).unwrap();
        assert_eq!(json["phase"], "play");
        assert_eq!(json["arena"]["width"], 2400.0);
        assert!(json["player"]["pos"].is_array());
        assert!(json["enemies"].as_array().unwrap().is_empty());
        assert_eq!(json["wave_phase"]["phase"], "idle");
    }

    #[test]
    fn test_snapshot_carries_grace_timer() {
        let mut run = Run::new(1, &PermLevels::default(), 16);
        run.wave = 1;
        run.wave_phase = WavePhase::ClearPending { timer: 0.25 };
        let snap = Snapshot::build(Phase::Play, &run, &PersistentSave::default(), None);
        let json: serde_json::Value = serde_json::from_str(&snap.to_json().unwrap()).unwrap();
        assert_eq!(json["wave_phase"]["phase"], "clear_pending");
        assert_eq!(json["wave_phase"]["timer"], 0.25);
    }
}
