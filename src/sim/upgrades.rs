//! Run-scoped upgrade cards and the permanent shop

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::state::Player;
use crate::consts::*;
use crate::error::ShopError;
use crate::persistence::{PermLevels, PersistentSave};

/// Upgrade cards offered after each cleared wave
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Card {
    Damage,
    FireRate,
    Speed,
    MaxHp,
    BulletSpeed,
    Pierce,
    Multishot,
    Lifesteal,
    Magnet,
}

impl Card {
    /// The full card pool
    pub const ALL: [Card; 9] = [
        Card::Damage,
        Card::FireRate,
        Card::Speed,
        Card::MaxHp,
        Card::BulletSpeed,
        Card::Pierce,
        Card::Multishot,
        Card::Lifesteal,
        Card::Magnet,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Card::Damage => "dmg",
            Card::FireRate => "fir",
            Card::Speed => "spd",
            Card::MaxHp => "hp",
            Card::BulletSpeed => "bsp",
            Card::Pierce => "prc",
            Card::Multishot => "ms",
            Card::Lifesteal => "ls",
            Card::Magnet => "mag",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Card::Damage => "+15% Damage",
            Card::FireRate => "+18% Fire Rate",
            Card::Speed => "+10% Move Speed",
            Card::MaxHp => "+25 Max HP",
            Card::BulletSpeed => "+15% Bullet Speed",
            Card::Pierce => "+1 Pierce",
            Card::Multishot => "Double Shot",
            Card::Lifesteal => "Lifesteal",
            Card::Magnet => "Magnet",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Card::Damage => "Hit harder.",
            Card::FireRate => "Shoot more often.",
            Card::Speed => "Move faster.",
            Card::MaxHp => "Take more punishment.",
            Card::BulletSpeed => "Faster bullets.",
            Card::Pierce => "Bullets pass through one more enemy.",
            Card::Multishot => "One extra bullet per shot.",
            Card::Lifesteal => "6% of damage dealt heals you.",
            Card::Magnet => "Coins fly in from further away.",
        }
    }

    /// Mutate the player's run stats
    pub fn apply(&self, p: &mut Player) {
        match self {
            Card::Damage => p.damage *= 1.15,
            Card::FireRate => p.fire_rate *= 1.18,
            Card::Speed => p.speed *= 1.10,
            Card::MaxHp => {
                p.max_hp += 25.0;
                p.hp += 25.0;
            }
            Card::BulletSpeed => p.bullet_speed *= 1.15,
            Card::Pierce => p.pierce += 1,
            Card::Multishot => p.multishot += 1,
            Card::Lifesteal => p.lifesteal = (p.lifesteal + 0.06).min(MAX_LIFESTEAL),
            Card::Magnet => p.magnet += 70.0,
        }
    }

    /// "current -> after" text for the card face
    pub fn preview(&self, p: &Player) -> String {
        let mut after = p.clone();
        self.apply(&mut after);
        match self {
            Card::Damage => format!("Damage {:.0} -> {:.0}", p.damage, after.damage),
            Card::FireRate => format!("Shots/s {:.1} -> {:.1}", p.fire_rate, after.fire_rate),
            Card::Speed => format!("Speed {:.0} -> {:.0}", p.speed, after.speed),
            Card::MaxHp => format!("HP {:.0} -> {:.0}", p.max_hp, after.max_hp),
            Card::BulletSpeed => {
                format!("Bullet speed {:.0} -> {:.0}", p.bullet_speed, after.bullet_speed)
            }
            Card::Pierce => format!("Pierce {} -> {}", p.pierce, after.pierce),
            Card::Multishot => format!("Extra bullets {} -> {}", p.multishot, after.multishot),
            Card::Lifesteal => format!(
                "Lifesteal {:.0}% -> {:.0}%",
                p.lifesteal * 100.0,
                after.lifesteal * 100.0
            ),
            Card::Magnet => format!("Magnet {:.0} -> {:.0}", p.magnet, after.magnet),
        }
    }
}

/// Shuffle the whole pool and deal the first three
pub fn draw_offer<R: Rng>(rng: &mut R) -> [Card; UPGRADE_OFFER_SIZE] {
    let mut pool = Card::ALL;
    pool.shuffle(rng);
    [pool[0], pool[1], pool[2]]
}

/// Permanent upgrades bought from the menu with persistent coins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShopItem {
    MaxHp,
    Damage,
    Speed,
}

impl ShopItem {
    pub const ALL: [ShopItem; 3] = [ShopItem::MaxHp, ShopItem::Damage, ShopItem::Speed];

    /// Save-file key
    pub fn key(&self) -> &'static str {
        match self {
            ShopItem::MaxHp => "hp",
            ShopItem::Damage => "dmg",
            ShopItem::Speed => "spd",
        }
    }

    pub fn parse(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|item| item.key() == key)
    }

    pub fn title(&self) -> &'static str {
        match self {
            ShopItem::MaxHp => "Permanent +10 Max HP",
            ShopItem::Damage => "Permanent +6% Damage",
            ShopItem::Speed => "Permanent +5% Speed",
        }
    }

    /// Price of the next level
    pub fn cost(&self, level: u32) -> u64 {
        let level = level as u64;
        match self {
            ShopItem::MaxHp => 35 + level * 30,
            ShopItem::Damage => 45 + level * 40,
            ShopItem::Speed => 40 + level * 35,
        }
    }

    pub fn level(&self, perm: &PermLevels) -> u32 {
        match self {
            ShopItem::MaxHp => perm.hp,
            ShopItem::Damage => perm.dmg,
            ShopItem::Speed => perm.spd,
        }
    }

    fn level_mut<'a>(&self, perm: &'a mut PermLevels) -> &'a mut u32 {
        match self {
            ShopItem::MaxHp => &mut perm.hp,
            ShopItem::Damage => &mut perm.dmg,
            ShopItem::Speed => &mut perm.spd,
        }
    }
}

/// Buy one level of `item`. The save is untouched on failure.
/// Returns the new level.
pub fn purchase(save: &mut PersistentSave, item: ShopItem) -> Result<u32, ShopError> {
    let cost = item.cost(item.level(&save.perm));
    if save.coins < cost {
        return Err(ShopError::InsufficientFunds {
            cost,
            balance: save.coins,
        });
    }
    save.coins -= cost;
    let level = item.level_mut(&mut save.perm);
    *level += 1;
    Ok(*level)
}
