//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Storage (LocalStorage on web)
//! - Input events
//! - The render surface the snapshot is handed to

pub mod input;
pub mod storage;

pub use input::InputState;
pub use storage::{KeyValueStore, MemoryStore};

#[cfg(target_arch = "wasm32")]
pub use storage::LocalStorage;

use crate::snapshot::Snapshot;

/// Whatever draws the frame. The core only hands it a read-only snapshot.
pub trait RenderSurface {
    fn present(&mut self, snapshot: &Snapshot<'_>);
}

/// Headless surface that logs a HUD line every `interval` frames
#[derive(Debug, Clone)]
pub struct HudLogSurface {
    interval: u32,
    frames: u32,
}

impl HudLogSurface {
    pub fn new(interval: u32) -> Self {
        Self {
            interval: interval.max(1),
            frames: 0,
        }
    }

    pub fn hud_line(snapshot: &Snapshot<'_>) -> String {
        format!(
            "[{:?}] wave {} | hp {:.0}/{:.0} | score {} | run coins {} | enemies {} | bank {}",
            snapshot.phase,
            snapshot.wave,
            snapshot.player.hp.ceil(),
            snapshot.player.max_hp,
            snapshot.player.score,
            snapshot.player.coins_run,
            snapshot.enemies.len(),
            snapshot.persistent_coins,
        )
    }
}

impl RenderSurface for HudLogSurface {
    fn present(&mut self, snapshot: &Snapshot<'_>) {
        self.frames += 1;
        if self.frames % self.interval == 0 {
            log::info!("{}", Self::hud_line(snapshot));
        }
    }
}
