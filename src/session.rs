//! Top-level game session
//!
//! Owns the store, the persistent save, the settings and the current run,
//! and routes frames and UI actions through the menu/play/dead machine.
//! The upgrade screen is a sub-state of play driven by the wave director.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;

use crate::consts::MAX_FRAME_DT;
use crate::error::ShopError;
use crate::persistence::PersistentSave;
use crate::platform::{KeyValueStore, RenderSurface};
use crate::settings::Settings;
use crate::sim::{
    Run, ShopItem, TickInput, TickOutcome, choose_card, purchase, start_next_wave, tick,
    tick_cosmetic,
};
use crate::snapshot::Snapshot;

/// Outer application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Menu,
    Play,
    Dead,
}

/// What the player is looking at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Menu,
    Play,
    Upgrade,
    Dead,
}

/// A click on one of the overlay buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiAction {
    Start,
    Buy(ShopItem),
    PickCard(usize),
    Back,
}

impl UiAction {
    /// Parse an overlay action id (`start`, `buy_hp`, `card_1`, `back`)
    pub fn parse(id: &str) -> Option<Self> {
        match id {
            "start" => Some(UiAction::Start),
            "back" => Some(UiAction::Back),
            _ => {
                if let Some(key) = id.strip_prefix("buy_") {
                    ShopItem::parse(key).map(UiAction::Buy)
                } else if let Some(index) = id.strip_prefix("card_") {
                    index.parse().ok().map(UiAction::PickCard)
                } else {
                    None
                }
            }
        }
    }

    pub fn id(&self) -> String {
        match self {
            UiAction::Start => "start".to_string(),
            UiAction::Buy(item) => format!("buy_{}", item.key()),
            UiAction::PickCard(index) => format!("card_{}", index),
            UiAction::Back => "back".to_string(),
        }
    }
}

/// Shown on the death screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub wave: u32,
    pub score: u64,
    pub coins_earned: u64,
    /// Persistent balance after banking the run
    pub balance: u64,
}

/// The whole game minus the platform glue
pub struct Session<S: KeyValueStore> {
    store: S,
    save: PersistentSave,
    settings: Settings,
    state: AppState,
    run: Run,
    /// Seeds each new run
    seeder: Pcg32,
    viewport: Vec2,
    summary: Option<RunSummary>,
}

impl<S: KeyValueStore> Session<S> {
    pub fn new(store: S, seed: u64) -> Self {
        let save = PersistentSave::load(&store);
        let settings = Settings::load(&store);
        let mut seeder = Pcg32::seed_from_u64(seed);
        let run = Run::new(seeder.random(), &save.perm, settings.max_particles());
        let viewport = run.camera.viewport;

        log::info!("Session ready: {} coins banked", save.coins);

        Self {
            store,
            save,
            settings,
            state: AppState::Menu,
            run,
            seeder,
            viewport,
            summary: None,
        }
    }

    pub fn state(&self) -> AppState {
        self.state
    }

    pub fn phase(&self) -> Phase {
        match self.state {
            AppState::Menu => Phase::Menu,
            AppState::Dead => Phase::Dead,
            AppState::Play if self.run.wave_phase.offer().is_some() => Phase::Upgrade,
            AppState::Play => Phase::Play,
        }
    }

    pub fn run(&self) -> &Run {
        &self.run
    }

    #[cfg(test)]
    pub(crate) fn run_mut(&mut self) -> &mut Run {
        &mut self.run
    }

    pub fn save(&self) -> &PersistentSave {
        &self.save
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn summary(&self) -> Option<RunSummary> {
        self.summary
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport = Vec2::new(width, height);
        self.run.camera.set_viewport(width, height);
    }

    /// Replace the settings, apply them to the live run and persist them
    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
        self.run.fx.budget = self.settings.max_particles();
        self.run.fx.particles.truncate(self.run.fx.budget);
        if let Err(e) = self.settings.save(&mut self.store) {
            log::warn!("Could not persist settings: {}", e);
        }
    }

    /// Route an overlay click. Returns whether anything changed; actions
    /// that do not belong to the current phase are ignored.
    pub fn handle_action(&mut self, action: UiAction) -> bool {
        match (self.phase(), action) {
            (Phase::Menu, UiAction::Start) => {
                self.start_run();
                true
            }
            (Phase::Menu, UiAction::Buy(item)) => self.buy(item),
            (Phase::Upgrade, UiAction::PickCard(index)) => {
                choose_card(&mut self.run, index).is_some()
            }
            (Phase::Dead, UiAction::Back) => {
                self.back_to_menu();
                true
            }
            (phase, action) => {
                log::debug!("Ignoring {:?} in {:?}", action, phase);
                false
            }
        }
    }

    /// Advance one display frame. `raw_dt` is clamped to `[0, MAX_FRAME_DT]`.
    pub fn frame(&mut self, raw_dt: f32, input: &TickInput) -> TickOutcome {
        let dt = raw_dt.max(0.0).min(MAX_FRAME_DT);

        if self.state != AppState::Play {
            tick_cosmetic(&mut self.run, dt);
            return TickOutcome::default();
        }

        let outcome = tick(&mut self.run, input, dt);
        if outcome.player_died {
            self.end_run();
        }
        outcome
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot::build(self.phase(), &self.run, &self.save, self.summary)
    }

    pub fn render<R: RenderSurface + ?Sized>(&self, surface: &mut R) {
        surface.present(&self.snapshot());
    }

    fn fresh_run(&mut self) -> Run {
        let mut run = Run::new(
            self.seeder.random(),
            &self.save.perm,
            self.settings.max_particles(),
        );
        run.camera.set_viewport(self.viewport.x, self.viewport.y);
        run.camera.follow(run.player.pos, &run.arena);
        run
    }

    fn start_run(&mut self) {
        self.run = self.fresh_run();
        self.summary = None;
        self.state = AppState::Play;
        log::info!(
            "Run started (max hp {}, damage {:.1}, speed {:.0})",
            self.run.player.max_hp,
            self.run.player.damage,
            self.run.player.speed
        );
        start_next_wave(&mut self.run);
    }

    fn buy(&mut self, item: ShopItem) -> bool {
        match purchase(&mut self.save, item) {
            Ok(level) => {
                log::info!("Bought {} level {} ({} coins left)", item.key(), level, self.save.coins);
                self.persist_save();
                true
            }
            Err(ShopError::InsufficientFunds { cost, balance }) => {
                log::debug!("Cannot afford {}: costs {}, have {}", item.key(), cost, balance);
                false
            }
        }
    }

    fn end_run(&mut self) {
        let earned = self.run.player.coins_run;
        self.save.fold_run_coins(earned);
        self.persist_save();

        let summary = RunSummary {
            wave: self.run.wave,
            score: self.run.player.score,
            coins_earned: earned,
            balance: self.save.coins,
        };
        log::info!(
            "Died on wave {}: score {}, {} coins banked (balance {})",
            summary.wave,
            summary.score,
            summary.coins_earned,
            summary.balance
        );
        self.summary = Some(summary);
        self.state = AppState::Dead;
    }

    fn back_to_menu(&mut self) {
        self.run = self.fresh_run();
        self.state = AppState::Menu;
        log::info!("Back to menu");
    }

    fn persist_save(&mut self) {
        if let Err(e) = self.save.store(&mut self.store) {
            log::warn!("Could not persist save: {}", e);
        }
    }
}
