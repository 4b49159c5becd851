//! Game session: ties the streamer, player and run bookkeeping together.
//!
//! The session owns the [`WorldStreamer`] and decides how fast it scrolls
//! from the current [`GameState`]. Everything a HUD needs to show comes out
//! through the [`EventBus`].

use crossbeam_channel::Receiver;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use xracer_common::{BlockId, RandomSource};
use xracer_level::{Level, SectionStarted, TickReport, WorldSink, WorldStreamer};

use crate::credits::RaceCredits;
use crate::effects::{SectionDirector, MESSAGE_DELAY};
use crate::events::{EventBus, GameEvent, SectionForwarder};
use crate::player::{Player, PlayerConfig};
use crate::powerups::PowerupManager;
use crate::progress::ProgressStore;
use crate::record::RecordTracker;
use crate::shop::{Loadout, Shop, ShopResult};
use crate::state::GameState;

/// Session tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Items for sale
    pub shop: Shop,
    /// Seconds before a section message appears
    pub message_delay: f32,
    /// Player tuning
    pub player: PlayerConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            shop: Shop::default(),
            message_delay: MESSAGE_DELAY,
            player: PlayerConfig::default(),
        }
    }
}

/// Session operation error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Invalid state transition.
    #[error("Invalid transition from {from:?} to {to:?}")]
    InvalidTransition {
        /// Current state.
        from: GameState,
        /// Attempted state.
        to: GameState,
    },
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Outcome of a finished run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Distance travelled
    pub distance: f32,
    /// Best distance after this run
    pub record: f32,
    /// Whether the run beat the previous record
    pub new_record: bool,
    /// Credits collected during the run
    pub credits: u64,
    /// Credit total after the run
    pub total_credits: u64,
    /// Section active when the run ended
    pub section: String,
}

/// A playable session over one level.
pub struct GameSession<S: ProgressStore> {
    state: GameState,
    streamer: WorldStreamer,
    player: Player,
    powerups: PowerupManager,
    credits: RaceCredits,
    record: RecordTracker,
    director: SectionDirector,
    store: S,
    bus: EventBus,
    section_rx: Receiver<SectionStarted>,
    shop: Shop,
    loadout: Loadout,
    menu_scroll_speed: f32,
}

impl<S: ProgressStore> std::fmt::Debug for GameSession<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSession")
            .field("state", &self.state)
            .field("distance", &self.streamer.total_distance())
            .field("section", &self.streamer.current_section())
            .field("credits", &self.credits.earned())
            .finish_non_exhaustive()
    }
}

impl<S: ProgressStore> GameSession<S> {
    /// Creates a session in the menus.
    pub fn new(level: Level, rng: Box<dyn RandomSource>, store: S, config: SessionConfig) -> Self {
        let menu_scroll_speed = level.menu_scroll_speed();
        let mut streamer = WorldStreamer::new(level, rng);
        let (forwarder, section_rx) = SectionForwarder::channel();
        streamer.add_observer(Box::new(forwarder));

        let mut session = Self {
            state: GameState::InMenus,
            streamer,
            player: Player::new(config.player),
            powerups: PowerupManager::new(),
            credits: RaceCredits::new(1.0),
            record: RecordTracker::start_run(store.record_distance()),
            director: SectionDirector::new(config.message_delay),
            store,
            bus: EventBus::default(),
            section_rx,
            shop: config.shop,
            loadout: Loadout::default(),
            menu_scroll_speed,
        };
        session.streamer.reset_for_menus();
        session.section_rx.try_iter().for_each(drop);
        session
    }

    /// Routes block lifecycle callbacks to `sink`.
    pub fn with_sink(mut self, sink: Box<dyn WorldSink>) -> Self {
        self.streamer = self.streamer.with_sink(sink);
        self
    }

    /// Returns to the menus with the intro backdrop.
    pub fn enter_menus(&mut self) {
        self.powerups.cancel_all(&mut self.player);
        self.director.clear();
        self.streamer.reset_for_menus();
        self.section_rx.try_iter().for_each(drop);
        self.set_state(GameState::InMenus);
    }

    /// Starts a fresh run.
    pub fn start_game(&mut self) -> SessionResult<()> {
        if !self.state.can_start() {
            return Err(SessionError::InvalidTransition {
                from: self.state,
                to: GameState::Playing,
            });
        }

        self.player.reset();
        self.powerups.cancel_all(&mut self.player);
        self.director.clear();
        self.loadout = self.shop.apply_all(&mut self.store);
        self.credits.reset(self.loadout.credit_multiplier);
        self.record = RecordTracker::start_run(self.store.record_distance());
        self.set_state(GameState::Playing);
        self.streamer.start_game();
        self.process_sections();
        info!("Run started, record {:.0}", self.record.target());
        Ok(())
    }

    /// Buys shop item `id` with banked credits.
    pub fn purchase(&mut self, id: &str) -> ShopResult<()> {
        self.shop.purchase(id, &mut self.store)
    }

    /// Pauses the run.
    pub fn pause(&mut self) -> SessionResult<()> {
        if self.state == GameState::Playing {
            self.set_state(GameState::Paused);
            Ok(())
        } else {
            Err(SessionError::InvalidTransition {
                from: self.state,
                to: GameState::Paused,
            })
        }
    }

    /// Resumes a paused run.
    pub fn resume(&mut self) -> SessionResult<()> {
        if self.state == GameState::Paused {
            self.set_state(GameState::Playing);
            Ok(())
        } else {
            Err(SessionError::InvalidTransition {
                from: self.state,
                to: GameState::Playing,
            })
        }
    }

    /// Ends the run after a collision.
    pub fn player_crashed(&mut self) -> SessionResult<RunSummary> {
        if self.state != GameState::Playing {
            return Err(SessionError::InvalidTransition {
                from: self.state,
                to: GameState::Dead,
            });
        }

        self.player.crash();
        self.powerups.cancel_all(&mut self.player);
        self.director.clear();

        let distance = self.streamer.total_distance();
        self.record.update(distance);
        if self.record.broke_record() {
            self.store.set_record_distance(self.record.record());
        }
        let total = self.store.total_credits().saturating_add(self.credits.earned());
        self.store.set_total_credits(total);

        self.set_state(GameState::Dead);
        let summary = self.run_summary();
        info!(
            "Game over at {:.0}, {} credits{}",
            summary.distance,
            summary.credits,
            if summary.new_record { " (new record)" } else { "" }
        );
        self.bus.publish(GameEvent::GameOver {
            distance: summary.distance,
            credits: summary.credits,
            new_record: summary.new_record,
        });
        Ok(summary)
    }

    /// Collects the powerup in block `id`.
    ///
    /// Returns the credits awarded, or `None` if nothing was there.
    pub fn collect_powerup(&mut self, id: BlockId) -> Option<u64> {
        if !self.state.is_running() {
            return None;
        }
        let placement = self.streamer.collect_powerup(id)?;
        let name = placement.powerup.info_text().to_string();
        let activation = self.powerups.collect(placement.powerup, &mut self.player);
        let awarded = self.credits.award(activation.credits);

        self.bus.publish(GameEvent::PowerupCollected { name });
        self.bus.publish(activation.event);
        self.bus.publish(GameEvent::CreditsAwarded { amount: awarded });
        Some(awarded)
    }

    /// Advances one frame.
    pub fn update(&mut self, steer_input: f32, dt: f32) -> TickReport {
        if self.state.is_running() {
            self.player.update(steer_input, dt);
            if let Some(done) = self.powerups.update(dt, &mut self.player) {
                self.bus.publish(GameEvent::PowerupCompleted {
                    name: done.info_text().to_string(),
                });
            }
            for event in self.director.update(dt) {
                self.bus.publish(event);
            }
        }

        let (speed, steer) = self.state.scroll_velocity(&self.player, self.menu_scroll_speed);
        let report = self.streamer.tick(speed, steer, dt);
        self.process_sections();

        if self.state.is_running() {
            let distance = self.streamer.total_distance();
            if let Some(at) = self.record.update(distance) {
                info!("New record at {at:.0}");
                self.bus.publish(GameEvent::info("NEW RECORD!"));
                self.bus.publish(GameEvent::NewRecord { distance: at });
            }
            if self.record.broke_record() {
                self.store.set_record_distance(self.record.record());
            }
        }
        report
    }

    /// Summary of the current or last run.
    #[must_use]
    pub fn run_summary(&self) -> RunSummary {
        let section = self
            .streamer
            .sections()
            .current()
            .name
            .clone();
        RunSummary {
            distance: self.streamer.total_distance(),
            record: self.record.record(),
            new_record: self.record.broke_record() && self.record.target() > 0.0,
            credits: self.credits.earned(),
            total_credits: self.store.total_credits(),
            section,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> GameState {
        self.state
    }

    /// The player.
    #[must_use]
    pub const fn player(&self) -> &Player {
        &self.player
    }

    /// The world streamer.
    #[must_use]
    pub const fn streamer(&self) -> &WorldStreamer {
        &self.streamer
    }

    /// Running powerups.
    #[must_use]
    pub const fn powerups(&self) -> &PowerupManager {
        &self.powerups
    }

    /// Credits earned this race.
    #[must_use]
    pub const fn credits(&self) -> &RaceCredits {
        &self.credits
    }

    /// Record tracking for this run.
    #[must_use]
    pub const fn record(&self) -> &RecordTracker {
        &self.record
    }

    /// Persistent progress.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Consumes the session, returning its progress.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Items for sale.
    #[must_use]
    pub const fn shop(&self) -> &Shop {
        &self.shop
    }

    /// Modifiers applied at the start of the current run.
    #[must_use]
    pub const fn loadout(&self) -> &Loadout {
        &self.loadout
    }

    /// Outgoing events.
    #[must_use]
    pub const fn events(&self) -> &EventBus {
        &self.bus
    }

    fn set_state(&mut self, to: GameState) {
        if self.state != to {
            self.bus.publish(GameEvent::StateChanged {
                from: self.state,
                to,
            });
            self.state = to;
        }
    }

    fn process_sections(&mut self) {
        while let Ok(started) = self.section_rx.try_recv() {
            if !self.state.is_running() {
                continue;
            }
            if let Some(section) = self.streamer.sections().get(started.index) {
                let effects = section.effects.clone();
                for event in self.director.section_started(&effects, &mut self.player) {
                    self.bus.publish(event);
                }
            }
            self.bus.publish(GameEvent::SectionStarted {
                index: started.index,
                name: started.name,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::MemoryProgress;
    use crate::shop::{ShopEffect, ShopError, ShopItem};
    use xracer_common::FastRandom;
    use xracer_level::LevelConfig;

    const LEVEL: &str = r#"
start_section_index = 1
menu_scroll_speed = 20.0

[[blocks]]
name = "floor"

[[blocks]]
name = "ring"
spawn_slots = [{ offset = [0.0, 1.0, 0.0] }]

[[sections]]
name = "intro"
[sections.generator]
kind = "constant"
block = "floor"
length = 1

[[sections]]
name = "warmup"
[sections.generator]
kind = "constant"
block = "floor"
length = 2
[sections.effects]
speed_increase = 1.5
message = "Go!"

[[sections]]
name = "rings"
[sections.generator]
kind = "random"
blocks = ["ring"]
[sections.powerups]
frequency = 1.0
powerups = [{ type = "bonus_credits" }]
"#;

    fn session_with(store: MemoryProgress, config: SessionConfig) -> GameSession<MemoryProgress> {
        let level = LevelConfig::from_toml_str(LEVEL)
            .expect("parse")
            .build()
            .expect("build");
        GameSession::new(level, Box::new(FastRandom::with_seed(7)), store, config)
    }

    fn session() -> GameSession<MemoryProgress> {
        session_with(MemoryProgress::default(), SessionConfig::default())
    }

    #[test]
    fn test_menus_scroll_intro() {
        let mut session = session();
        assert_eq!(session.state(), GameState::InMenus);
        assert_eq!(session.streamer().current_section(), 0);

        session.update(1.0, 0.1);
        assert!((session.streamer().total_distance() - 2.0).abs() < 1e-4);
        assert_eq!(session.player().steer(), 0.0);
    }

    #[test]
    fn test_start_applies_start_section_effects() {
        let mut session = session();
        session.start_game().expect("start");
        assert_eq!(session.state(), GameState::Playing);
        assert_eq!(session.streamer().current_section(), 1);
        assert!((session.player().base_speed() - 120.0).abs() < 1e-4);

        let events = session.events().drain();
        assert!(events.contains(&GameEvent::StateChanged {
            from: GameState::InMenus,
            to: GameState::Playing
        }));
        assert!(events.contains(&GameEvent::info("Speed Increased!")));
        assert!(events.contains(&GameEvent::SectionStarted {
            index: 1,
            name: "warmup".to_string()
        }));

        for _ in 0..11 {
            session.update(0.0, 0.1);
        }
        let events = session.events().drain();
        assert!(events.contains(&GameEvent::info("Go!")));
    }

    #[test]
    fn test_pause_freezes_world() {
        let mut session = session();
        session.start_game().expect("start");
        session.update(0.0, 0.1);
        let distance = session.streamer().total_distance();

        session.pause().expect("pause");
        session.update(1.0, 0.1);
        assert_eq!(session.streamer().total_distance(), distance);
        assert_eq!(session.player().steer(), 0.0);

        session.resume().expect("resume");
        session.update(0.0, 0.1);
        assert!(session.streamer().total_distance() > distance);
    }

    #[test]
    fn test_invalid_transitions() {
        let mut session = session();
        assert!(session.pause().is_err());
        assert!(session.resume().is_err());
        assert!(session.player_crashed().is_err());

        session.start_game().expect("start");
        assert_eq!(
            session.start_game(),
            Err(SessionError::InvalidTransition {
                from: GameState::Playing,
                to: GameState::Playing
            })
        );
    }

    #[test]
    fn test_collect_and_crash_banks_credits() {
        let shop = Shop::new(vec![ShopItem {
            id: "starter_multiplier".to_string(),
            cost: 1000,
            max_inventory: 1,
            consumable: false,
            own_by_default: true,
            effect: ShopEffect::CreditMultiplier { multiplier: 1.5 },
        }])
        .expect("shop");
        let config = SessionConfig {
            shop,
            ..SessionConfig::default()
        };
        let store = MemoryProgress {
            total_credits: 100,
            ..MemoryProgress::default()
        };
        let mut session = session_with(store, config);
        session.start_game().expect("start");
        session.update(0.0, 1.0 / 60.0);

        let id = session
            .streamer()
            .blocks()
            .find(|b| b.powerup.is_some())
            .map(|b| b.id)
            .expect("rings section places powerups");
        assert_eq!(session.collect_powerup(id), Some(750));
        // already collected
        assert_eq!(session.collect_powerup(id), None);

        let summary = session.player_crashed().expect("crash");
        assert_eq!(session.state(), GameState::Dead);
        assert_eq!(summary.credits, 750);
        assert_eq!(summary.total_credits, 850);
        assert_eq!(session.store().total_credits, 850);
        // first run: record set silently
        assert!(!summary.new_record);
        assert!(session.store().record_distance > 0.0);

        let distance = session.streamer().total_distance();
        session.update(1.0, 0.1);
        assert_eq!(session.streamer().total_distance(), distance);
        assert_eq!(session.player().speed(), 0.0);

        // a new run starts from Dead
        session.start_game().expect("restart");
        assert_eq!(session.credits().earned(), 0);
    }

    #[test]
    fn test_purchased_consumable_applies_to_one_run() {
        let shop = Shop::new(vec![ShopItem {
            id: "double_credits".to_string(),
            cost: 300,
            max_inventory: 2,
            consumable: true,
            own_by_default: false,
            effect: ShopEffect::CreditMultiplier { multiplier: 2.0 },
        }])
        .expect("shop");
        let config = SessionConfig {
            shop,
            ..SessionConfig::default()
        };
        let store = MemoryProgress {
            total_credits: 700,
            ..MemoryProgress::default()
        };
        let mut session = session_with(store, config);

        session.purchase("double_credits").expect("first");
        session.purchase("double_credits").expect("second");
        assert_eq!(session.store().total_credits, 100);
        assert_eq!(
            session.purchase("double_credits"),
            Err(ShopError::CannotAfford {
                id: "double_credits".to_string(),
                cost: 300,
                available: 100
            })
        );

        session.start_game().expect("start");
        assert_eq!(session.loadout().credit_multiplier, 2.0);
        assert_eq!(session.credits().multiplier(), 2.0);
        assert_eq!(session.store().item_count("double_credits"), 1);
        session.player_crashed().expect("crash");

        session.start_game().expect("second run");
        session.player_crashed().expect("crash");
        session.start_game().expect("third run");
        assert_eq!(session.loadout().credit_multiplier, 1.0);
        assert_eq!(session.into_store().item_count("double_credits"), 0);
    }

    #[test]
    fn test_new_record_notice() {
        let store = MemoryProgress {
            record_distance: 10.0,
            ..MemoryProgress::default()
        };
        let mut session = session_with(store, SessionConfig::default());
        session.start_game().expect("start");
        session.events().drain();

        for _ in 0..30 {
            session.update(0.0, 1.0 / 60.0);
        }
        let notices = session
            .events()
            .drain()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::NewRecord { .. }))
            .count();
        assert_eq!(notices, 1);

        let summary = session.player_crashed().expect("crash");
        assert!(summary.new_record);
        assert_eq!(session.store().record_distance, summary.distance);
    }

    #[test]
    fn test_enter_menus_after_game_over() {
        let mut session = session();
        session.start_game().expect("start");
        session.update(0.0, 0.1);
        session.player_crashed().expect("crash");

        session.enter_menus();
        assert_eq!(session.state(), GameState::InMenus);
        assert_eq!(session.streamer().current_section(), 0);
        assert_eq!(session.streamer().live_blocks(), 0);
    }
}
