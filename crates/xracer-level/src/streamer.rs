//! World streaming.
//!
//! The player never moves. The streamer keeps rows of blocks generated out to
//! the horizon, scrolls them toward the player every tick and evicts the oldest
//! ones once they fall behind, so memory stays bounded at
//! `row_width * ceil(0.5 + horizon_dist / block_size)` blocks.

use std::collections::VecDeque;

use glam::Vec3;
use tracing::{debug, error, info, trace};
use xracer_common::{ceil_count, repeat, BlockId, BlockIdAllocator, RandomSource};

use crate::block::{Block, NullSink, WorldSink};
use crate::catalog::BlockCatalog;
use crate::config::Level;
use crate::error::{LevelError, LevelResult};
use crate::generator::BlockGenerator;
use crate::powerup::PowerupPlacement;
use crate::section::SectionQueue;

/// Geometry of the streamed window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StreamerSettings {
    /// Distance ahead of the player that must always be covered
    pub horizon_dist: f32,
    /// Width across the horizon
    pub horizon_width: f32,
    /// Size of one block in x and z
    pub block_size: f32,
}

/// Default block size in world units.
pub const DEFAULT_BLOCK_SIZE: f32 = 64.0;

impl Default for StreamerSettings {
    fn default() -> Self {
        Self {
            horizon_dist: 300.0,
            horizon_width: 300.0,
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }
}

/// Largest window a level may ask for.
pub const MAX_LIVE_BLOCKS: usize = 1 << 20;

impl StreamerSettings {
    /// Validates the settings.
    ///
    /// Sizes must be finite and positive, and the resulting window must fit
    /// within [`MAX_LIVE_BLOCKS`].
    pub fn validate(&self) -> LevelResult<()> {
        for (field, value) in [
            ("horizon_dist", self.horizon_dist),
            ("horizon_width", self.horizon_width),
            ("block_size", self.block_size),
        ] {
            if value.is_infinite() {
                return Err(LevelError::NonFinite { field, value });
            }
        }
        if !(self.horizon_dist > 0.0) {
            return Err(LevelError::NonPositive {
                field: "horizon_dist",
                value: self.horizon_dist,
            });
        }
        if !(self.block_size > 0.0) {
            return Err(LevelError::NonPositive {
                field: "block_size",
                value: self.block_size,
            });
        }
        if !(self.horizon_width >= 0.0) {
            return Err(LevelError::NonPositive {
                field: "horizon_width",
                value: self.horizon_width,
            });
        }
        match self.checked_max_live_blocks() {
            Some(blocks) if blocks <= MAX_LIVE_BLOCKS => Ok(()),
            _ => Err(LevelError::WindowTooLarge {
                horizon_dist: self.horizon_dist,
                horizon_width: self.horizon_width,
                block_size: self.block_size,
                limit: MAX_LIVE_BLOCKS,
            }),
        }
    }

    /// Blocks on each side of the centre column.
    #[must_use]
    pub fn lateral_radius(&self) -> usize {
        ceil_count(self.horizon_width / self.block_size)
    }

    /// Blocks per row.
    #[must_use]
    pub fn row_width(&self) -> usize {
        self.checked_row_width().unwrap_or(usize::MAX)
    }

    /// Rows kept alive at once.
    #[must_use]
    pub fn rows_kept(&self) -> usize {
        ceil_count(0.5 + self.horizon_dist / self.block_size)
    }

    /// Upper bound on live blocks.
    #[must_use]
    pub fn max_live_blocks(&self) -> usize {
        self.checked_max_live_blocks().unwrap_or(usize::MAX)
    }

    /// Blocks per row, or `None` on overflow.
    #[must_use]
    pub fn checked_row_width(&self) -> Option<usize> {
        self.lateral_radius().checked_mul(2)?.checked_add(1)
    }

    /// Upper bound on live blocks, or `None` on overflow.
    #[must_use]
    pub fn checked_max_live_blocks(&self) -> Option<usize> {
        self.checked_row_width()?.checked_mul(self.rows_kept())
    }
}

/// Announcement that the streamer switched to a new section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionStarted {
    /// Index of the new section
    pub index: usize,
    /// Name of the new section
    pub name: String,
}

/// Listener for section changes, invoked synchronously from the streamer.
pub trait SectionObserver {
    /// Called when a section starts generating.
    fn on_section_started(&mut self, event: &SectionStarted);
}

impl<F: FnMut(&SectionStarted)> SectionObserver for F {
    fn on_section_started(&mut self, event: &SectionStarted) {
        self(event);
    }
}

/// What happened during one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// Rows generated in the catch-up loop
    pub rows_generated: usize,
    /// Blocks spawned
    pub blocks_spawned: usize,
    /// Blocks evicted
    pub blocks_evicted: usize,
    /// Powerups placed
    pub powerups_placed: usize,
    /// Scroll position after generation, before scrolling
    pub generated_to: f32,
    /// Sections that started during this tick
    pub sections_started: Vec<SectionStarted>,
}

/// Sliding window of live blocks over the section queue.
pub struct WorldStreamer {
    settings: StreamerSettings,
    catalog: BlockCatalog,
    sections: SectionQueue,
    blocks: VecDeque<Block>,
    scroll_pos: f32,
    scroll_x: f32,
    total_distance: f32,
    tick: u64,
    rows_generated: u64,
    ids: BlockIdAllocator,
    rng: Box<dyn RandomSource>,
    sink: Box<dyn WorldSink>,
    observers: Vec<Box<dyn SectionObserver>>,
}

impl std::fmt::Debug for WorldStreamer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorldStreamer")
            .field("settings", &self.settings)
            .field("live_blocks", &self.blocks.len())
            .field("scroll_pos", &self.scroll_pos)
            .field("scroll_x", &self.scroll_x)
            .field("total_distance", &self.total_distance)
            .field("current_section", &self.sections.current_index())
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

impl WorldStreamer {
    /// Creates a streamer for `level`, ready to tick.
    #[must_use]
    pub fn new(level: Level, rng: Box<dyn RandomSource>) -> Self {
        let Level {
            settings,
            catalog,
            sections,
            ..
        } = level;
        let mut streamer = Self {
            settings,
            catalog,
            sections,
            blocks: VecDeque::with_capacity(settings.max_live_blocks().min(MAX_LIVE_BLOCKS)),
            scroll_pos: 0.0,
            scroll_x: 0.0,
            total_distance: 0.0,
            tick: 0,
            rows_generated: 0,
            ids: BlockIdAllocator::default(),
            rng,
            sink: Box::new(NullSink),
            observers: Vec::new(),
        };
        streamer.reset();
        streamer
    }

    /// Replaces the world sink.
    #[must_use]
    pub fn with_sink(mut self, sink: Box<dyn WorldSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Registers a section observer.
    pub fn add_observer(&mut self, observer: Box<dyn SectionObserver>) {
        self.observers.push(observer);
    }

    /// Destroys all live blocks, zeroes the scroll state, resets every
    /// generator and selects the start section. Safe between any two ticks.
    pub fn reset(&mut self) {
        for block in self.blocks.drain(..) {
            self.sink.block_despawned(&block);
        }
        self.scroll_pos = 0.0;
        self.scroll_x = 0.0;
        self.total_distance = 0.0;
        self.tick = 0;
        self.rows_generated = 0;
        self.sections.reset_all();
        let start = self.sections.start_index();
        self.sections.set_current(start);
        debug!("Streamer reset at section {start}");
    }

    /// Resets onto section 0, the backdrop shown under the menus.
    pub fn reset_for_menus(&mut self) {
        self.reset();
        self.sections.set_current(0);
    }

    /// Resets and announces the start section.
    pub fn start_game(&mut self) -> SectionStarted {
        self.reset();
        let start = self.sections.start_index();
        self.announce(start)
    }

    /// Advances the world by one frame.
    ///
    /// Rows are generated until the horizon is covered, then every block moves
    /// by `-(steer * dt, 0, speed * dt)`.
    pub fn tick(&mut self, speed: f32, steer: f32, dt: f32) -> TickReport {
        self.tick += 1;
        let mut report = TickReport::default();

        while self.scroll_pos < self.settings.horizon_dist {
            self.generate_row(&mut report);
        }
        report.generated_to = self.scroll_pos;

        let z_delta = speed * dt;
        let x_delta = steer * dt;
        let delta = Vec3::new(x_delta, 0.0, z_delta);
        for block in &mut self.blocks {
            block.position -= delta;
        }

        self.scroll_pos -= z_delta;
        self.scroll_x = repeat(self.scroll_x - x_delta, self.settings.block_size);
        self.total_distance += z_delta;

        self.evict(&mut report);
        trace!(
            "tick {}: {} rows, {} live blocks",
            self.tick,
            report.rows_generated,
            self.blocks.len()
        );
        report
    }

    fn generate_row(&mut self, report: &mut TickReport) {
        let z = self.scroll_pos;
        let radius = self.settings.lateral_radius() as i32;
        let block_size = self.settings.block_size;
        let section_index = self.sections.current_index();
        let section = self.sections.current_mut();

        section.generator.start_row(z, self.rng.as_mut());
        for i in -radius..=radius {
            let x = self.scroll_x + i as f32 * block_size;
            let generated = section.generator.generate_block(x, z, self.rng.as_mut());

            let Some(block_type) = self.catalog.get(generated.kind) else {
                error!("Generator produced unknown block kind {:?}", generated.kind);
                continue;
            };

            let powerup = section
                .spawner
                .as_ref()
                .and_then(|spawner| spawner.place(block_type, self.rng.as_mut()).into_placement());
            if powerup.is_some() {
                report.powerups_placed += 1;
            }

            let block = Block {
                id: self.ids.next_id(),
                kind: generated.kind,
                position: generated.position,
                section: section_index,
                created_tick: self.tick,
                powerup,
            };
            self.sink.block_spawned(&block);
            if let Some(placement) = &block.powerup {
                self.sink.powerup_spawned(&block, placement);
            }
            self.blocks.push_back(block);
            report.blocks_spawned += 1;
        }

        let completed = section.generator.is_completed();
        if completed {
            section.generator.reset();
        }

        self.rows_generated += 1;
        report.rows_generated += 1;

        if completed {
            let next = self.sections.advance();
            let event = self.announce(next);
            report.sections_started.push(event);
        }

        self.scroll_pos += block_size;
        self.evict(report);
    }

    fn announce(&mut self, index: usize) -> SectionStarted {
        let name = self
            .sections
            .get(index)
            .map(|s| s.name.clone())
            .unwrap_or_default();
        let event = SectionStarted { index, name };
        info!("Section {} '{}' started", event.index, event.name);
        for observer in &mut self.observers {
            observer.on_section_started(&event);
        }
        event
    }

    fn evict(&mut self, report: &mut TickReport) {
        let max = self.settings.max_live_blocks();
        while self.blocks.len() > max {
            if let Some(block) = self.blocks.pop_front() {
                self.sink.block_despawned(&block);
                report.blocks_evicted += 1;
            }
        }
    }

    /// Removes the powerup from block `id` and returns it.
    pub fn collect_powerup(&mut self, id: BlockId) -> Option<PowerupPlacement> {
        let block = self.blocks.iter_mut().find(|b| b.id == id)?;
        let placement = block.powerup.take()?;
        self.sink.powerup_collected(block, &placement);
        Some(placement)
    }

    /// Live blocks, oldest first.
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter()
    }

    /// Number of live blocks.
    #[must_use]
    pub fn live_blocks(&self) -> usize {
        self.blocks.len()
    }

    /// Window geometry.
    #[must_use]
    pub fn settings(&self) -> &StreamerSettings {
        &self.settings
    }

    /// Block catalog of the loaded level.
    #[must_use]
    pub fn catalog(&self) -> &BlockCatalog {
        &self.catalog
    }

    /// Section queue of the loaded level.
    #[must_use]
    pub fn sections(&self) -> &SectionQueue {
        &self.sections
    }

    /// Index of the section rows are generated from.
    #[must_use]
    pub fn current_section(&self) -> usize {
        self.sections.current_index()
    }

    /// Forward distance generated ahead of the player.
    #[must_use]
    pub fn scroll_pos(&self) -> f32 {
        self.scroll_pos
    }

    /// Lateral scroll offset, within `[0, block_size)`.
    #[must_use]
    pub fn scroll_x(&self) -> f32 {
        self.scroll_x
    }

    /// Distance travelled since the last reset.
    #[must_use]
    pub fn total_distance(&self) -> f32 {
        self.total_distance
    }

    /// Rows generated since the last reset.
    #[must_use]
    pub fn rows_generated(&self) -> u64 {
        self.rows_generated
    }

    /// Ticks since the last reset.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.tick
    }

    /// Distance at which fog should be fully opaque to hide new rows.
    #[must_use]
    pub fn fog_distance(&self) -> f32 {
        self.settings.horizon_dist
    }
}
