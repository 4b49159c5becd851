//! Headless run driver.
//!
//! Idles under the menus, plays one scripted run, then prints a JSON summary.

use anyhow::{Context, Result};
use std::f32::consts::TAU;
use std::fs;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tracing::{debug, info, warn};
use xracer_common::{BlockId, FastRandom};
use xracer_gameplay::{GameEvent, GameSession, MemoryProgress, ProgressStore, RunSummary};
use xracer_level::Level;

use crate::config::EngineConfig;

/// Runs the engine with a loaded configuration.
pub fn run(mut config: EngineConfig) -> Result<()> {
    config.validate();

    info!("Configuration loaded:");
    info!("  Level: {}", config.level_path.display());
    info!("  Tick rate: {} Hz", config.tick_rate);
    info!("  Run length: {:.1}s", config.run_seconds);

    let level = Level::load(&config.level_path)
        .with_context(|| format!("failed to load level {}", config.level_path.display()))?;

    let store = match &config.progress_path {
        Some(path) => load_progress(path)?,
        None => MemoryProgress::default(),
    };

    let seed = config.seed.unwrap_or_else(|| fastrand::u64(..));
    info!("Seed: {seed}");

    let (summary, progress) = simulate(&config, level, seed, store)?;

    if let Some(path) = &config.progress_path {
        save_progress(path, &progress)?;
    }

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

/// Plays the menu idle period, the configured purchases and one run.
///
/// Returns the run summary and the updated progress.
pub fn simulate(
    config: &EngineConfig,
    level: Level,
    seed: u64,
    store: MemoryProgress,
) -> Result<(RunSummary, MemoryProgress)> {
    let block_size = level.settings().block_size;
    let mut session = GameSession::new(
        level,
        Box::new(FastRandom::with_seed(seed)),
        store,
        config.session.clone(),
    );
    let dt = config.timestep();
    let settings = session.streamer().settings();
    info!(
        "Streaming {} blocks per row, fog at {:.0}",
        settings.row_width(),
        session.streamer().fog_distance()
    );

    let menu_ticks = (config.menu_seconds / dt).round() as u64;
    for _ in 0..menu_ticks {
        session.update(0.0, dt);
    }
    drain_events(&session, config.log_events);
    info!(
        "Menus idle for {:.1}s, {} blocks live",
        config.menu_seconds,
        session.streamer().live_blocks()
    );

    for id in &config.purchases {
        if let Err(e) = session.purchase(id) {
            warn!("Purchase skipped: {e}");
        }
    }

    session.start_game()?;
    if let Some(model) = &session.loadout().ship_model {
        info!("Flying {model}");
    }
    let mut elapsed = 0.0_f32;
    let mut collected = 0_usize;
    while elapsed < config.run_seconds {
        session.update(scripted_steer(elapsed, config.steer_period), dt);
        for id in powerups_in_reach(&session, block_size, config.pickup_radius) {
            if session.collect_powerup(id).is_some() {
                collected += 1;
            }
        }
        drain_events(&session, config.log_events);
        elapsed += dt;
    }

    let summary = session.player_crashed()?;
    drain_events(&session, config.log_events);
    info!("Collected {collected} powerups");
    Ok((summary, session.into_store()))
}

/// Steering input for the scripted run: a slow sine sweep.
#[must_use]
pub fn scripted_steer(elapsed: f32, period: f32) -> f32 {
    (elapsed / period * TAU).sin()
}

/// Blocks whose powerup just reached the player within `radius` sideways.
fn powerups_in_reach<S: ProgressStore>(
    session: &GameSession<S>,
    block_size: f32,
    radius: f32,
) -> Vec<BlockId> {
    session
        .streamer()
        .blocks()
        .filter_map(|block| {
            let pos = block.powerup_position()?;
            (pos.z <= 0.0 && pos.z > -block_size && pos.x.abs() <= radius).then_some(block.id)
        })
        .collect()
}

fn drain_events<S: ProgressStore>(session: &GameSession<S>, log: bool) {
    for event in session.events().drain() {
        match &event {
            GameEvent::Info { message, .. } | GameEvent::Countdown { message, .. } if log => {
                info!("HUD: {message}");
            },
            _ if log => info!("Event: {event:?}"),
            _ => debug!("Event: {event:?}"),
        }
    }
}

/// Loads stored progress, or defaults if the file does not exist yet.
pub fn load_progress(path: &Path) -> Result<MemoryProgress> {
    if !path.exists() {
        info!("No progress file at {}, starting fresh", path.display());
        return Ok(MemoryProgress::default());
    }
    let file = fs::File::open(path)
        .with_context(|| format!("failed to open progress {}", path.display()))?;
    let progress = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse progress {}", path.display()))?;
    Ok(progress)
}

/// Writes progress after a finished run.
pub fn save_progress(path: &Path, progress: &MemoryProgress) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = fs::File::create(path)
        .with_context(|| format!("failed to create progress {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), progress)?;
    info!("Saved progress to {}", path.display());
    Ok(())
}
