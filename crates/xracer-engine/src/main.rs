//! # XRacer
//!
//! Headless driver for the XRacer endless runner.
//!
//! This binary ties together all subsystems:
//! - Level: block catalog, sections, and the world streamer
//! - Gameplay: game state, player, powerups, credits, records

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod app;
mod config;

use anyhow::Result;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use config::{ConfigSource, EngineConfig, CONFIG_FILE, DEFAULT_LOG_FILTER};

/// Main entry point.
fn main() -> Result<()> {
    let config_path = std::env::args_os()
        .nth(1)
        .map_or_else(|| PathBuf::from(CONFIG_FILE), PathBuf::from);
    let (config, source) = EngineConfig::load_or_create(&config_path);

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    info!("XRacer starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    match &source {
        ConfigSource::Loaded(path) => info!("Loaded config from {}", path.display()),
        ConfigSource::Created(path) => info!("Wrote default config to {}", path.display()),
        ConfigSource::Fallback { path, error } => {
            warn!("Using default config, {} unusable: {error}", path.display());
        },
    }

    app::run(config)?;

    info!("XRacer shutdown complete");
    Ok(())
}
