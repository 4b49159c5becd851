//! Engine configuration.
//!
//! Provides the level to load, simulation timing, and session tuning.
//! The file is read before logging starts, so loading reports what happened
//! through [`ConfigSource`] instead of logging it.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use xracer_gameplay::SessionConfig;

/// Configuration file name.
pub const CONFIG_FILE: &str = "xracer.toml";

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "xracer=info";

/// Engine configuration parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // === Level Settings ===
    /// Level file (TOML or RON)
    pub level_path: PathBuf,
    /// Random seed (None = random)
    pub seed: Option<u64>,

    // === Simulation Settings ===
    /// Fixed updates per second
    pub tick_rate: u32,
    /// Seconds spent idling in the menus before the run
    pub menu_seconds: f32,
    /// Seconds until the scripted crash
    pub run_seconds: f32,
    /// Period of the scripted steering wave in seconds
    pub steer_period: f32,
    /// Lateral distance within which powerups are picked up
    pub pickup_radius: f32,

    // === Progress ===
    /// JSON file holding record, credits and owned items (None = keep in memory)
    pub progress_path: Option<PathBuf>,
    /// Shop items bought in the menus before the run
    pub purchases: Vec<String>,

    // === Output ===
    /// Log every gameplay event
    pub log_events: bool,
    /// Tracing filter directives, overridden by `RUST_LOG`
    pub log_filter: String,

    // === Session ===
    /// Player, shop and session tuning
    pub session: SessionConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            // Level
            level_path: PathBuf::from("levels/default.toml"),
            seed: None,

            // Simulation
            tick_rate: 60,
            menu_seconds: 3.0,
            run_seconds: 60.0,
            steer_period: 4.0,
            pickup_radius: 8.0,

            // Progress
            progress_path: None,
            purchases: Vec::new(),

            // Output
            log_events: true,
            log_filter: DEFAULT_LOG_FILTER.to_string(),

            // Session
            session: SessionConfig::default(),
        }
    }
}

/// Where the active configuration came from.
#[derive(Debug)]
pub enum ConfigSource {
    /// Read from the file.
    Loaded(PathBuf),
    /// File was missing, defaults were written to it.
    Created(PathBuf),
    /// Defaults in use because the file could not be read or written.
    Fallback {
        /// Config file path
        path: PathBuf,
        /// What went wrong
        error: io::Error,
    },
}

impl EngineConfig {
    /// Reads configuration from `path`.
    ///
    /// Returns `Ok(None)` if the file does not exist.
    pub fn read_from<P: AsRef<Path>>(path: P) -> io::Result<Option<Self>> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };
        toml::from_str(&contents)
            .map(Some)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Reads `path`, writing the defaults there on first run.
    ///
    /// Falls back to defaults if the file is unreadable or invalid.
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> (Self, ConfigSource) {
        let path = path.as_ref().to_path_buf();
        match Self::read_from(&path) {
            Ok(Some(config)) => (config, ConfigSource::Loaded(path)),
            Ok(None) => {
                let config = Self::default();
                let source = match config.save_to(&path) {
                    Ok(()) => ConfigSource::Created(path),
                    Err(error) => ConfigSource::Fallback { path, error },
                };
                (config, source)
            },
            Err(error) => (Self::default(), ConfigSource::Fallback { path, error }),
        }
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(path, contents)
    }

    /// Validate and clamp configuration values to sensible ranges.
    pub fn validate(&mut self) {
        // Simulation
        self.tick_rate = self.tick_rate.clamp(10, 240);
        self.menu_seconds = self.menu_seconds.clamp(0.0, 60.0);
        self.run_seconds = self.run_seconds.clamp(1.0, 3600.0);
        self.steer_period = self.steer_period.clamp(0.5, 60.0);
        self.pickup_radius = self.pickup_radius.clamp(0.0, 64.0);

        // Session
        self.session.message_delay = self.session.message_delay.clamp(0.0, 10.0);
        self.session.player.speed = self.session.player.speed.clamp(1.0, 1000.0);
    }

    /// Seconds per update.
    #[must_use]
    pub fn timestep(&self) -> f32 {
        1.0 / self.tick_rate.max(1) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.tick_rate, 60);
        assert_eq!(config.level_path, PathBuf::from("levels/default.toml"));
        assert!(config.seed.is_none());
        assert_eq!(config.log_filter, "xracer=info");
        assert!(config.purchases.is_empty());
        assert_eq!(config.session.player.speed, 80.0);
    }

    #[test]
    fn test_config_validation() {
        let mut config = EngineConfig::default();

        config.tick_rate = 1;
        config.run_seconds = 0.0;
        config.session.message_delay = -1.0;

        config.validate();

        assert_eq!(config.tick_rate, 10);
        assert_eq!(config.run_seconds, 1.0);
        assert_eq!(config.session.message_delay, 0.0);
        assert!((config.timestep() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_config_save_read() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("test_config.toml");

        let mut config = EngineConfig::default();
        config.seed = Some(12345);
        config.run_seconds = 30.0;
        config.log_filter = "xracer=debug,xracer_level=trace".to_string();
        config.purchases = vec!["double_credits".to_string()];

        config.save_to(&config_path).expect("Failed to save config");

        let loaded = EngineConfig::read_from(&config_path)
            .expect("read")
            .expect("file exists");
        assert_eq!(loaded.seed, Some(12345));
        assert_eq!(loaded.run_seconds, 30.0);
        assert_eq!(loaded.log_filter, "xracer=debug,xracer_level=trace");
        assert_eq!(loaded.purchases, vec!["double_credits".to_string()]);
    }

    #[test]
    fn test_first_run_writes_defaults() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("nested").join(CONFIG_FILE);
        assert!(EngineConfig::read_from(&config_path).expect("read").is_none());

        let (config, source) = EngineConfig::load_or_create(&config_path);
        assert!(matches!(source, ConfigSource::Created(_)));
        assert_eq!(config.tick_rate, 60);
        assert!(config_path.exists());

        let (again, source) = EngineConfig::load_or_create(&config_path);
        assert!(matches!(source, ConfigSource::Loaded(_)));
        assert_eq!(again.log_filter, config.log_filter);
    }

    #[test]
    fn test_invalid_config_falls_back() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join(CONFIG_FILE);
        fs::write(&config_path, "tick_rate = \"fast\"").expect("write");

        let err = EngineConfig::read_from(&config_path).expect_err("invalid");
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);

        let (config, source) = EngineConfig::load_or_create(&config_path);
        assert!(matches!(source, ConfigSource::Fallback { .. }));
        assert_eq!(config.tick_rate, 60);
        // the broken file is left for the user to fix
        let contents = fs::read_to_string(&config_path).expect("read back");
        assert!(contents.contains("fast"));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: EngineConfig = toml::from_str(
            r#"
            seed = 9
            [session.player]
            steer_speed = 12.0
            "#,
        )
        .expect("parse");
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.session.player.steer_speed, 12.0);
        assert_eq!(config.session.player.speed, 80.0);
        assert_eq!(config.menu_seconds, 3.0);
    }

    #[test]
    fn test_shipped_config_parses() {
        let config: EngineConfig =
            toml::from_str(include_str!("../../../xracer.toml")).expect("parse");
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
        assert_eq!(config.session.shop.items().count(), 4);
        assert!(config.session.shop.get("classic").expect("classic").own_by_default);
        assert!(config.level_path.ends_with("default.toml"));
    }

    #[test]
    fn test_shop_in_config() {
        let config: EngineConfig = toml::from_str(
            r#"
            purchases = ["double_credits"]

            [[session.shop]]
            id = "double_credits"
            cost = 500
            consumable = true
            max_inventory = 3
            effect = { type = "credit_multiplier" }

            [[session.shop]]
            id = "classic"
            own_by_default = true
            effect = { type = "ship_skin", model = "ship_classic" }
            "#,
        )
        .expect("parse");
        let item = config.session.shop.get("double_credits").expect("item");
        assert_eq!(item.cost, 500);
        assert_eq!(item.max_inventory, 3);
        assert_eq!(
            item.effect,
            xracer_gameplay::ShopEffect::CreditMultiplier { multiplier: 2.0 }
        );
        assert_eq!(config.session.shop.get("classic").expect("skin").cost, 1000);

        let dup = toml::from_str::<EngineConfig>(
            r#"
            [[session.shop]]
            id = "a"
            effect = { type = "credit_multiplier" }
            [[session.shop]]
            id = "a"
            effect = { type = "credit_multiplier" }
            "#,
        );
        assert!(dup.is_err());
    }
}
