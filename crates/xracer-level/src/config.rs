//! Level configuration.
//!
//! Levels are authored as TOML or RON and validated into a [`Level`] before a
//! streamer is built. Every configuration error surfaces here, at load time.

use std::fs;
use std::path::Path;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use xracer_common::XRacerError;

use crate::catalog::{BlockCatalog, BlockType, SpawnSlot};
use crate::error::{LevelError, LevelResult};
use crate::generator::{ConstantGenerator, RandomPickGenerator, SectionGenerator, SequenceGenerator};
use crate::powerup::{PowerupKind, PowerupSpawner};
use crate::section::{Section, SectionEffects, SectionQueue};
use crate::streamer::{StreamerSettings, DEFAULT_BLOCK_SIZE};

/// Authored spawn slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnSlotConfig {
    /// Offset from the block origin `[x, y, z]`
    pub offset: [f32; 3],
    /// Rotation about the vertical axis in degrees
    #[serde(default)]
    pub yaw_degrees: f32,
}

/// Authored block type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockTypeConfig {
    /// Unique name
    pub name: String,
    /// Valid powerup spawn slots
    #[serde(default)]
    pub spawn_slots: Vec<SpawnSlotConfig>,
}

fn default_constant_length() -> u32 {
    3
}

fn default_random_length() -> u32 {
    10
}

fn default_rows_per_block() -> u32 {
    3
}

fn default_true() -> bool {
    true
}

fn default_one() -> u32 {
    1
}

/// Authored generator, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GeneratorConfig {
    /// One repeated block
    Constant {
        /// Block name
        block: String,
        /// Rows before the section completes
        #[serde(default = "default_constant_length")]
        length: u32,
        /// Never complete
        #[serde(default)]
        infinite: bool,
    },
    /// Random pick per slot
    Random {
        /// Block names to pick from
        blocks: Vec<String>,
        /// Rows before the section completes
        #[serde(default = "default_random_length")]
        length: u32,
        /// Jitter each row sideways
        #[serde(default = "default_true")]
        randomize_x: bool,
    },
    /// Ordered sequence
    Sequence {
        /// Block names in order
        blocks: Vec<String>,
        /// Rows per item
        #[serde(default = "default_rows_per_block")]
        rows_per_block: u32,
        /// Passes over the whole sequence
        #[serde(default = "default_one")]
        repeats: u32,
    },
}

fn default_frequency() -> f32 {
    0.25
}

/// Authored powerup spawner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerupSpawnerConfig {
    /// Probability of a powerup per block
    #[serde(default = "default_frequency")]
    pub frequency: f32,
    /// Powerups to pick from
    pub powerups: Vec<PowerupKind>,
}

/// Authored section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionConfig {
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Block generator
    pub generator: GeneratorConfig,
    /// Optional powerup spawner
    #[serde(default)]
    pub powerups: Option<PowerupSpawnerConfig>,
    /// Effects applied when the section starts
    #[serde(default)]
    pub effects: SectionEffects,
}

/// Authored level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    /// Section to start games at; earlier sections only run once
    pub start_section_index: usize,
    /// Distance to the horizon
    pub horizon_dist: f32,
    /// Width across the horizon
    pub horizon_width: f32,
    /// Size of one block in x and z
    pub block_size: f32,
    /// Scroll speed under the menus
    pub menu_scroll_speed: f32,
    /// Block types
    pub blocks: Vec<BlockTypeConfig>,
    /// Sections in order
    pub sections: Vec<SectionConfig>,
}

impl Default for LevelConfig {
    fn default() -> Self {
        let settings = StreamerSettings::default();
        Self {
            start_section_index: 0,
            horizon_dist: settings.horizon_dist,
            horizon_width: settings.horizon_width,
            block_size: DEFAULT_BLOCK_SIZE,
            menu_scroll_speed: 20.0,
            blocks: Vec::new(),
            sections: Vec::new(),
        }
    }
}

impl LevelConfig {
    /// Parses a TOML level.
    pub fn from_toml_str(text: &str) -> LevelResult<Self> {
        toml::from_str(text).map_err(|e| {
            LevelError::Load(XRacerError::Parse {
                format: "toml",
                message: e.to_string(),
            })
        })
    }

    /// Parses a RON level.
    pub fn from_ron_str(text: &str) -> LevelResult<Self> {
        ron::from_str(text).map_err(|e| {
            LevelError::Load(XRacerError::Parse {
                format: "ron",
                message: e.to_string(),
            })
        })
    }

    /// Loads a level file, choosing the format by extension.
    pub fn load<P: AsRef<Path>>(path: P) -> LevelResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(XRacerError::from)?;
        let config = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml_str(&text)?,
            Some("ron") => Self::from_ron_str(&text)?,
            other => {
                return Err(XRacerError::UnsupportedFormat(other.unwrap_or("").to_string()).into())
            },
        };
        info!(
            "Loaded level from {} ({} blocks, {} sections)",
            path.display(),
            config.blocks.len(),
            config.sections.len()
        );
        Ok(config)
    }

    /// Serializes to pretty TOML.
    pub fn to_toml_string(&self) -> LevelResult<String> {
        toml::to_string_pretty(self).map_err(|e| {
            LevelError::Load(XRacerError::Parse {
                format: "toml",
                message: e.to_string(),
            })
        })
    }

    /// Validates the configuration and builds the runtime level.
    pub fn build(&self) -> LevelResult<Level> {
        let settings = StreamerSettings {
            horizon_dist: self.horizon_dist,
            horizon_width: self.horizon_width,
            block_size: self.block_size,
        };
        settings.validate()?;

        let mut catalog = BlockCatalog::new();
        for block in &self.blocks {
            let spawn_slots = block
                .spawn_slots
                .iter()
                .map(|slot| SpawnSlot {
                    offset: Vec3::from_array(slot.offset),
                    rotation: Quat::from_rotation_y(slot.yaw_degrees.to_radians()),
                })
                .collect();
            catalog.insert(BlockType {
                name: block.name.clone(),
                spawn_slots,
            })?;
        }

        let sections = self
            .sections
            .iter()
            .enumerate()
            .map(|(index, section)| {
                let label = if section.name.is_empty() {
                    format!("#{index}")
                } else {
                    section.name.clone()
                };
                build_section(section, &catalog, settings.block_size)
                    .map_err(|e| e.in_section(label))
            })
            .collect::<LevelResult<Vec<_>>>()?;

        let sections = SectionQueue::new(sections, self.start_section_index)?;
        Level::new(settings, catalog, sections, self.menu_scroll_speed)
    }
}

fn build_section(
    config: &SectionConfig,
    catalog: &BlockCatalog,
    block_size: f32,
) -> LevelResult<Section> {
    let generator: SectionGenerator = match &config.generator {
        GeneratorConfig::Constant {
            block,
            length,
            infinite,
        } => {
            let block = catalog.resolve(block)?;
            if *infinite {
                ConstantGenerator::infinite(block).into()
            } else {
                ConstantGenerator::new(block, *length)?.into()
            }
        },
        GeneratorConfig::Random {
            blocks,
            length,
            randomize_x,
        } => RandomPickGenerator::new(catalog.resolve_all(blocks)?, *length, block_size)?
            .with_lateral_jitter(*randomize_x)
            .into(),
        GeneratorConfig::Sequence {
            blocks,
            rows_per_block,
            repeats,
        } => SequenceGenerator::new(catalog.resolve_all(blocks)?, *rows_per_block, *repeats)?
            .into(),
    };

    debug!("Section '{}': {} generator", config.name, generator.variant_name());
    let mut section = Section::new(config.name.clone(), generator).with_effects(config.effects.clone());
    if let Some(spawner) = &config.powerups {
        section = section.with_spawner(PowerupSpawner::new(
            spawner.frequency,
            spawner.powerups.clone(),
        )?);
    }
    Ok(section)
}

/// A validated level, ready to stream.
#[derive(Debug, Clone)]
pub struct Level {
    pub(crate) settings: StreamerSettings,
    pub(crate) catalog: BlockCatalog,
    pub(crate) sections: SectionQueue,
    pub(crate) menu_scroll_speed: f32,
}

impl Level {
    /// Assembles a level from already-built parts.
    pub fn new(
        settings: StreamerSettings,
        catalog: BlockCatalog,
        sections: SectionQueue,
        menu_scroll_speed: f32,
    ) -> LevelResult<Self> {
        settings.validate()?;
        Ok(Self {
            settings,
            catalog,
            sections,
            menu_scroll_speed,
        })
    }

    /// Loads and validates a level file.
    pub fn load<P: AsRef<Path>>(path: P) -> LevelResult<Self> {
        LevelConfig::load(path)?.build()
    }

    /// Window geometry.
    #[must_use]
    pub fn settings(&self) -> &StreamerSettings {
        &self.settings
    }

    /// Block catalog.
    #[must_use]
    pub fn catalog(&self) -> &BlockCatalog {
        &self.catalog
    }

    /// Section queue.
    #[must_use]
    pub fn sections(&self) -> &SectionQueue {
        &self.sections
    }

    /// Scroll speed used while the menus are shown.
    #[must_use]
    pub fn menu_scroll_speed(&self) -> f32 {
        self.menu_scroll_speed
    }
}
