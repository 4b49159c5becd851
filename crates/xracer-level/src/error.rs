//! Level configuration errors.
//!
//! Everything here is raised while a level is being loaded. A streamer built
//! from a validated [`Level`](crate::Level) has no failure modes of its own.

use thiserror::Error;
use xracer_common::XRacerError;

/// Level errors.
#[derive(Debug, Error)]
pub enum LevelError {
    /// The level file could not be read or parsed
    #[error("Failed to load level: {0}")]
    Load(#[from] XRacerError),

    /// The section list is empty
    #[error("Level has no sections")]
    NoSections,

    /// The start section does not exist
    #[error("Start section index {index} out of range (level has {len} sections)")]
    StartSectionOutOfRange {
        /// Configured start index
        index: usize,
        /// Number of sections
        len: usize,
    },

    /// A size or distance that must be positive is not
    #[error("{field} must be positive, got {value}")]
    NonPositive {
        /// Offending setting
        field: &'static str,
        /// Configured value
        value: f32,
    },

    /// A size or distance is infinite
    #[error("{field} must be finite, got {value}")]
    NonFinite {
        /// Offending setting
        field: &'static str,
        /// Configured value
        value: f32,
    },

    /// The horizon asks for more live blocks than the streamer will hold
    #[error(
        "Horizon {horizon_dist}x{horizon_width} with block size {block_size} needs more than {limit} live blocks"
    )]
    WindowTooLarge {
        /// Configured horizon distance
        horizon_dist: f32,
        /// Configured horizon width
        horizon_width: f32,
        /// Configured block size
        block_size: f32,
        /// Largest window allowed
        limit: usize,
    },

    /// Two block types share a name
    #[error("Duplicate block type '{0}'")]
    DuplicateBlock(String),

    /// A generator refers to a block type that is not in the catalog
    #[error("Unknown block type '{0}'")]
    UnknownBlock(String),

    /// A generator has nothing to pick from
    #[error("Generator has an empty block list")]
    EmptyBlockSet,

    /// A row or repeat count is zero
    #[error("{field} must be at least 1")]
    ZeroCount {
        /// Offending setting
        field: &'static str,
    },

    /// Powerup frequency is not a probability
    #[error("Powerup frequency must be within [0, 1], got {0}")]
    InvalidFrequency(f32),

    /// A powerup spawner has no powerups to choose from
    #[error("Powerup spawner has no powerup types")]
    EmptyPowerupSet,

    /// Error raised while building a named section
    #[error("Section '{name}': {source}")]
    Section {
        /// Section name (or its index when unnamed)
        name: String,
        /// Underlying error
        #[source]
        source: Box<LevelError>,
    },
}

impl LevelError {
    /// Attaches a section name to this error.
    #[must_use]
    pub fn in_section(self, name: impl Into<String>) -> Self {
        Self::Section {
            name: name.into(),
            source: Box::new(self),
        }
    }
}

/// Result type for level operations.
pub type LevelResult<T> = Result<T, LevelError>;
