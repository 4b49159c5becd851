//! Powerup kinds and their placement inside freshly generated blocks.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use tracing::warn;
use xracer_common::RandomSource;

use crate::catalog::BlockType;
use crate::error::{LevelError, LevelResult};

/// Temporarily raises the player's speed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedBoost {
    /// Speed multiplier while boosted
    pub boost: f32,
    /// Seconds at full boost
    pub duration: f32,
    /// Seconds to ramp up
    pub fade_in: f32,
    /// Seconds to ramp back down
    pub fade_out: f32,
    /// Credits awarded on collection
    pub credits: u32,
    /// On-screen text
    pub info_text: String,
}

impl Default for SpeedBoost {
    fn default() -> Self {
        Self {
            boost: 1.3,
            duration: 2.0,
            fade_in: 0.5,
            fade_out: 1.0,
            credits: 500,
            info_text: "Speed Boost".to_string(),
        }
    }
}

/// Temporarily slows the player down.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlowMotion {
    /// Speed multiplier while slowed
    pub factor: f32,
    /// Seconds at full effect
    pub duration: f32,
    /// Seconds to ramp in and out
    pub fade: f32,
    /// Credits awarded on collection
    pub credits: u32,
    /// On-screen text
    pub info_text: String,
}

impl Default for SlowMotion {
    fn default() -> Self {
        Self {
            factor: 0.4,
            duration: 2.0,
            fade: 0.4,
            credits: 200,
            info_text: "Slow Motion".to_string(),
        }
    }
}

/// Awards credits and ends immediately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BonusCredits {
    /// Credits awarded on collection
    pub amount: u32,
    /// On-screen text
    pub info_text: String,
}

impl Default for BonusCredits {
    fn default() -> Self {
        Self {
            amount: 500,
            info_text: "Bonus Credits".to_string(),
        }
    }
}

/// A powerup that can be placed in the world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PowerupKind {
    /// See [`SpeedBoost`]
    SpeedBoost(SpeedBoost),
    /// See [`SlowMotion`]
    SlowMotion(SlowMotion),
    /// See [`BonusCredits`]
    BonusCredits(BonusCredits),
}

impl PowerupKind {
    /// On-screen text for this powerup.
    #[must_use]
    pub fn info_text(&self) -> &str {
        match self {
            Self::SpeedBoost(p) => &p.info_text,
            Self::SlowMotion(p) => &p.info_text,
            Self::BonusCredits(p) => &p.info_text,
        }
    }
}

/// A powerup attached to a spawn slot of a live block.
#[derive(Debug, Clone, PartialEq)]
pub struct PowerupPlacement {
    /// Powerup to activate when collected
    pub powerup: PowerupKind,
    /// Index of the slot in the block type
    pub slot: usize,
    /// Offset from the block origin
    pub offset: Vec3,
    /// Orientation of the powerup
    pub rotation: Quat,
}

/// Result of one placement attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum PlacementOutcome {
    /// A powerup was placed
    Placed(PowerupPlacement),
    /// The probability roll failed
    Skipped,
    /// The block declares no spawn slots
    NoSpawnSlots,
}

impl PlacementOutcome {
    /// Returns the placement, if any.
    #[must_use]
    pub fn into_placement(self) -> Option<PowerupPlacement> {
        match self {
            Self::Placed(p) => Some(p),
            Self::Skipped | Self::NoSpawnSlots => None,
        }
    }
}

/// Randomly places powerups inside blocks of one section.
#[derive(Debug, Clone)]
pub struct PowerupSpawner {
    frequency: f32,
    powerups: Vec<PowerupKind>,
}

impl PowerupSpawner {
    /// Places one of `powerups` in each block with probability `frequency`.
    pub fn new(frequency: f32, powerups: Vec<PowerupKind>) -> LevelResult<Self> {
        if !(0.0..=1.0).contains(&frequency) {
            return Err(LevelError::InvalidFrequency(frequency));
        }
        if powerups.is_empty() {
            return Err(LevelError::EmptyPowerupSet);
        }
        Ok(Self {
            frequency,
            powerups,
        })
    }

    /// Placement probability per block.
    #[must_use]
    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Powerups this spawner picks from.
    #[must_use]
    pub fn powerups(&self) -> &[PowerupKind] {
        &self.powerups
    }

    /// Attempts to place a powerup inside a block of type `block`.
    pub fn place(&self, block: &BlockType, rng: &mut dyn RandomSource) -> PlacementOutcome {
        if block.spawn_slots.is_empty() {
            warn!(
                "Attempting to spawn powerup, but no spawn points found in block {}",
                block.name
            );
            return PlacementOutcome::NoSpawnSlots;
        }

        if rng.unit() >= self.frequency {
            return PlacementOutcome::Skipped;
        }

        let slot = rng.index(block.spawn_slots.len());
        let powerup = self.powerups[rng.index(self.powerups.len())].clone();
        let spawn = block.spawn_slots[slot];
        PlacementOutcome::Placed(PowerupPlacement {
            powerup,
            slot,
            offset: spawn.offset,
            rotation: spawn.rotation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SpawnSlot;
    use xracer_common::{FastRandom, SequenceRandom};

    fn block_with_slots(count: usize) -> BlockType {
        let mut block = BlockType::new("ring");
        for i in 0..count {
            block = block.with_slot(SpawnSlot::at(Vec3::new(i as f32, 2.0, 0.0)));
        }
        block
    }

    fn all_kinds() -> Vec<PowerupKind> {
        vec![
            PowerupKind::SpeedBoost(SpeedBoost::default()),
            PowerupKind::SlowMotion(SlowMotion::default()),
            PowerupKind::BonusCredits(BonusCredits::default()),
        ]
    }

    #[test]
    fn test_zero_frequency_never_places() {
        let spawner = PowerupSpawner::new(0.0, all_kinds()).expect("valid");
        let block = block_with_slots(3);
        let mut rng = FastRandom::with_seed(1);
        for _ in 0..10_000 {
            assert!(spawner.place(&block, &mut rng).into_placement().is_none());
        }
    }

    #[test]
    fn test_full_frequency_always_places_one() {
        let spawner = PowerupSpawner::new(1.0, all_kinds()).expect("valid");
        let block = block_with_slots(3);
        let mut rng = FastRandom::with_seed(2);
        for _ in 0..10_000 {
            let placement = spawner.place(&block, &mut rng).into_placement();
            let placement = placement.expect("frequency 1 must place");
            assert!(placement.slot < 3);
            assert_eq!(placement.offset, block.spawn_slots[placement.slot].offset);
        }
    }

    #[test]
    fn test_no_slots_reports_and_skips() {
        let spawner = PowerupSpawner::new(1.0, all_kinds()).expect("valid");
        let block = block_with_slots(0);
        let mut rng = SequenceRandom::constant(0.0);
        assert_eq!(spawner.place(&block, &mut rng), PlacementOutcome::NoSpawnSlots);
        // slots are checked before the roll
        assert_eq!(rng.draws(), 0);
    }

    #[test]
    fn test_slot_and_kind_picked_uniformly() {
        let spawner = PowerupSpawner::new(0.5, all_kinds()).expect("valid");
        let block = block_with_slots(2);
        // roll passes, slot index 1, powerup index 2
        let mut rng = SequenceRandom::new(vec![0.1, 0.75, 0.9]);
        let placement = spawner
            .place(&block, &mut rng)
            .into_placement()
            .expect("roll passes");
        assert_eq!(placement.slot, 1);
        assert!(matches!(placement.powerup, PowerupKind::BonusCredits(_)));

        // roll fails
        let mut rng = SequenceRandom::constant(0.6);
        assert_eq!(spawner.place(&block, &mut rng), PlacementOutcome::Skipped);
    }

    #[test]
    fn test_invalid_spawner_config() {
        assert!(matches!(
            PowerupSpawner::new(1.5, all_kinds()),
            Err(LevelError::InvalidFrequency(_))
        ));
        assert!(matches!(
            PowerupSpawner::new(0.5, Vec::new()),
            Err(LevelError::EmptyPowerupSet)
        ));
    }
}
