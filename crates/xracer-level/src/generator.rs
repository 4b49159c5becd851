//! Block generators.
//!
//! A generator decides which block type goes where while its section is
//! active. The streamer calls [`BlockGenerator::start_row`] exactly once per
//! row, then [`BlockGenerator::generate_block`] once per lateral slot. Anything
//! decided in `start_row` (jitter, sequence position) holds for the whole row.

use glam::Vec3;
use xracer_common::{BlockKindId, RandomSource};

use crate::error::{LevelError, LevelResult};

/// A block placement produced by a generator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneratedBlock {
    /// Block type to spawn
    pub kind: BlockKindId,
    /// World position of the block origin
    pub position: Vec3,
}

/// Capability shared by all generator variants.
pub trait BlockGenerator {
    /// Called once when a new row starts, before any block of that row.
    fn start_row(&mut self, z: f32, rng: &mut dyn RandomSource);

    /// Picks the block for lateral position `x` of the current row.
    fn generate_block(&mut self, x: f32, z: f32, rng: &mut dyn RandomSource) -> GeneratedBlock;

    /// True once the generator has produced all the rows it was configured for.
    fn is_completed(&self) -> bool;

    /// Clears all counters so the generator can run again.
    fn reset(&mut self);

    /// Rows started since the last reset.
    fn rows_started(&self) -> u32;
}

/// Repeats one block type.
#[derive(Debug, Clone)]
pub struct ConstantGenerator {
    block: BlockKindId,
    length: u32,
    infinite: bool,
    rows: u32,
}

impl ConstantGenerator {
    /// Generates `length` rows of `block`.
    pub fn new(block: BlockKindId, length: u32) -> LevelResult<Self> {
        if length == 0 {
            return Err(LevelError::ZeroCount { field: "length" });
        }
        Ok(Self {
            block,
            length,
            infinite: false,
            rows: 0,
        })
    }

    /// Generates `block` forever; the section never completes.
    #[must_use]
    pub fn infinite(block: BlockKindId) -> Self {
        Self {
            block,
            length: 0,
            infinite: true,
            rows: 0,
        }
    }
}

impl BlockGenerator for ConstantGenerator {
    fn start_row(&mut self, _z: f32, _rng: &mut dyn RandomSource) {
        self.rows += 1;
    }

    fn generate_block(&mut self, x: f32, z: f32, _rng: &mut dyn RandomSource) -> GeneratedBlock {
        GeneratedBlock {
            kind: self.block,
            position: Vec3::new(x, 0.0, z),
        }
    }

    fn is_completed(&self) -> bool {
        !self.infinite && self.rows >= self.length
    }

    fn reset(&mut self) {
        self.rows = 0;
    }

    fn rows_started(&self) -> u32 {
        self.rows
    }
}

/// Number of jitter steps per block width.
const JITTER_STEPS: i32 = 16;

/// Picks a random block type for every slot.
#[derive(Debug, Clone)]
pub struct RandomPickGenerator {
    blocks: Vec<BlockKindId>,
    length: u32,
    randomize_x: bool,
    block_size: f32,
    rows: u32,
    row_x_offset: f32,
}

impl RandomPickGenerator {
    /// Generates `length` rows picked from `blocks`.
    pub fn new(blocks: Vec<BlockKindId>, length: u32, block_size: f32) -> LevelResult<Self> {
        if blocks.is_empty() {
            return Err(LevelError::EmptyBlockSet);
        }
        if length == 0 {
            return Err(LevelError::ZeroCount { field: "length" });
        }
        Ok(Self {
            blocks,
            length,
            randomize_x: false,
            block_size,
            rows: 0,
            row_x_offset: 0.0,
        })
    }

    /// Enables per-row lateral jitter in steps of 1/16 block.
    #[must_use]
    pub fn with_lateral_jitter(mut self, enabled: bool) -> Self {
        self.randomize_x = enabled;
        self
    }

    /// Lateral offset applied to the current row.
    #[must_use]
    pub fn row_x_offset(&self) -> f32 {
        self.row_x_offset
    }
}

impl BlockGenerator for RandomPickGenerator {
    fn start_row(&mut self, _z: f32, rng: &mut dyn RandomSource) {
        self.row_x_offset = if self.randomize_x {
            let half = JITTER_STEPS / 2;
            self.block_size * (rng.range_i32(-half, half) as f32 / JITTER_STEPS as f32)
        } else {
            0.0
        };
        self.rows += 1;
    }

    fn generate_block(&mut self, x: f32, z: f32, rng: &mut dyn RandomSource) -> GeneratedBlock {
        let kind = self.blocks[rng.index(self.blocks.len())];
        GeneratedBlock {
            kind,
            position: Vec3::new(x + self.row_x_offset, 0.0, z),
        }
    }

    fn is_completed(&self) -> bool {
        self.rows >= self.length
    }

    fn reset(&mut self) {
        self.rows = 0;
        self.row_x_offset = 0.0;
    }

    fn rows_started(&self) -> u32 {
        self.rows
    }
}

/// Walks an ordered list of block types, `rows_per_block` rows each.
#[derive(Debug, Clone)]
pub struct SequenceGenerator {
    sequence: Vec<BlockKindId>,
    rows_per_block: u32,
    repeats: u32,
    sequence_index: usize,
    block_count: u32,
    loops: u32,
    current: usize,
    rows: u32,
}

impl SequenceGenerator {
    /// Walks `sequence` `repeats` times.
    pub fn new(sequence: Vec<BlockKindId>, rows_per_block: u32, repeats: u32) -> LevelResult<Self> {
        if sequence.is_empty() {
            return Err(LevelError::EmptyBlockSet);
        }
        if rows_per_block == 0 {
            return Err(LevelError::ZeroCount {
                field: "rows_per_block",
            });
        }
        if repeats == 0 {
            return Err(LevelError::ZeroCount { field: "repeats" });
        }
        Ok(Self {
            sequence,
            rows_per_block,
            repeats,
            sequence_index: 0,
            block_count: 0,
            loops: 0,
            current: 0,
            rows: 0,
        })
    }

    /// Full passes over the sequence completed so far.
    #[must_use]
    pub fn loops(&self) -> u32 {
        self.loops
    }

    /// Block type used by the current row.
    #[must_use]
    pub fn current_block(&self) -> BlockKindId {
        self.sequence[self.current]
    }
}

impl BlockGenerator for SequenceGenerator {
    fn start_row(&mut self, _z: f32, _rng: &mut dyn RandomSource) {
        // the row uses the item active at its start; counters move on afterwards
        self.current = self.sequence_index;
        self.rows += 1;
        self.block_count += 1;
        if self.block_count == self.rows_per_block {
            self.block_count = 0;
            self.sequence_index += 1;
            if self.sequence_index == self.sequence.len() {
                self.sequence_index = 0;
                self.loops += 1;
            }
        }
    }

    fn generate_block(&mut self, x: f32, z: f32, _rng: &mut dyn RandomSource) -> GeneratedBlock {
        GeneratedBlock {
            kind: self.sequence[self.current],
            position: Vec3::new(x, 0.0, z),
        }
    }

    fn is_completed(&self) -> bool {
        self.loops >= self.repeats
    }

    fn reset(&mut self) {
        self.sequence_index = 0;
        self.block_count = 0;
        self.loops = 0;
        self.current = 0;
        self.rows = 0;
    }

    fn rows_started(&self) -> u32 {
        self.rows
    }
}

/// Generator variant selected when the level is loaded.
#[derive(Debug, Clone)]
pub enum SectionGenerator {
    /// One block type, fixed length or infinite
    Constant(ConstantGenerator),
    /// Uniform random pick per slot
    RandomPick(RandomPickGenerator),
    /// Fixed ordered sequence
    FixedSequence(SequenceGenerator),
}

impl SectionGenerator {
    fn inner(&self) -> &dyn BlockGenerator {
        match self {
            Self::Constant(g) => g,
            Self::RandomPick(g) => g,
            Self::FixedSequence(g) => g,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn BlockGenerator {
        match self {
            Self::Constant(g) => g,
            Self::RandomPick(g) => g,
            Self::FixedSequence(g) => g,
        }
    }

    /// Short name of the variant, for logs.
    #[must_use]
    pub fn variant_name(&self) -> &'static str {
        match self {
            Self::Constant(_) => "constant",
            Self::RandomPick(_) => "random",
            Self::FixedSequence(_) => "sequence",
        }
    }
}

impl BlockGenerator for SectionGenerator {
    fn start_row(&mut self, z: f32, rng: &mut dyn RandomSource) {
        self.inner_mut().start_row(z, rng);
    }

    fn generate_block(&mut self, x: f32, z: f32, rng: &mut dyn RandomSource) -> GeneratedBlock {
        self.inner_mut().generate_block(x, z, rng)
    }

    fn is_completed(&self) -> bool {
        self.inner().is_completed()
    }

    fn reset(&mut self) {
        self.inner_mut().reset();
    }

    fn rows_started(&self) -> u32 {
        self.inner().rows_started()
    }
}

impl From<ConstantGenerator> for SectionGenerator {
    fn from(g: ConstantGenerator) -> Self {
        Self::Constant(g)
    }
}

impl From<RandomPickGenerator> for SectionGenerator {
    fn from(g: RandomPickGenerator) -> Self {
        Self::RandomPick(g)
    }
}

impl From<SequenceGenerator> for SectionGenerator {
    fn from(g: SequenceGenerator) -> Self {
        Self::FixedSequence(g)
    }
}
