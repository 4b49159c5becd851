//! Live blocks owned by the streamer.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec3;
use xracer_common::{BlockId, BlockKindId};

use crate::powerup::PowerupPlacement;

/// A spawned block of world geometry.
///
/// Owned by the streamer from creation until eviction. Positions are in world
/// space relative to the stationary player.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    /// Unique handle
    pub id: BlockId,
    /// Block type
    pub kind: BlockKindId,
    /// World position of the block origin
    pub position: Vec3,
    /// Index of the section that generated this block
    pub section: usize,
    /// Streamer tick the block was created on
    pub created_tick: u64,
    /// Powerup waiting in this block, if any
    pub powerup: Option<PowerupPlacement>,
}

impl Block {
    /// World position of the attached powerup.
    #[must_use]
    pub fn powerup_position(&self) -> Option<Vec3> {
        self.powerup.as_ref().map(|p| self.position + p.offset)
    }
}

/// Receives block lifecycle side effects (rendering, collision).
pub trait WorldSink {
    /// A block entered the world.
    fn block_spawned(&mut self, _block: &Block) {}

    /// A powerup was placed in a freshly spawned block.
    fn powerup_spawned(&mut self, _block: &Block, _placement: &PowerupPlacement) {}

    /// A block left the world and its geometry should be destroyed.
    fn block_despawned(&mut self, _block: &Block) {}

    /// The powerup of a live block was collected.
    fn powerup_collected(&mut self, _block: &Block, _placement: &PowerupPlacement) {}
}

/// Sink that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl WorldSink for NullSink {}

/// One callback seen by a [`RecordingSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkEvent {
    /// `block_spawned`
    BlockSpawned(BlockId),
    /// `powerup_spawned`, with the slot index
    PowerupSpawned(BlockId, usize),
    /// `block_despawned`
    BlockDespawned(BlockId),
    /// `powerup_collected`
    PowerupCollected(BlockId),
}

/// Sink that logs every callback into a shared list.
///
/// Clones share the same list, so one clone can be handed to the streamer
/// while another is kept for inspection.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Rc<RefCell<Vec<SinkEvent>>>,
}

impl RecordingSink {
    /// Creates an empty recording.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far.
    #[must_use]
    pub fn events(&self) -> Vec<SinkEvent> {
        self.events.borrow().clone()
    }

    /// Number of recorded events matching `filter`.
    #[must_use]
    pub fn count(&self, filter: impl Fn(&SinkEvent) -> bool) -> usize {
        self.events.borrow().iter().filter(|e| filter(e)).count()
    }

    /// Forgets everything recorded so far.
    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl WorldSink for RecordingSink {
    fn block_spawned(&mut self, block: &Block) {
        self.events.borrow_mut().push(SinkEvent::BlockSpawned(block.id));
    }

    fn powerup_spawned(&mut self, block: &Block, placement: &PowerupPlacement) {
        self.events
            .borrow_mut()
            .push(SinkEvent::PowerupSpawned(block.id, placement.slot));
    }

    fn block_despawned(&mut self, block: &Block) {
        self.events.borrow_mut().push(SinkEvent::BlockDespawned(block.id));
    }

    fn powerup_collected(&mut self, block: &Block, _placement: &PowerupPlacement) {
        self.events
            .borrow_mut()
            .push(SinkEvent::PowerupCollected(block.id));
    }
}
