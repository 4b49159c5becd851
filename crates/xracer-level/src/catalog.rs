//! Block types and the catalog they are registered in.

use ahash::AHashMap;
use glam::{Quat, Vec3};
use xracer_common::BlockKindId;

use crate::error::{LevelError, LevelResult};

/// A place inside a block where a powerup may be spawned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnSlot {
    /// Offset from the block origin
    pub offset: Vec3,
    /// Orientation of a powerup spawned here
    pub rotation: Quat,
}

impl SpawnSlot {
    /// Creates a slot at `offset` with no rotation.
    #[must_use]
    pub fn at(offset: Vec3) -> Self {
        Self {
            offset,
            rotation: Quat::IDENTITY,
        }
    }
}

/// One kind of block geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockType {
    /// Name used by generators to refer to this block
    pub name: String,
    /// Valid powerup spawn slots
    pub spawn_slots: Vec<SpawnSlot>,
}

impl BlockType {
    /// Creates a block type without spawn slots.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            spawn_slots: Vec::new(),
        }
    }

    /// Adds a spawn slot.
    #[must_use]
    pub fn with_slot(mut self, slot: SpawnSlot) -> Self {
        self.spawn_slots.push(slot);
        self
    }
}

/// All block types of a level, indexed by [`BlockKindId`].
#[derive(Debug, Clone, Default)]
pub struct BlockCatalog {
    types: Vec<BlockType>,
    by_name: AHashMap<String, BlockKindId>,
}

impl BlockCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a block type, rejecting duplicate names.
    pub fn insert(&mut self, block: BlockType) -> LevelResult<BlockKindId> {
        if self.by_name.contains_key(&block.name) {
            return Err(LevelError::DuplicateBlock(block.name));
        }
        let id = BlockKindId::new(self.types.len() as u16);
        self.by_name.insert(block.name.clone(), id);
        self.types.push(block);
        Ok(id)
    }

    /// Looks up a block type by id.
    #[must_use]
    pub fn get(&self, id: BlockKindId) -> Option<&BlockType> {
        self.types.get(id.index())
    }

    /// Resolves a block name.
    pub fn resolve(&self, name: &str) -> LevelResult<BlockKindId> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| LevelError::UnknownBlock(name.to_string()))
    }

    /// Resolves a list of block names.
    pub fn resolve_all(&self, names: &[String]) -> LevelResult<Vec<BlockKindId>> {
        names.iter().map(|name| self.resolve(name)).collect()
    }

    /// Number of registered block types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns true if no block types are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_resolve() {
        let mut catalog = BlockCatalog::new();
        let floor = catalog.insert(BlockType::new("floor")).expect("insert");
        let pillar = catalog.insert(BlockType::new("pillar")).expect("insert");

        assert_ne!(floor, pillar);
        assert_eq!(catalog.resolve("pillar").expect("resolve"), pillar);
        assert_eq!(catalog.get(floor).map(|b| b.name.as_str()), Some("floor"));
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut catalog = BlockCatalog::new();
        catalog.insert(BlockType::new("floor")).expect("insert");
        let err = catalog.insert(BlockType::new("floor"));
        assert!(matches!(err, Err(LevelError::DuplicateBlock(name)) if name == "floor"));
    }

    #[test]
    fn test_unknown_name() {
        let catalog = BlockCatalog::new();
        assert!(matches!(
            catalog.resolve("missing"),
            Err(LevelError::UnknownBlock(_))
        ));
    }
}
