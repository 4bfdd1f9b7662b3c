//! Block-level world access

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::math::{BlockPos, ChunkPos};

/// State name treated as empty space
pub const AIR: &str = "air";

/// Source and sink of block states keyed by lattice position
pub trait WorldAccessor {
    /// State at `pos`, `None` for air
    fn block_at(&self, pos: BlockPos) -> Option<String>;
    fn set_block_state(&mut self, pos: BlockPos, state: &str, nbt: Option<&serde_json::Value>);
    /// Y of the topmost non-air block in the column
    fn highest_block_y_at(&self, x: i32, z: i32) -> Option<i32>;
    fn is_chunk_loaded(&self, chunk: ChunkPos) -> bool;
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlacedBlock {
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbt: Option<serde_json::Value>,
}

/// Sparse world held in memory; every chunk is loaded unless restricted
#[derive(Clone, Debug, Default)]
pub struct InMemoryWorld {
    blocks: BTreeMap<BlockPos, PlacedBlock>,
    loaded: Option<BTreeSet<ChunkPos>>,
}

impl InMemoryWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// World where only `chunks` report as loaded
    pub fn with_loaded_chunks(chunks: impl IntoIterator<Item = ChunkPos>) -> Self {
        Self { blocks: BTreeMap::new(), loaded: Some(chunks.into_iter().collect()) }
    }

    pub fn load_chunk(&mut self, chunk: ChunkPos) {
        if let Some(loaded) = &mut self.loaded {
            loaded.insert(chunk);
        }
    }

    /// Fill a horizontal layer at `y` over the inclusive x/z ranges
    pub fn fill_layer(&mut self, min: (i32, i32), max: (i32, i32), y: i32, state: &str) {
        for x in min.0..=max.0 {
            for z in min.1..=max.1 {
                self.set_block_state(BlockPos::new(x, y, z), state, None);
            }
        }
    }

    pub fn get(&self, pos: BlockPos) -> Option<&PlacedBlock> {
        self.blocks.get(&pos)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&BlockPos, &PlacedBlock)> {
        self.blocks.iter()
    }
}

impl WorldAccessor for InMemoryWorld {
    fn block_at(&self, pos: BlockPos) -> Option<String> {
        self.blocks.get(&pos).map(|b| b.state.clone())
    }

    fn set_block_state(&mut self, pos: BlockPos, state: &str, nbt: Option<&serde_json::Value>) {
        if state == AIR {
            self.blocks.remove(&pos);
        } else {
            self.blocks.insert(pos, PlacedBlock { state: state.to_string(), nbt: nbt.cloned() });
        }
    }

    fn highest_block_y_at(&self, x: i32, z: i32) -> Option<i32> {
        self.blocks.keys().filter(|p| p.x == x && p.z == z).map(|p| p.y).max()
    }

    fn is_chunk_loaded(&self, chunk: ChunkPos) -> bool {
        self.loaded.as_ref().is_none_or(|loaded| loaded.contains(&chunk))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_read() {
        let mut world = InMemoryWorld::new();
        world.set_block_state(BlockPos::new(1, 5, 1), "stone", None);
        world.set_block_state(BlockPos::new(1, 9, 1), "log", Some(&serde_json::json!({"axis": "y"})));
        assert_eq!(world.block_at(BlockPos::new(1, 5, 1)).as_deref(), Some("stone"));
        assert_eq!(world.highest_block_y_at(1, 1), Some(9));
        assert_eq!(world.highest_block_y_at(0, 0), None);

        world.set_block_state(BlockPos::new(1, 9, 1), AIR, None);
        assert_eq!(world.highest_block_y_at(1, 1), Some(5));
        assert_eq!(world.len(), 1);
    }

    #[test]
    fn test_loaded_chunks() {
        assert!(InMemoryWorld::new().is_chunk_loaded(ChunkPos::new(100, -3)));
        let mut world = InMemoryWorld::with_loaded_chunks([ChunkPos::new(0, 0)]);
        assert!(world.is_chunk_loaded(ChunkPos::new(0, 0)));
        assert!(!world.is_chunk_loaded(ChunkPos::new(1, 0)));
        world.load_chunk(ChunkPos::new(1, 0));
        assert!(world.is_chunk_loaded(ChunkPos::new(1, 0)));
    }

    #[test]
    fn test_fill_layer() {
        let mut world = InMemoryWorld::new();
        world.fill_layer((0, 0), (3, 2), 60, "grass");
        assert_eq!(world.len(), 12);
        assert_eq!(world.highest_block_y_at(3, 2), Some(60));
    }
}
