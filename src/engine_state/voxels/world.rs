//! # World Module
//!
//! This module provides the `World` struct: a fully resident chunk grid with
//! no streaming, no GPU state and no worker threads.
//!
//! The engine itself streams chunks through [`ChunksManager`](super::ChunksManager);
//! `World` is for small hand-built or pre-generated grids, such as scripted
//! scenes and tests of the collision code.
//!
//! ## Performance Considerations
//!
//! - Chunks are stored sparsely in a hash map keyed by chunk index, so a
//!   large grid only costs memory for the chunks actually inserted
//! - Chunk lookup is O(1)

use std::collections::HashMap;

use cgmath::Vector3;

use super::block::Block;
use super::chunk::{Chunk, TerrainParams, CHUNK_DIMENSION_Y};
use super::{
    chunk_index_of_block, local_of_block, ChunkIndex, ChunkSource, GridExtent, WorldBounds,
};

/// A voxel world whose chunks all live in memory.
///
/// # Examples
///
/// ```
/// use cgmath::{Vector2, Vector3};
/// use voxel_world::engine_state::voxels::{block::Block, chunk::Chunk, ChunkSource, World};
///
/// let mut world = World::new(1, 1, 2);
/// let mut chunk = Chunk::create_void();
/// chunk.fill_layers(0, 3, Block::Stone);
/// world.insert_chunk(Vector2::new(0, 0), chunk);
///
/// assert_eq!(world.block_at(Vector3::new(5, 3, 5)), Block::Stone);
/// assert_eq!(world.block_at(Vector3::new(5, 4, 5)), Block::Air);
/// ```
#[derive(Debug, Clone)]
pub struct World {
    bounds: WorldBounds,
    chunks: HashMap<ChunkIndex, Chunk>,
}

impl World {
    /// Creates an empty world of `chunk_count_x × chunk_count_z` chunks.
    ///
    /// # Arguments
    /// * `edge_margin` - Blocks on each horizontal side that lie outside the playable region
    pub fn new(chunk_count_x: u32, chunk_count_z: u32, edge_margin: i32) -> Self {
        World {
            bounds: WorldBounds::new(GridExtent::new(chunk_count_x, chunk_count_z), edge_margin),
            chunks: HashMap::new(),
        }
    }

    /// Creates a world with every chunk generated from noise.
    pub fn generated(
        chunk_count_x: u32,
        chunk_count_z: u32,
        edge_margin: i32,
        params: &TerrainParams,
    ) -> Self {
        let mut world = Self::new(chunk_count_x, chunk_count_z, edge_margin);
        for cx in 0..chunk_count_x as i32 {
            for cz in 0..chunk_count_z as i32 {
                let index = ChunkIndex::new(cx, cz);
                world.chunks.insert(index, Chunk::create_from_noise(index, params));
            }
        }
        world
    }

    /// Stores `chunk` at `chunk_index`, replacing any previous chunk.
    ///
    /// # Returns
    /// `false`, without storing anything, if the index lies outside the grid.
    pub fn insert_chunk(&mut self, chunk_index: ChunkIndex, chunk: Chunk) -> bool {
        if !self.bounds.extent.contains(chunk_index) {
            return false;
        }
        self.chunks.insert(chunk_index, chunk);
        true
    }

    pub fn get_chunk(&self, chunk_index: ChunkIndex) -> Option<&Chunk> {
        self.chunks.get(&chunk_index)
    }

    pub fn get_chunk_mut(&mut self, chunk_index: ChunkIndex) -> Option<&mut Chunk> {
        self.chunks.get_mut(&chunk_index)
    }

    /// Sets the block at world position `block`.
    ///
    /// # Returns
    /// `false` if the position has no resident chunk or lies above or below it.
    pub fn set_block(&mut self, block: Vector3<i32>, value: Block) -> bool {
        if !(0..CHUNK_DIMENSION_Y).contains(&block.y) {
            return false;
        }
        let local = local_of_block(block);
        match self.chunks.get_mut(&chunk_index_of_block(block)) {
            Some(chunk) => {
                chunk.set_at(local, value);
                true
            }
            None => false,
        }
    }
}

impl ChunkSource for World {
    fn world_bounds(&self) -> WorldBounds {
        self.bounds
    }

    fn with_chunk<R>(&self, chunk_index: ChunkIndex, f: impl FnOnce(&Chunk) -> R) -> Option<R> {
        self.chunks.get(&chunk_index).map(f)
    }
}
