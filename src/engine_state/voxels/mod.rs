//! # Voxel World
//!
//! This module contains the block world: what a block is, how blocks are
//! grouped into chunks, how chunks are addressed, and who owns them.
//!
//! ## Architecture
//!
//! * **Block**: The closed set of block kinds and the six cube faces
//! * **Chunk**: A fixed 16x256x16 array of blocks, with height scans and noise generation
//! * **World**: A plain in-memory chunk grid, useful for tools and tests
//! * **ChunksManager**: The streaming owner of the chunk grid used by the engine
//! * **Tasks**: Background chunk generation
//!
//! ## Coordinates
//!
//! The world is a 2-D grid of `chunk_count_x × chunk_count_z` chunks. Chunk
//! `(0, 0)` holds world blocks `x, z ∈ [0, 16)`. World block `(bx, by, bz)`
//! lives in chunk `(⌊bx/16⌋, ⌊bz/16⌋)` at local `(bx mod 16, by, bz mod 16)`.
//! A block with integer coordinates `b` occupies the unit cube centred on `b`,
//! i.e. `[b - 0.5, b + 0.5]` on every axis.
//!
//! Anything that needs to read blocks does so through [`ChunkSource`], so the
//! collision and picking code runs unchanged against a [`World`] or a
//! [`ChunksManager`].

use cgmath::{Vector2, Vector3};

use block::Block;
use chunk::{Chunk, CHUNK_DIMENSION_X, CHUNK_DIMENSION_Y, CHUNK_DIMENSION_Z};

pub mod block;
pub mod chunk;
pub mod chunks_manager;
pub mod generation_state;
pub mod tasks;
pub mod world;

pub use chunks_manager::ChunksManager;
pub use generation_state::ChunkGenerationState;
pub use world::World;

/// Chunk coordinates `(cx, cz)`; `y` of the vector holds `cz`.
pub type ChunkIndex = Vector2<i32>;

/// Chunk holding world block `block`.
pub fn chunk_index_of_block(block: Vector3<i32>) -> ChunkIndex {
    Vector2::new(
        block.x.div_euclid(CHUNK_DIMENSION_X),
        block.z.div_euclid(CHUNK_DIMENSION_Z),
    )
}

/// Position of world block `block` inside its chunk.
pub fn local_of_block(block: Vector3<i32>) -> Vector3<i32> {
    Vector3::new(
        block.x.rem_euclid(CHUNK_DIMENSION_X),
        block.y,
        block.z.rem_euclid(CHUNK_DIMENSION_Z),
    )
}

/// World block coordinates of `local` inside chunk `chunk_index`.
pub fn block_of_local(chunk_index: ChunkIndex, local: Vector3<i32>) -> Vector3<i32> {
    chunk_origin(chunk_index) + local
}

/// World block coordinates of the chunk's (0, 0, 0) cell.
///
/// # Panics
/// If the chunk lies too far out for its blocks to be addressed with `i32`.
pub fn chunk_origin(chunk_index: ChunkIndex) -> Vector3<i32> {
    match (
        chunk_index.x.checked_mul(CHUNK_DIMENSION_X),
        chunk_index.y.checked_mul(CHUNK_DIMENSION_Z),
    ) {
        (Some(x), Some(z)) => Vector3::new(x, 0, z),
        _ => panic!(
            "chunk ({}, {}) is outside the addressable world",
            chunk_index.x, chunk_index.y
        ),
    }
}

/// Size of the chunk grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridExtent {
    pub chunk_count_x: i32,
    pub chunk_count_z: i32,
}

impl GridExtent {
    pub fn new(chunk_count_x: u32, chunk_count_z: u32) -> Self {
        Self {
            chunk_count_x: chunk_count_x as i32,
            chunk_count_z: chunk_count_z as i32,
        }
    }

    pub fn contains(&self, chunk_index: ChunkIndex) -> bool {
        (0..self.chunk_count_x).contains(&chunk_index.x)
            && (0..self.chunk_count_z).contains(&chunk_index.y)
    }

    /// Row-major slot of `chunk_index`, or `None` outside the grid.
    pub fn slot_of(&self, chunk_index: ChunkIndex) -> Option<usize> {
        self.contains(chunk_index)
            .then(|| (chunk_index.x * self.chunk_count_z + chunk_index.y) as usize)
    }

    pub fn chunk_count(&self) -> usize {
        (self.chunk_count_x * self.chunk_count_z) as usize
    }
}

/// The playable region: the chunk grid minus `margin` blocks on each
/// horizontal side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorldBounds {
    pub extent: GridExtent,
    pub margin: i32,
}

impl WorldBounds {
    pub fn new(extent: GridExtent, margin: i32) -> Self {
        Self { extent, margin }
    }

    /// Whether `block` lies inside the playable region.
    ///
    /// `x` and `z` must satisfy `margin <= b < 16 * N - margin`. `y` is clamped
    /// into the chunk height rather than rejected, matching the floor and
    /// ceiling scans, so it never makes a position fall outside the bounds.
    pub fn contains(&self, block: Vector3<i32>) -> bool {
        let max_x = CHUNK_DIMENSION_X * self.extent.chunk_count_x - self.margin;
        let max_z = CHUNK_DIMENSION_Z * self.extent.chunk_count_z - self.margin;
        (self.margin..max_x).contains(&block.x) && (self.margin..max_z).contains(&block.z)
    }
}

/// Read access to a chunk grid.
pub trait ChunkSource {
    /// The grid size and playable region.
    fn world_bounds(&self) -> WorldBounds;

    /// Runs `f` on the chunk at `chunk_index`.
    ///
    /// Returns `None` for chunks outside the grid and for chunks whose blocks
    /// are not available yet.
    fn with_chunk<R>(&self, chunk_index: ChunkIndex, f: impl FnOnce(&Chunk) -> R) -> Option<R>;

    /// Block at world position `block`. Anything outside the grid, above or
    /// below the chunk height, or not generated yet reads as air.
    fn block_at(&self, block: Vector3<i32>) -> Block {
        if !(0..CHUNK_DIMENSION_Y).contains(&block.y) {
            return Block::Air;
        }
        let local = local_of_block(block);
        self.with_chunk(chunk_index_of_block(block), |chunk| chunk.get_at(local))
            .unwrap_or(Block::Air)
    }

    fn is_inside_world_bounds(&self, block: Vector3<i32>) -> bool {
        self.world_bounds().contains(block)
    }
}
