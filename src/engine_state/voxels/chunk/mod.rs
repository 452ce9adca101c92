//! # Chunk Module
//!
//! This module provides the `Chunk` struct: a fixed 16x256x16 column of
//! blocks, generated and meshed as a unit.
//!
//! ## Storage
//!
//! Blocks are stored by value in one contiguous boxed slice of
//! `CHUNK_SIZE` entries, laid out x-fastest, then z, then y:
//! `index = x + 16 * (z + 16 * y)`. A full horizontal layer is therefore
//! contiguous, and a height scan at fixed `(x, z)` strides by one layer.
//!
//! ### Performance Characteristics
//! - **Block Lookup**: O(1)
//! - **Height Scan**: O(Y) worst case, O(1) typical since terrain heights
//!   cluster around the middle of the column
//! - **Memory Usage**: `CHUNK_SIZE * 4` bytes per chunk

use cgmath::Vector3;

use super::block::Block;

pub mod chunk_creation;

pub use chunk_creation::TerrainParams;

/// Width of a chunk in blocks (X).
pub const CHUNK_DIMENSION_X: i32 = 16;
/// Height of a chunk in blocks (Y).
pub const CHUNK_DIMENSION_Y: i32 = 256;
/// Depth of a chunk in blocks (Z).
pub const CHUNK_DIMENSION_Z: i32 = 16;
/// The number of blocks in one horizontal layer of a chunk.
pub const CHUNK_LAYER_SIZE: usize = (CHUNK_DIMENSION_X * CHUNK_DIMENSION_Z) as usize;
/// The total number of blocks in a chunk.
pub const CHUNK_SIZE: usize = CHUNK_LAYER_SIZE * CHUNK_DIMENSION_Y as usize;

/// Result of [`Chunk::find_floor_height`] when the column has no solid block.
pub const NO_FLOOR: i32 = -1;
/// Result of [`Chunk::find_ceil_height`] when the column has no solid block.
pub const NO_CEIL: i32 = CHUNK_DIMENSION_Y;

/// A 16x256x16 volume of blocks.
///
/// Coordinates passed to the accessors are local: `x, z ∈ [0, 16)` and
/// `y ∈ [0, 256)`. Out-of-range coordinates are a programming error and panic.
#[derive(Clone, PartialEq, Eq)]
pub struct Chunk {
    blocks: Box<[Block]>,
}

impl std::fmt::Debug for Chunk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let solid = self.blocks.iter().filter(|b| b.is_solid()).count();
        f.debug_struct("Chunk").field("solid_blocks", &solid).finish()
    }
}

impl Chunk {
    /// Creates a chunk where every block is air.
    pub fn create_void() -> Self {
        Chunk {
            blocks: vec![Block::Air; CHUNK_SIZE].into_boxed_slice(),
        }
    }

    /// Whether `(x, y, z)` addresses a cell of this chunk.
    pub fn contains_local(x: i32, y: i32, z: i32) -> bool {
        (0..CHUNK_DIMENSION_X).contains(&x)
            && (0..CHUNK_DIMENSION_Y).contains(&y)
            && (0..CHUNK_DIMENSION_Z).contains(&z)
    }

    #[inline]
    fn index_of(x: i32, y: i32, z: i32) -> usize {
        assert!(
            Self::contains_local(x, y, z),
            "local block position ({x}, {y}, {z}) is outside the chunk"
        );
        (x + CHUNK_DIMENSION_X * (z + CHUNK_DIMENSION_Z * y)) as usize
    }

    /// Block at local `(x, y, z)`.
    #[inline]
    pub fn get(&self, x: i32, y: i32, z: i32) -> Block {
        self.blocks[Self::index_of(x, y, z)]
    }

    /// Block at local `pos`.
    #[inline]
    pub fn get_at(&self, pos: Vector3<i32>) -> Block {
        self.get(pos.x, pos.y, pos.z)
    }

    /// Block at local `(x, y, z)`, or `None` when outside the chunk.
    #[inline]
    pub fn try_get(&self, x: i32, y: i32, z: i32) -> Option<Block> {
        Self::contains_local(x, y, z).then(|| self.get(x, y, z))
    }

    /// Replaces the block at local `(x, y, z)`.
    #[inline]
    pub fn set(&mut self, x: i32, y: i32, z: i32, block: Block) {
        self.blocks[Self::index_of(x, y, z)] = block;
    }

    #[inline]
    pub fn set_at(&mut self, pos: Vector3<i32>, block: Block) {
        self.set(pos.x, pos.y, pos.z, block);
    }

    /// Fills every cell of the layers `y ∈ [y_min, y_max]` with `block`.
    pub fn fill_layers(&mut self, y_min: i32, y_max: i32, block: Block) {
        let y_min = y_min.max(0);
        let y_max = y_max.min(CHUNK_DIMENSION_Y - 1);
        if y_min > y_max {
            return;
        }
        let start = y_min as usize * CHUNK_LAYER_SIZE;
        let end = (y_max as usize + 1) * CHUNK_LAYER_SIZE;
        self.blocks[start..end].fill(block);
    }

    /// Highest `y ∈ [0, max_y]` holding a solid block in column `(x, z)`, or
    /// [`NO_FLOOR`]. `max_y` is clamped to the chunk height.
    pub fn find_floor_height(&self, x: i32, z: i32, max_y: i32) -> i32 {
        let top = max_y.min(CHUNK_DIMENSION_Y - 1);
        (0..=top)
            .rev()
            .find(|&y| self.get(x, y, z).is_solid())
            .unwrap_or(NO_FLOOR)
    }

    /// Lowest `y ∈ [min_y, 255]` holding a solid block in column `(x, z)`, or
    /// [`NO_CEIL`]. `min_y` is clamped to the chunk floor.
    pub fn find_ceil_height(&self, x: i32, z: i32, min_y: i32) -> i32 {
        let bottom = min_y.max(0);
        (bottom..CHUNK_DIMENSION_Y)
            .find(|&y| self.get(x, y, z).is_solid())
            .unwrap_or(NO_CEIL)
    }

    /// Raw block storage, in layout order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Number of non-air blocks.
    pub fn solid_count(&self) -> usize {
        self.blocks.iter().filter(|b| b.is_solid()).count()
    }
}

impl Default for Chunk {
    fn default() -> Self {
        Self::create_void()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_void_chunk_is_all_air() {
        let chunk = Chunk::create_void();
        assert_eq!(chunk.blocks().len(), CHUNK_SIZE);
        assert_eq!(chunk.solid_count(), 0);
        assert_eq!(chunk.find_floor_height(3, 3, 255), NO_FLOOR);
        assert_eq!(chunk.find_ceil_height(3, 3, 0), NO_CEIL);
    }

    #[test]
    fn test_get_set_corners() {
        let mut chunk = Chunk::create_void();
        chunk.set(0, 0, 0, Block::Stone);
        chunk.set(15, 255, 15, Block::Sand);
        assert_eq!(chunk.get(0, 0, 0), Block::Stone);
        assert_eq!(chunk.get(15, 255, 15), Block::Sand);
        assert_eq!(chunk.get(1, 0, 0), Block::Air);
        assert_eq!(chunk.try_get(16, 0, 0), None);
        assert_eq!(chunk.try_get(0, -1, 0), None);
    }

    #[test]
    #[should_panic]
    fn test_out_of_range_set_panics() {
        let mut chunk = Chunk::create_void();
        chunk.set(0, 256, 0, Block::Dirt);
    }

    #[test]
    fn test_floor_and_ceil_scans() {
        let mut chunk = Chunk::create_void();
        chunk.fill_layers(0, 3, Block::Dirt);
        chunk.set(4, 10, 4, Block::Stone);

        assert_eq!(chunk.find_floor_height(4, 4, 255), 10);
        assert_eq!(chunk.find_floor_height(4, 4, 9), 3);
        assert_eq!(chunk.find_floor_height(0, 0, 1000), 3, "max_y is clamped");
        assert_eq!(chunk.find_floor_height(0, 0, -1), NO_FLOOR);

        assert_eq!(chunk.find_ceil_height(4, 4, 4), 10);
        assert_eq!(chunk.find_ceil_height(4, 4, 11), NO_CEIL);
        assert_eq!(chunk.find_ceil_height(0, 0, -20), 0, "min_y is clamped");
    }

    #[test]
    fn test_fill_layers_clamps() {
        let mut chunk = Chunk::create_void();
        chunk.fill_layers(-5, 0, Block::Grass);
        assert_eq!(chunk.solid_count(), CHUNK_LAYER_SIZE);
        chunk.fill_layers(300, 400, Block::Grass);
        assert_eq!(chunk.solid_count(), CHUNK_LAYER_SIZE);
    }
}
