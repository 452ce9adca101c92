//! # Chunk Creation Module
//!
//! Procedural terrain: a 2-D simplex heightmap sampled in world space, filled
//! with three height-banded materials.
//!
//! Generation is a pure function of the chunk index and [`TerrainParams`], so
//! neighbouring chunks stitch together and regenerating a chunk is bit-exact.

use noise::{NoiseFn, Simplex};

use super::{Chunk, CHUNK_DIMENSION_X, CHUNK_DIMENSION_Y, CHUNK_DIMENSION_Z};
use crate::config::WorldConfig;
use crate::engine_state::voxels::block::Block;
use crate::engine_state::voxels::{chunk_origin, ChunkIndex};

/// Inputs of the terrain generator, together with the noise source every
/// column is sampled from.
#[derive(Debug, Clone, Copy)]
pub struct TerrainParams {
    /// Horizontal frequency applied to world coordinates before sampling.
    pub noise_scale_h: f64,
    /// Height range, in blocks, covered by the noise.
    pub noise_scale_v: f64,
    /// Base height added to every column.
    pub height_bulk: i32,
    /// Columns below this height are sand.
    pub min_dirt_y: i32,
    /// Blocks at or above this height are stone.
    pub min_stone_y: i32,
    /// High 16 bits offset the x sample, low 16 bits the z sample.
    pub seed: u32,
    noise: Simplex,
}

impl TerrainParams {
    pub fn from_config(config: &WorldConfig, seed: u32) -> Self {
        Self {
            noise_scale_h: config.noise_scale_h,
            noise_scale_v: config.noise_scale_v,
            height_bulk: config.height_bulk,
            min_dirt_y: config.min_dirt_y,
            min_stone_y: config.min_stone_y,
            seed,
            noise: Simplex::new(Simplex::DEFAULT_SEED),
        }
    }

    fn seed_offsets(&self) -> (f64, f64) {
        ((self.seed >> 16) as f64, (self.seed & 0xFFFF) as f64)
    }

    /// Height of the terrain column at world block `(wx, wz)`.
    pub fn surface_height(&self, wx: i32, wz: i32) -> i32 {
        let (seed_x, seed_z) = self.seed_offsets();
        let sample = self.noise.get([
            (wx as f64 + seed_x) * self.noise_scale_h,
            (wz as f64 + seed_z) * self.noise_scale_h,
        ]);
        let unit = (sample.clamp(-1.0, 1.0) + 1.0) * 0.5;
        let height = unit * self.noise_scale_v + self.height_bulk as f64;
        height.clamp(0.0, (CHUNK_DIMENSION_Y - 1) as f64).floor() as i32
    }

    /// Material of the block at height `y` in a column of height `column_height`.
    pub fn block_at(&self, y: i32, column_height: i32) -> Block {
        if y >= self.min_stone_y {
            Block::Stone
        } else if y == column_height && y >= self.min_dirt_y {
            Block::Grass
        } else if y < column_height && y >= self.min_dirt_y {
            Block::Dirt
        } else {
            Block::Sand
        }
    }
}

impl Chunk {
    /// Generates the terrain for the chunk at `chunk_index`.
    ///
    /// # Arguments
    /// * `chunk_index` - Chunk coordinates; the chunk's (0, 0, 0) corner sits at
    ///   world block `(16 * cx, 0, 16 * cz)`
    /// * `params` - Noise scales, material heights and seed
    ///
    /// # Returns
    /// A chunk with every column filled from `y = 0` up to its noise height.
    pub fn create_from_noise(chunk_index: ChunkIndex, params: &TerrainParams) -> Self {
        let origin = chunk_origin(chunk_index);
        let mut chunk = Chunk::create_void();

        for z in 0..CHUNK_DIMENSION_Z {
            for x in 0..CHUNK_DIMENSION_X {
                let height = params.surface_height(origin.x + x, origin.z + z);
                for y in 0..=height {
                    chunk.set(x, y, z, params.block_at(y, height));
                }
            }
        }

        chunk
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector2;

    fn params(seed: u32) -> TerrainParams {
        let config = WorldConfig {
            noise_scale_h: 0.02,
            ..WorldConfig::default()
        };
        TerrainParams::from_config(&config, seed)
    }

    #[test]
    fn test_generation_is_deterministic() {
        let a = Chunk::create_from_noise(Vector2::new(3, -2), &params(0xDEAD_BEEF));
        let b = Chunk::create_from_noise(Vector2::new(3, -2), &params(0xDEAD_BEEF));
        assert_eq!(a, b);
    }

    #[test]
    fn test_seed_changes_terrain() {
        let a = Chunk::create_from_noise(Vector2::new(0, 0), &params(1));
        let b = Chunk::create_from_noise(Vector2::new(0, 0), &params(0x0123_4567));
        assert_ne!(a, b);
    }

    #[test]
    fn test_columns_are_filled_from_bedrock() {
        let chunk = Chunk::create_from_noise(Vector2::new(1, 1), &params(42));
        for z in 0..CHUNK_DIMENSION_Z {
            for x in 0..CHUNK_DIMENSION_X {
                let top = chunk.find_floor_height(x, z, CHUNK_DIMENSION_Y - 1);
                assert!(top >= 32, "height_bulk is a lower bound");
                assert!(top <= 32 + 64);
                for y in 0..=top {
                    assert!(chunk.get(x, y, z).is_solid(), "no holes below the surface");
                }
            }
        }
    }

    #[test]
    fn test_material_bands() {
        let p = params(0);
        assert_eq!(p.block_at(90, 95), Block::Stone);
        assert_eq!(p.block_at(50, 50), Block::Grass);
        assert_eq!(p.block_at(45, 50), Block::Dirt);
        assert_eq!(p.block_at(30, 50), Block::Sand);
        assert_eq!(p.block_at(35, 35), Block::Sand, "low surface is beach");
    }

    #[test]
    fn test_neighbouring_chunks_share_world_columns() {
        let p = params(77);
        let right = Chunk::create_from_noise(Vector2::new(1, 0), &p);
        let expected = p.surface_height(16, 5);
        assert_eq!(right.find_floor_height(0, 5, 255), expected);
    }
}
