//! Shared worlds and configs for the integration tests.

#![allow(dead_code)]

use cgmath::Vector2;
use voxel_world::config::WorldConfig;
use voxel_world::engine_state::voxels::block::Block;
use voxel_world::engine_state::voxels::chunk::Chunk;
use voxel_world::engine_state::voxels::World;

/// One chunk with solid blocks for `y ∈ [0, 3]` and air above.
pub fn single_chunk_world() -> World {
    let mut world = World::new(1, 1, 0);
    world.insert_chunk(Vector2::new(0, 0), flat_chunk(3, Block::Stone));
    world
}

/// 2×2 chunks whose floors are at 3, 2, 4 and 3 for chunks
/// (0, 0), (1, 0), (0, 1) and (1, 1).
pub fn four_chunk_world() -> World {
    let mut world = World::new(2, 2, 0);
    let floors = [((0, 0), 3), ((1, 0), 2), ((0, 1), 4), ((1, 1), 3)];
    for ((cx, cz), floor) in floors {
        world.insert_chunk(Vector2::new(cx, cz), flat_chunk(floor, Block::Dirt));
    }
    world
}

/// A chunk filled with `block` from `y = 0` up to `top` inclusive.
pub fn flat_chunk(top: i32, block: Block) -> Chunk {
    let mut chunk = Chunk::create_void();
    chunk.fill_layers(0, top, block);
    chunk
}

/// A small grid that generates synchronously.
pub fn small_world_config(chunk_count: u32, draw_distance: u32) -> WorldConfig {
    WorldConfig {
        chunk_count_x: chunk_count,
        chunk_count_z: chunk_count,
        edge_margin: 2,
        draw_distance,
        seed: Some(1234),
        allow_parallel: false,
        ..WorldConfig::default()
    }
}
