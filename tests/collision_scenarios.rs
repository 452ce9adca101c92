//! Box collision against hand-built chunk grids.

mod common;

use cgmath::{Point3, Vector3};
use proptest::prelude::*;
use voxel_world::engine_state::player::collision::{
    block_pos_from_world, calculate_collision_boundary_as_block, collision_min_pos,
    find_ceil_height, find_floor_height, is_overlapping_with_block, is_overlapping_with_terrain,
    overlapped_blocks,
};
use voxel_world::engine_state::voxels::block::Block;
use voxel_world::engine_state::voxels::chunk::{Chunk, NO_CEIL, NO_FLOOR};
use voxel_world::engine_state::voxels::{
    block_of_local, chunk_index_of_block, local_of_block, ChunkSource, World,
};

use common::{four_chunk_world, single_chunk_world};

fn player_size() -> Vector3<f32> {
    Vector3::new(0.8, 1.8, 0.8)
}

#[test]
fn feet_just_above_the_floor_do_not_overlap() {
    let world = single_chunk_world();
    assert!(!is_overlapping_with_terrain(
        &world,
        Point3::new(5.0, 3.51, 5.0),
        player_size()
    ));
}

#[test]
fn feet_just_inside_the_floor_overlap() {
    let world = single_chunk_world();
    assert!(is_overlapping_with_terrain(
        &world,
        Point3::new(5.0, 3.49, 5.0),
        player_size()
    ));
}

#[test]
fn floor_and_open_sky() {
    let world = single_chunk_world();
    let foot = Point3::new(5.0, 8.0, 5.0);
    assert_eq!(find_floor_height(&world, foot, player_size()), 3);
    assert_eq!(find_ceil_height(&world, foot, player_size()), NO_CEIL);
}

#[test]
fn straddling_four_chunks_takes_the_highest_floor() {
    let world = four_chunk_world();
    let foot = Point3::new(15.4, 8.0, 15.4);
    assert_eq!(find_floor_height(&world, foot, player_size()), 4);

    let records = calculate_collision_boundary_as_block(
        &world,
        collision_min_pos(foot, player_size()),
        player_size(),
    );
    assert!(records.iter().all(|record| record.contained));
    assert_eq!(records[0].range_x, [15, 15]);
    assert_eq!(records[1].range_x, [0, 0]);
    assert_eq!(records[2].range_z, [0, 0]);
}

#[test]
fn outside_the_grid_has_no_floor() {
    let world = four_chunk_world();
    assert_eq!(
        find_floor_height(&world, Point3::new(-1.0, 8.0, -1.0), player_size()),
        NO_FLOOR
    );
}

#[test]
fn box_inside_one_chunk_yields_one_record() {
    let world = four_chunk_world();
    let foot = Point3::new(5.0, 8.0, 5.0);
    let records = calculate_collision_boundary_as_block(
        &world,
        collision_min_pos(foot, player_size()),
        player_size(),
    );
    assert_eq!(records.iter().filter(|record| record.contained).count(), 1);
    assert_eq!(records[0].range_x, [5, 5]);
    assert_eq!(records[0].range_y, [8, 10]);
}

#[test]
fn ceiling_is_found_above_the_head() {
    let mut world = single_chunk_world();
    world.set_block(Vector3::new(5, 12, 5), Block::Stone);
    let foot = Point3::new(5.0, 4.0, 5.0);
    assert_eq!(find_ceil_height(&world, foot, player_size()), 12);
}

#[test]
fn touching_a_block_face_is_not_overlap() {
    let foot = Point3::new(0.0, 0.5, 0.0);
    let size = Vector3::new(1.0, 1.0, 1.0);
    assert!(!is_overlapping_with_block(foot, size, Vector3::new(1, 1, 0)));
    assert!(!is_overlapping_with_block(foot, size, Vector3::new(0, 2, 0)));
    assert!(is_overlapping_with_block(foot, size, Vector3::new(0, 1, 0)));
}

/// Floor height by checking every block under the box.
fn brute_force_floor(world: &World, foot: Point3<f32>, size: Vector3<f32>) -> i32 {
    let min = collision_min_pos(foot, size);
    let [x0, x1] = overlapped_blocks(min.x, min.x + size.x);
    let [z0, z1] = overlapped_blocks(min.z, min.z + size.z);
    let y_max = foot.y.round() as i32;

    let mut best = NO_FLOOR;
    for x in x0..=x1 {
        for z in z0..=z1 {
            for y in 0..=y_max.min(255) {
                if world.block_at(Vector3::new(x, y, z)).is_solid() {
                    best = best.max(y);
                }
            }
        }
    }
    best
}

fn random_world(heights: &[i32]) -> World {
    let mut world = World::new(2, 2, 0);
    for (i, &height) in heights.iter().enumerate() {
        let mut chunk = Chunk::create_void();
        for x in 0..16 {
            for z in 0..16 {
                let column = (height + (x * 7 + z * 3) % 5).min(255);
                for y in 0..=column {
                    chunk.set(x, y, z, Block::Stone);
                }
            }
        }
        world.insert_chunk(cgmath::Vector2::new(i as i32 % 2, i as i32 / 2), chunk);
    }
    world
}

proptest! {
    /// Property: world -> (chunk, local) -> world is the identity
    #[test]
    fn block_addressing_roundtrips(
        x in -1000i32..1000,
        y in 0i32..256,
        z in -1000i32..1000,
    ) {
        let block = Vector3::new(x, y, z);
        let local = local_of_block(block);
        prop_assert!(Chunk::contains_local(local.x, local.y, local.z));
        prop_assert_eq!(block_of_local(chunk_index_of_block(block), local), block);
    }

    /// Property: a point maps to the block whose unit cube contains it
    #[test]
    fn point_lies_in_its_block(x in -100.0f32..100.0, y in 0.0f32..200.0, z in -100.0f32..100.0) {
        let block = block_pos_from_world(Point3::new(x, y, z));
        prop_assert!((x - block.x as f32).abs() <= 0.5);
        prop_assert!((y - block.y as f32).abs() <= 0.5);
        prop_assert!((z - block.z as f32).abs() <= 0.5);
    }

    /// Property: the chunked floor search agrees with a full scan
    #[test]
    fn floor_matches_brute_force(
        heights in prop::collection::vec(0i32..40, 4),
        fx in 0.5f32..31.5,
        fy in 0.0f32..60.0,
        fz in 0.5f32..31.5,
    ) {
        let world = random_world(&heights);
        let foot = Point3::new(fx, fy, fz);
        let size = Vector3::new(0.8, 1.8, 0.8);
        prop_assert_eq!(
            find_floor_height(&world, foot, size),
            brute_force_floor(&world, foot, size)
        );
    }
}
