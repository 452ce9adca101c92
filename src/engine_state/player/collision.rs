//! # Player Collision Helpers
//!
//! Pure functions between the player's collision box and the block grid.
//!
//! ## Conventions
//!
//! - Block `b` occupies `[b - 0.5, b + 0.5]` on every axis, so the block
//!   containing a world point is found by rounding.
//! - The collision box is axis aligned, centred horizontally on the feet and
//!   extends `size.y` upwards from them.
//! - A box that only touches a block face does not overlap that block. A box
//!   spanning `[min, max]` therefore covers the blocks
//!   `floor(min - 0.5) + 1 ..= ceil(max + 0.5) - 1` on each axis.
//! - The box is always smaller than a chunk horizontally, so it touches at
//!   most four chunks.

use cgmath::{Point3, Vector3};

use crate::engine_state::voxels::chunk::{
    CHUNK_DIMENSION_X, CHUNK_DIMENSION_Y, CHUNK_DIMENSION_Z, NO_CEIL, NO_FLOOR,
};
use crate::engine_state::voxels::{chunk_index_of_block, chunk_origin, ChunkIndex, ChunkSource};

/// The block containing world point `position`.
pub fn block_pos_from_world(position: Point3<f32>) -> Vector3<i32> {
    Vector3::new(
        position.x.round() as i32,
        position.y.round() as i32,
        position.z.round() as i32,
    )
}

/// Feet position of a player whose eyes are at `position`.
pub fn foot_pos(position: Point3<f32>, eye_height: f32) -> Point3<f32> {
    position - Vector3::unit_y() * eye_height
}

/// Minimum corner of the collision box standing on `foot`.
pub fn collision_min_pos(foot: Point3<f32>, size: Vector3<f32>) -> Point3<f32> {
    Point3::new(foot.x - size.x / 2.0, foot.y, foot.z - size.z / 2.0)
}

/// Overlap shallower than this counts as touching. A box snapped onto a
/// block face can land a rounding error inside it.
pub const TOUCH_EPSILON: f32 = 1e-3;

/// Inclusive range of blocks overlapped by the open interval `(min, max)`
/// on one axis.
pub fn overlapped_blocks(min: f32, max: f32) -> [i32; 2] {
    [
        (min - 0.5 + TOUCH_EPSILON).floor() as i32 + 1,
        (max + 0.5 - TOUCH_EPSILON).ceil() as i32 - 1,
    ]
}

/// The part of a collision box that falls inside one chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionBoundary {
    /// `false` for chunks outside the grid and for repeated chunks; the
    /// ranges of such records must be ignored.
    pub contained: bool,
    pub chunk_index: ChunkIndex,
    /// Local x range, inclusive.
    pub range_x: [i32; 2],
    /// Block y range, inclusive and clamped to the chunk height. Shared by all records.
    pub range_y: [i32; 2],
    /// Local z range, inclusive.
    pub range_z: [i32; 2],
}

impl CollisionBoundary {
    fn columns(&self) -> impl Iterator<Item = (i32, i32)> {
        let [x0, x1] = self.range_x;
        let [z0, z1] = self.range_z;
        (x0..=x1).flat_map(move |x| (z0..=z1).map(move |z| (x, z)))
    }
}

/// Splits the box `[world_min_pos, world_min_pos + size]` into one record
/// per chunk it touches.
///
/// Records are ordered `(x0, z0)`, `(x1, z0)`, `(x0, z1)`, `(x1, z1)`; when
/// the box fits in one chunk along an axis the repeated records are not
/// `contained`.
pub fn calculate_collision_boundary_as_block<C: ChunkSource>(
    chunks: &C,
    world_min_pos: Point3<f32>,
    size: Vector3<f32>,
) -> [CollisionBoundary; 4] {
    let max = world_min_pos + size;
    let [bx_min, bx_max] = overlapped_blocks(world_min_pos.x, max.x);
    let [by_min, by_max] = overlapped_blocks(world_min_pos.y, max.y);
    let [bz_min, bz_max] = overlapped_blocks(world_min_pos.z, max.z);

    let low = chunk_index_of_block(Vector3::new(bx_min, 0, bz_min));
    let high = chunk_index_of_block(Vector3::new(bx_max, 0, bz_max));
    let extent = chunks.world_bounds().extent;
    let range_y = [
        by_min.clamp(0, CHUNK_DIMENSION_Y - 1),
        by_max.clamp(0, CHUNK_DIMENSION_Y - 1),
    ];

    let corners = [
        (low.x, low.y, true),
        (high.x, low.y, high.x != low.x),
        (low.x, high.y, high.y != low.y),
        (high.x, high.y, high.x != low.x && high.y != low.y),
    ];
    corners.map(|(cx, cz, distinct)| {
        let chunk_index = ChunkIndex::new(cx, cz);
        let origin = chunk_origin(chunk_index);
        CollisionBoundary {
            contained: distinct && extent.contains(chunk_index),
            chunk_index,
            range_x: [
                (bx_min - origin.x).max(0),
                (bx_max - origin.x).min(CHUNK_DIMENSION_X - 1),
            ],
            range_y,
            range_z: [
                (bz_min - origin.z).max(0),
                (bz_max - origin.z).min(CHUNK_DIMENSION_Z - 1),
            ],
        }
    })
}

/// Highest solid block at or below the feet, over every column under the
/// collision box. [`NO_FLOOR`] when there is none or the box is off the grid.
pub fn find_floor_height<C: ChunkSource>(
    chunks: &C,
    foot_world: Point3<f32>,
    size: Vector3<f32>,
) -> i32 {
    let y_max = (foot_world.y.round() as i32).min(CHUNK_DIMENSION_Y - 1);
    if y_max < 0 {
        return NO_FLOOR;
    }
    calculate_collision_boundary_as_block(chunks, collision_min_pos(foot_world, size), size)
        .iter()
        .filter(|record| record.contained)
        .filter_map(|record| {
            chunks.with_chunk(record.chunk_index, |chunk| {
                record
                    .columns()
                    .map(|(x, z)| chunk.find_floor_height(x, z, y_max))
                    .max()
                    .unwrap_or(NO_FLOOR)
            })
        })
        .max()
        .unwrap_or(NO_FLOOR)
}

/// Lowest solid block at or above the head, over every column under the
/// collision box. [`NO_CEIL`] when there is none.
pub fn find_ceil_height<C: ChunkSource>(
    chunks: &C,
    foot_world: Point3<f32>,
    size: Vector3<f32>,
) -> i32 {
    let y_min = ((foot_world.y + size.y).round() as i32).max(0);
    if y_min >= CHUNK_DIMENSION_Y {
        return NO_CEIL;
    }
    calculate_collision_boundary_as_block(chunks, collision_min_pos(foot_world, size), size)
        .iter()
        .filter(|record| record.contained)
        .filter_map(|record| {
            chunks.with_chunk(record.chunk_index, |chunk| {
                record
                    .columns()
                    .map(|(x, z)| chunk.find_ceil_height(x, z, y_min))
                    .min()
                    .unwrap_or(NO_CEIL)
            })
        })
        .min()
        .unwrap_or(NO_CEIL)
}

/// Whether any solid block overlaps the collision box standing on `foot_world`.
pub fn is_overlapping_with_terrain<C: ChunkSource>(
    chunks: &C,
    foot_world: Point3<f32>,
    size: Vector3<f32>,
) -> bool {
    let [by_min, by_max] = overlapped_blocks(foot_world.y, foot_world.y + size.y);
    if by_max < 0 || by_min >= CHUNK_DIMENSION_Y {
        return false;
    }
    calculate_collision_boundary_as_block(chunks, collision_min_pos(foot_world, size), size)
        .iter()
        .filter(|record| record.contained)
        .any(|record| {
            chunks
                .with_chunk(record.chunk_index, |chunk| {
                    let [y0, y1] = record.range_y;
                    record
                        .columns()
                        .any(|(x, z)| (y0..=y1).any(|y| chunk.get(x, y, z).is_solid()))
                })
                .unwrap_or(false)
        })
}

/// Whether the collision box standing on `foot_world` overlaps the unit
/// cube of block `target_world_block_pos`. Touching faces do not overlap.
pub fn is_overlapping_with_block(
    foot_world: Point3<f32>,
    size: Vector3<f32>,
    target_world_block_pos: Vector3<i32>,
) -> bool {
    let min = collision_min_pos(foot_world, size);
    let max = min + size;
    let block_min = target_world_block_pos.map(|c| c as f32 - 0.5);
    let block_max = target_world_block_pos.map(|c| c as f32 + 0.5);

    min.x < block_max.x
        && block_min.x < max.x
        && min.y < block_max.y
        && block_min.y < max.y
        && min.z < block_max.z
        && block_min.z < max.z
}
