//! Face-culled surface meshing of a single chunk.
//!
//! Every solid block emits a quad for each of its six faces whose neighbour
//! is air or lies outside the chunk. Neighbouring chunks are never consulted:
//! faces on a chunk seam are always emitted, so a chunk can be remeshed on its
//! own after an edit.

use cgmath::{Point3, Vector3};

use super::mesh::{Face, Mesh};
use crate::engine_state::voxels::block::block_side::BlockSide;
use crate::engine_state::voxels::chunk::{
    Chunk, CHUNK_DIMENSION_X, CHUNK_DIMENSION_Y, CHUNK_DIMENSION_Z,
};

/// Whether the face `side` of the block at local `(x, y, z)` is visible.
#[inline]
fn is_face_visible(chunk: &Chunk, x: i32, y: i32, z: i32, side: BlockSide) -> bool {
    let n = side.normal();
    chunk
        .try_get(x + n.x, y + n.y, z + n.z)
        .map_or(true, |neighbour| neighbour.is_air())
}

/// Builds the surface mesh of `chunk`.
///
/// # Arguments
/// * `chunk` - The block array to mesh
/// * `origin` - World-space position of the centre of the chunk's (0, 0, 0) block
///
/// # Returns
/// A [`Mesh`] with one quad per visible face. A chunk with no visible faces
/// yields an empty mesh; uploaders hand back empty views for it and the
/// renderer skips it.
pub fn build_surface_mesh(chunk: &Chunk, origin: Vector3<f32>) -> Mesh {
    let mut mesh = Mesh::with_chunk_capacity();

    for y in 0..CHUNK_DIMENSION_Y {
        for z in 0..CHUNK_DIMENSION_Z {
            for x in 0..CHUNK_DIMENSION_X {
                let block = chunk.get(x, y, z);
                if block.is_air() {
                    continue;
                }
                let center = Point3::new(x as f32, y as f32, z as f32) + origin;
                for side in BlockSide::all() {
                    if is_face_visible(chunk, x, y, z, side) {
                        mesh.push_face(&Face::new(center, block, side));
                    }
                }
            }
        }
    }

    mesh.assert_consistent();
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::Block;

    #[test]
    fn test_void_chunk_has_empty_mesh() {
        let mesh = build_surface_mesh(&Chunk::create_void(), Vector3::new(0.0, 0.0, 0.0));
        assert!(mesh.is_empty());
        assert!(mesh.vertices.is_empty());
    }

    #[test]
    fn test_single_block_emits_six_faces() {
        let mut chunk = Chunk::create_void();
        chunk.set(5, 10, 5, Block::Dirt);
        let mesh = build_surface_mesh(&chunk, Vector3::new(0.0, 0.0, 0.0));
        assert_eq!(mesh.face_count(), 6);
        assert_eq!(mesh.indices.len(), 36);
    }

    #[test]
    fn test_shared_face_is_culled() {
        let mut chunk = Chunk::create_void();
        chunk.set(5, 10, 5, Block::Dirt);
        chunk.set(6, 10, 5, Block::Stone);
        let mesh = build_surface_mesh(&chunk, Vector3::new(0.0, 0.0, 0.0));
        assert_eq!(mesh.face_count(), 10);
    }

    #[test]
    fn test_seam_faces_are_kept() {
        let mut chunk = Chunk::create_void();
        chunk.fill_layers(0, 0, Block::Sand);
        let mesh = build_surface_mesh(&chunk, Vector3::new(0.0, 0.0, 0.0));
        // top + bottom of every column, plus the four outer walls of the slab
        assert_eq!(mesh.face_count(), 2 * 256 + 4 * 16);
    }

    #[test]
    fn test_origin_offsets_positions() {
        let mut chunk = Chunk::create_void();
        chunk.set(0, 0, 0, Block::Grass);
        let mesh = build_surface_mesh(&chunk, Vector3::new(32.0, 0.0, -16.0));
        for vertex in &mesh.vertices {
            assert!((31.5..=32.5).contains(&vertex.position[0]));
            assert!((-16.5..=-15.5).contains(&vertex.position[2]));
        }
    }
}
