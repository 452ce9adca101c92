//! The [`Mesh`] container: a triangle list of [`Vertex`]es and 32-bit indices.

use cgmath::{InnerSpace, Point3};

use super::face::Face;
use crate::engine_state::rendering::Vertex;
use crate::engine_state::voxels::block::{block_side::BlockSide, Block};

/// Vertices reserved up front for a chunk mesh.
pub const VERTEX_CAPACITY_HINT: usize = 4096;
/// Indices reserved up front for a chunk mesh.
pub const INDEX_CAPACITY_HINT: usize = 1024;

/// A triangle list with clockwise winding when viewed from outside the surface.
///
/// Every quad contributes four vertices and six indices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    /// Creates a new, empty mesh.
    pub fn new() -> Self {
        Mesh::default()
    }

    /// Creates an empty mesh with room for a typical chunk.
    pub fn with_chunk_capacity() -> Self {
        Mesh {
            vertices: Vec::with_capacity(VERTEX_CAPACITY_HINT),
            indices: Vec::with_capacity(INDEX_CAPACITY_HINT),
        }
    }

    /// Builds the 24-vertex cube of `block` centred at `center`, with all six
    /// faces and the same UV layout the chunk mesher uses.
    pub fn textured_cube(block: Block, center: Point3<f32>) -> Self {
        let mut mesh = Mesh {
            vertices: Vec::with_capacity(24),
            indices: Vec::with_capacity(36),
        };
        for side in BlockSide::all() {
            mesh.push_face(&Face::new(center, block, side));
        }
        mesh
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Number of quads in the mesh.
    pub fn face_count(&self) -> usize {
        self.vertices.len() / 4
    }

    /// Appends one quad.
    pub fn push_face(&mut self, face: &Face) {
        let face_index = self.face_count() as u32;
        self.vertices.extend_from_slice(&face.vertices());
        self.indices
            .extend_from_slice(&Self::generate_face_indices(face_index));
    }

    /// Generates the six indices for the `n`-th quad of a mesh whose vertices
    /// are laid out `[ll, lr, ul, ur]`: triangles `(ll, ul, ur)` and `(ll, ur, lr)`.
    pub fn generate_face_indices(n: u32) -> [u32; 6] {
        let base = 4 * n;
        [base, base + 2, base + 3, base, base + 3, base + 1]
    }

    /// Size of the vertex data in bytes.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Size of the index data in bytes.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Panics if the index list is not made of whole triangles or refers past
    /// the end of the vertex list.
    pub fn assert_consistent(&self) {
        assert!(
            self.indices.len() % 6 == 0,
            "mesh has {} indices, not a whole number of quads",
            self.indices.len()
        );
        assert!(
            self.vertices.len() == self.indices.len() / 6 * 4,
            "mesh has {} vertices for {} indices",
            self.vertices.len(),
            self.indices.len()
        );
        if let Some(&bad) = self
            .indices
            .iter()
            .find(|&&i| i as usize >= self.vertices.len())
        {
            panic!(
                "mesh index {bad} is out of range for {} vertices",
                self.vertices.len()
            );
        }
    }

    /// Whether every triangle winds clockwise when viewed from the side its
    /// vertex normal points to.
    pub fn is_clockwise_from_outside(&self) -> bool {
        self.indices.chunks_exact(3).all(|triangle| {
            let [a, b, c] = [triangle[0], triangle[1], triangle[2]]
                .map(|i| self.vertices[i as usize].position3());
            let normal = self.vertices[triangle[0] as usize].normal3();
            (b - a).cross(c - a).dot(normal) < 0.0
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_textured_cube_shape() {
        let cube = Mesh::textured_cube(Block::Grass, Point3::new(1.0, 2.0, 3.0));
        assert_eq!(cube.vertices.len(), 24);
        assert_eq!(cube.indices.len(), 36);
        cube.assert_consistent();
        assert!(cube.is_clockwise_from_outside());
        assert!(cube
            .vertices
            .iter()
            .all(|v| v.texture_index == Block::Grass.as_int()));
    }

    #[test]
    fn test_cube_spans_unit_extent() {
        let cube = Mesh::textured_cube(Block::Stone, Point3::new(0.0, 0.0, 0.0));
        for vertex in &cube.vertices {
            for c in &vertex.position[..3] {
                assert_eq!(c.abs(), 0.5);
            }
            assert_eq!(vertex.position[3], 1.0);
        }
    }

    #[test]
    fn test_face_indices_pattern() {
        assert_eq!(Mesh::generate_face_indices(0), [0, 2, 3, 0, 3, 1]);
        assert_eq!(Mesh::generate_face_indices(2), [8, 10, 11, 8, 11, 9]);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_dangling_index_panics() {
        let mut mesh = Mesh::textured_cube(Block::Dirt, Point3::new(0.0, 0.0, 0.0));
        mesh.indices[5] = 99;
        mesh.assert_consistent();
    }
}
