use cgmath::{Point3, Vector3};

use crate::engine_state::rendering::Vertex;
use crate::engine_state::voxels::block::block_side::{BlockSide, ATLAS_CELL_HEIGHT, ATLAS_CELL_WIDTH};
use crate::engine_state::voxels::block::Block;

/// Represents a single quad face of a unit cube.
///
/// A face is defined by four corner points in world space. "Lower" and "left"
/// are relative to the face's own `(u, v)` frame (see [`BlockSide::tangents`]):
/// `lr = ll + u`, `ul = ll + v`, `ur = ll + u + v`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face {
    /// Lower-left corner of the face
    pub ll: Point3<f32>,
    /// Lower-right corner of the face
    pub lr: Point3<f32>,
    /// Upper-left corner of the face
    pub ul: Point3<f32>,
    /// Upper-right corner of the face
    pub ur: Point3<f32>,
    /// The block the face belongs to
    pub block: Block,
    /// Which side of the block this face represents
    pub block_side: BlockSide,
}

impl Face {
    /// Creates the face `block_side` of the unit cube centred at `center`.
    pub fn new(center: Point3<f32>, block: Block, block_side: BlockSide) -> Self {
        let to_f32 = |v: Vector3<i32>| v.map(|c| c as f32);
        let normal = to_f32(block_side.normal());
        let (u, v) = block_side.tangents();
        let (u, v) = (to_f32(u), to_f32(v));
        let ll = center + (normal - u - v) * 0.5;
        Face {
            ll,
            lr: ll + u,
            ul: ll + v,
            ur: ll + u + v,
            block,
            block_side,
        }
    }

    /// The face's four vertices, in the order `[ll, lr, ul, ur]`.
    pub fn vertices(&self) -> [Vertex; 4] {
        let [u0, v0] = self.block_side.atlas_origin();
        let (u1, v1) = (u0 + ATLAS_CELL_WIDTH, v0 + ATLAS_CELL_HEIGHT);
        let normal = self.block_side.normal();
        let texture_index = self.block.as_int();
        [
            Vertex::new(self.ll, [u0, v1], normal, texture_index),
            Vertex::new(self.lr, [u1, v1], normal, texture_index),
            Vertex::new(self.ul, [u0, v0], normal, texture_index),
            Vertex::new(self.ur, [u1, v0], normal, texture_index),
        ]
    }
}
