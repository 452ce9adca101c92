//! # Block Side Module
//!
//! This module defines the six faces of a cube and the per-face data the
//! mesher needs: the outward normal, the in-plane axes used to lay out the
//! quad, and where the face's image lives in a block texture.
//!
//! ## Texture layout
//!
//! Each block texture is a 3x2 atlas of face images:
//!
//! ```text
//! +--------+--------+--------+
//! |  TOP   | BOTTOM | FRONT  |
//! +--------+--------+--------+
//! |  BACK  |  LEFT  | RIGHT  |
//! +--------+--------+--------+
//! ```

use cgmath::Vector3;

/// Represents the six possible faces of a voxel block.
///
/// The order is: [FRONT, BACK, BOTTOM, TOP, LEFT, RIGHT]
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum BlockSide {
    /// The front face (facing negative X)
    FRONT = 0,

    /// The back face (facing positive X)
    BACK = 1,

    /// The bottom face (facing negative Y)
    BOTTOM = 2,

    /// The top face (facing positive Y)
    TOP = 3,

    /// The left face (facing negative Z)
    LEFT = 4,

    /// The right face (facing positive Z)
    RIGHT = 5,
}

/// Width of one face image in atlas UV space.
pub const ATLAS_CELL_WIDTH: f32 = 1.0 / 3.0;
/// Height of one face image in atlas UV space.
pub const ATLAS_CELL_HEIGHT: f32 = 1.0 / 2.0;

impl BlockSide {
    /// Returns an array containing all six block faces in a consistent order.
    pub fn all() -> [BlockSide; 6] {
        [
            BlockSide::FRONT,
            BlockSide::BACK,
            BlockSide::BOTTOM,
            BlockSide::TOP,
            BlockSide::LEFT,
            BlockSide::RIGHT,
        ]
    }

    /// Outward unit normal of this face.
    pub fn normal(self) -> Vector3<i32> {
        match self {
            BlockSide::FRONT => Vector3::new(-1, 0, 0),
            BlockSide::BACK => Vector3::new(1, 0, 0),
            BlockSide::BOTTOM => Vector3::new(0, -1, 0),
            BlockSide::TOP => Vector3::new(0, 1, 0),
            BlockSide::LEFT => Vector3::new(0, 0, -1),
            BlockSide::RIGHT => Vector3::new(0, 0, 1),
        }
    }

    /// The quad's in-plane axes `(u, v)`, chosen so that `u × v` equals the
    /// outward normal. Side faces keep `v` pointing up so textures stand upright.
    pub fn tangents(self) -> (Vector3<i32>, Vector3<i32>) {
        match self {
            BlockSide::FRONT => (Vector3::new(0, 0, 1), Vector3::new(0, 1, 0)),
            BlockSide::BACK => (Vector3::new(0, 0, -1), Vector3::new(0, 1, 0)),
            BlockSide::BOTTOM => (Vector3::new(1, 0, 0), Vector3::new(0, 0, 1)),
            BlockSide::TOP => (Vector3::new(1, 0, 0), Vector3::new(0, 0, -1)),
            BlockSide::LEFT => (Vector3::new(-1, 0, 0), Vector3::new(0, 1, 0)),
            BlockSide::RIGHT => (Vector3::new(1, 0, 0), Vector3::new(0, 1, 0)),
        }
    }

    /// Top-left UV corner of this face's image in the block atlas.
    pub fn atlas_origin(self) -> [f32; 2] {
        let (column, row) = match self {
            BlockSide::TOP => (0, 0),
            BlockSide::BOTTOM => (1, 0),
            BlockSide::FRONT => (2, 0),
            BlockSide::BACK => (0, 1),
            BlockSide::LEFT => (1, 1),
            BlockSide::RIGHT => (2, 1),
        };
        [
            column as f32 * ATLAS_CELL_WIDTH,
            row as f32 * ATLAS_CELL_HEIGHT,
        ]
    }

    /// The face whose normal is `normal`, if it is an axis unit vector.
    pub fn from_normal(normal: Vector3<i32>) -> Option<BlockSide> {
        BlockSide::all().into_iter().find(|side| side.normal() == normal)
    }
}
