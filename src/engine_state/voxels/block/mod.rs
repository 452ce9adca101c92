//! # Block Module
//!
//! This module provides the block type stored in every chunk cell and the
//! description of a block's six faces.

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

pub mod block_side;

/// The underlying integer type a block is stored as. The same value is the
/// texture-array slice the shader samples for that block.
pub type BlockTypeSize = u32;

/// Enumerates every block that can occupy a cell of the world.
///
/// `Air` is the empty sentinel; every other block is solid and renders.
/// The `FromPrimitive` derive allows decoding from the stored integer.
#[repr(u32)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, FromPrimitive)]
pub enum Block {
    /// Empty space. Never meshed, never collided with.
    #[default]
    Air = 0,
    /// Placeholder texture, used for blocks that failed to decode.
    Invalid = 1,
    Grass = 2,
    Stone = 3,
    Dirt = 4,
    Sand = 5,
}

impl Block {
    /// Every block, in encoding order.
    pub const ALL: [Block; 6] = [
        Block::Air,
        Block::Invalid,
        Block::Grass,
        Block::Stone,
        Block::Dirt,
        Block::Sand,
    ];

    /// Decodes a stored block value. Unknown values yield `None`.
    pub fn from_int(value: BlockTypeSize) -> Option<Self> {
        FromPrimitive::from_u32(value)
    }

    /// The stored integer, also the texture-array index of the block.
    pub fn as_int(self) -> BlockTypeSize {
        self as BlockTypeSize
    }

    pub fn is_air(self) -> bool {
        self == Block::Air
    }

    pub fn is_solid(self) -> bool {
        !self.is_air()
    }
}
