//! Mesh data structures for voxel rendering.
//!
//! # Architecture
//! - [`Mesh`]: A triangle list of vertices and indices
//! - [`Face`]: One quad of a unit cube, with its corners and texture data

mod face;
mod mesh;

pub use face::Face;
pub use mesh::*;
