//! Mesh generation for voxel rendering.
//!
//! # Architecture
//! - `mesh/`: The [`Mesh`] and [`Face`] data structures, and the textured cube
//! - `surface`: Face-culled meshing of a whole chunk
//!
//! # Performance Considerations
//! - Faces between two solid blocks of the same chunk are never emitted
//! - Chunk meshes are built off the main thread, see
//!   [`ChunkGenerationTask`](crate::engine_state::voxels::tasks::chunk_generation_task::ChunkGenerationTask)

mod mesh;
mod surface;

pub use mesh::*;
pub use surface::build_surface_mesh;
