//! Rendering side of the voxel engine.
//!
//! The world code produces CPU meshes and per-frame constants; everything in
//! here either builds those meshes or turns them into GPU resources.
//!
//! ## Key Components
//!
//! * `meshing` - Face-culled chunk meshes and textured cubes
//! * `mesh_uploader` - The upload contract and the opaque buffer views
//! * `wgpu_uploader` - The wgpu implementation of that contract
//! * `shader_data` - Uniform blocks shared with the world shaders
//! * `ui` - The text grid and debug overlay

pub mod mesh_uploader;
pub mod meshing;
pub mod shader_data;
pub mod ui;
mod vertex;
pub mod wgpu_uploader;

// Re-export commonly used types
pub use mesh_uploader::{
    GpuMesh, HeadlessMeshUploader, IndexBufferView, MeshUploader, VertexBufferView,
};
pub use vertex::Vertex;
