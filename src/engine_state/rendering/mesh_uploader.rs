//! # Mesh Upload Contract
//!
//! The world code never touches GPU objects. It hands finished [`Mesh`]es to
//! a [`MeshUploader`] and keeps the opaque views it gets back. The renderer
//! later draws whatever views are packed into the draw lists.
//!
//! A view whose `size_in_bytes` is zero means "draw nothing for this cell".
//! Chunks that are not uploaded yet, and chunks with no visible faces,
//! contribute such views.

use std::collections::HashMap;

use log::debug;

use super::meshing::Mesh;
use super::Vertex;
use crate::error::UploadError;

/// Opaque location of a vertex buffer, plus its size and stride.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct VertexBufferView {
    pub buffer_location: u64,
    pub size_in_bytes: u32,
    pub stride_in_bytes: u32,
}

impl VertexBufferView {
    /// Whether the renderer should skip this view.
    pub fn is_empty(&self) -> bool {
        self.size_in_bytes == 0
    }
}

/// Opaque location of a 32-bit index buffer, plus its size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct IndexBufferView {
    pub buffer_location: u64,
    pub size_in_bytes: u32,
}

/// The GPU-side handles of one uploaded mesh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct GpuMesh {
    pub vbv: VertexBufferView,
    pub ibv: IndexBufferView,
    pub index_count: u32,
}

impl GpuMesh {
    pub fn is_empty(&self) -> bool {
        self.vbv.is_empty()
    }

    /// The views an uploader hands back for `mesh` once its buffers exist.
    pub fn describe(mesh: &Mesh, vertex_location: u64, index_location: u64) -> Self {
        GpuMesh {
            vbv: VertexBufferView {
                buffer_location: vertex_location,
                size_in_bytes: mesh.vertex_bytes().len() as u32,
                stride_in_bytes: std::mem::size_of::<Vertex>() as u32,
            },
            ibv: IndexBufferView {
                buffer_location: index_location,
                size_in_bytes: mesh.index_bytes().len() as u32,
            },
            index_count: mesh.indices.len() as u32,
        }
    }
}

/// Creates GPU buffers for meshes. Main thread only.
pub trait MeshUploader {
    /// Uploads `mesh` and returns its views.
    ///
    /// An empty mesh must succeed with `GpuMesh::default()`. A failure leaves
    /// nothing allocated and may be retried on a later frame.
    fn upload(&mut self, mesh: &Mesh) -> Result<GpuMesh, UploadError>;

    /// Frees buffers previously returned by [`upload`](Self::upload).
    fn release(&mut self, _mesh: GpuMesh) {}
}

/// A [`MeshUploader`] with no GPU behind it.
///
/// It hands out unique locations, tracks which meshes are live, and can be
/// told to fail a number of upcoming uploads. The headless binary runs on it.
#[derive(Debug)]
pub struct HeadlessMeshUploader {
    next_location: u64,
    live: HashMap<u64, u32>,
    failures_to_inject: u32,
    uploads: u64,
    releases: u64,
}

impl HeadlessMeshUploader {
    pub fn new() -> Self {
        Self {
            next_location: 1,
            live: HashMap::new(),
            failures_to_inject: 0,
            uploads: 0,
            releases: 0,
        }
    }

    /// Makes the next `count` non-empty uploads fail with `OutOfMemory`.
    pub fn fail_next_uploads(&mut self, count: u32) {
        self.failures_to_inject = count;
    }

    /// Number of successful uploads so far.
    pub fn upload_count(&self) -> u64 {
        self.uploads
    }

    pub fn release_count(&self) -> u64 {
        self.releases
    }

    /// Vertex bytes held by meshes not yet released.
    pub fn live_vertex_bytes(&self) -> u64 {
        self.live.values().map(|&bytes| bytes as u64).sum()
    }
}

impl Default for HeadlessMeshUploader {
    fn default() -> Self {
        Self::new()
    }
}

impl MeshUploader for HeadlessMeshUploader {
    fn upload(&mut self, mesh: &Mesh) -> Result<GpuMesh, UploadError> {
        if mesh.is_empty() {
            return Ok(GpuMesh::default());
        }
        if self.failures_to_inject > 0 {
            self.failures_to_inject -= 1;
            return Err(UploadError::OutOfMemory("injected failure".to_string()));
        }
        let vertex_location = self.next_location;
        let index_location = self.next_location + 1;
        self.next_location += 2;

        let gpu_mesh = GpuMesh::describe(mesh, vertex_location, index_location);
        self.live.insert(vertex_location, gpu_mesh.vbv.size_in_bytes);
        self.uploads += 1;
        Ok(gpu_mesh)
    }

    fn release(&mut self, mesh: GpuMesh) {
        if mesh.is_empty() {
            return;
        }
        if self.live.remove(&mesh.vbv.buffer_location).is_some() {
            self.releases += 1;
        } else {
            debug!("Released unknown mesh at {}", mesh.vbv.buffer_location);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::Block;
    use cgmath::Point3;

    #[test]
    fn test_empty_mesh_gives_empty_views() {
        let mut uploader = HeadlessMeshUploader::new();
        let gpu = uploader.upload(&Mesh::new()).unwrap();
        assert!(gpu.is_empty());
        assert_eq!(gpu, GpuMesh::default());
        assert_eq!(uploader.upload_count(), 0);
    }

    #[test]
    fn test_upload_describes_sizes() {
        let mut uploader = HeadlessMeshUploader::new();
        let cube = Mesh::textured_cube(Block::Sand, Point3::new(0.0, 0.0, 0.0));
        let gpu = uploader.upload(&cube).unwrap();
        assert_eq!(gpu.vbv.size_in_bytes, 24 * 40);
        assert_eq!(gpu.vbv.stride_in_bytes, 40);
        assert_eq!(gpu.ibv.size_in_bytes, 36 * 4);
        assert_eq!(gpu.index_count, 36);
        assert_eq!(uploader.live_vertex_bytes(), 960);

        uploader.release(gpu);
        assert_eq!(uploader.live_vertex_bytes(), 0);
        assert_eq!(uploader.release_count(), 1);
    }

    #[test]
    fn test_injected_failures() {
        let mut uploader = HeadlessMeshUploader::new();
        uploader.fail_next_uploads(1);
        let cube = Mesh::textured_cube(Block::Sand, Point3::new(0.0, 0.0, 0.0));
        assert!(matches!(uploader.upload(&cube), Err(UploadError::OutOfMemory(_))));
        assert!(uploader.upload(&cube).is_ok());
    }
}
