//! # wgpu Mesh Uploader
//!
//! [`MeshUploader`] backed by a real `wgpu::Device`. Buffers are kept in a
//! registry keyed by the opaque locations handed out in the views, so the
//! world code never holds a `wgpu::Buffer` itself.
//!
//! Out-of-memory and validation failures during buffer creation are caught
//! with an error scope and reported as [`UploadError`]s instead of reaching
//! wgpu's uncaptured-error handler.

use std::collections::HashMap;

use log::warn;
use wgpu::util::DeviceExt;
use wgpu::{Buffer, Device, Queue};

use super::mesh_uploader::{GpuMesh, MeshUploader};
use super::meshing::Mesh;
use super::shader_data::{SceneConstants, TransformConstants};
use crate::engine_state::voxels::chunks_manager::DrawLists;
use crate::error::UploadError;

/// Usage and size of the buffers a [`WgpuMeshUploader`] currently owns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BufferAnalytics {
    /// Total memory allocated, in bytes
    pub allocated_memory: u64,
    /// Number of live buffers
    pub live_buffers: u64,
}

/// Uploads chunk meshes into wgpu vertex and index buffers.
pub struct WgpuMeshUploader {
    device: Device,
    buffers: HashMap<u64, Buffer>,
    next_location: u64,
    analytics: BufferAnalytics,
}

impl WgpuMeshUploader {
    pub fn new(device: Device) -> Self {
        Self {
            device,
            buffers: HashMap::new(),
            next_location: 1,
            analytics: BufferAnalytics::default(),
        }
    }

    pub fn analytics(&self) -> BufferAnalytics {
        self.analytics
    }

    pub fn buffer(&self, location: u64) -> Option<&Buffer> {
        self.buffers.get(&location)
    }

    fn create_buffer(
        &mut self,
        label: &str,
        contents: &[u8],
        usage: wgpu::BufferUsages,
    ) -> Result<u64, UploadError> {
        self.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents,
            usage,
        });
        let validation = pollster::block_on(self.device.pop_error_scope());
        let out_of_memory = pollster::block_on(self.device.pop_error_scope());

        if let Some(error) = out_of_memory.or(validation) {
            buffer.destroy();
            return Err(match error {
                wgpu::Error::OutOfMemory { .. } => UploadError::OutOfMemory(error.to_string()),
                other => UploadError::Rejected(other.to_string()),
            });
        }

        let location = self.next_location;
        self.next_location += 1;
        self.analytics.allocated_memory += buffer.size();
        self.analytics.live_buffers += 1;
        self.buffers.insert(location, buffer);
        Ok(location)
    }

    fn destroy_buffer(&mut self, location: u64) {
        match self.buffers.remove(&location) {
            Some(buffer) => {
                self.analytics.allocated_memory -= buffer.size();
                self.analytics.live_buffers -= 1;
                buffer.destroy();
            }
            None => warn!("Tried to release unknown buffer {location}"),
        }
    }

    /// Records one indexed draw per non-empty cell of `lists`.
    pub fn draw_chunks(&self, render_pass: &mut wgpu::RenderPass<'_>, lists: &DrawLists<'_>) {
        let cells = lists.vbvs.iter().zip(lists.ibvs).zip(lists.index_counts);
        for ((vbv, ibv), &index_count) in cells {
            if vbv.is_empty() {
                continue;
            }
            let (Some(vertex_buffer), Some(index_buffer)) = (
                self.buffers.get(&vbv.buffer_location),
                self.buffers.get(&ibv.buffer_location),
            ) else {
                warn!("Draw list references a released buffer");
                continue;
            };
            render_pass.set_vertex_buffer(0, vertex_buffer.slice(..));
            render_pass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..index_count, 0, 0..1);
        }
    }
}

impl MeshUploader for WgpuMeshUploader {
    fn upload(&mut self, mesh: &Mesh) -> Result<GpuMesh, UploadError> {
        if mesh.is_empty() {
            return Ok(GpuMesh::default());
        }
        let vertex_location = self.create_buffer(
            "Chunk Vertex Buffer",
            mesh.vertex_bytes(),
            wgpu::BufferUsages::VERTEX,
        )?;
        let index_location = match self.create_buffer(
            "Chunk Index Buffer",
            mesh.index_bytes(),
            wgpu::BufferUsages::INDEX,
        ) {
            Ok(location) => location,
            Err(err) => {
                self.destroy_buffer(vertex_location);
                return Err(err);
            }
        };
        Ok(GpuMesh::describe(mesh, vertex_location, index_location))
    }

    fn release(&mut self, mesh: GpuMesh) {
        if mesh.is_empty() {
            return;
        }
        self.destroy_buffer(mesh.vbv.buffer_location);
        self.destroy_buffer(mesh.ibv.buffer_location);
    }
}

/// The two uniform buffers the world shaders bind.
pub struct ConstantBuffers {
    pub transform: Buffer,
    pub scene: Buffer,
}

impl ConstantBuffers {
    pub fn new(device: &Device) -> Self {
        let transform = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Transform Constants"),
            contents: bytemuck::bytes_of(&<TransformConstants as bytemuck::Zeroable>::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let scene = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Scene Constants"),
            contents: bytemuck::bytes_of(&<SceneConstants as bytemuck::Zeroable>::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        Self { transform, scene }
    }

    pub fn write(&self, queue: &Queue, transform: &TransformConstants, scene: &SceneConstants) {
        queue.write_buffer(&self.transform, 0, bytemuck::bytes_of(transform));
        queue.write_buffer(&self.scene, 0, bytemuck::bytes_of(scene));
    }
}
