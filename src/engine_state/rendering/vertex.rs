//! Vertex data structures and layouts for voxel rendering.
//!
//! This module defines the vertex format shared by chunk meshes and the
//! textured cube, and its wgpu buffer layout.

use cgmath::{Point3, Vector3};

/// A vertex in the voxel rendering pipeline.
///
/// # Memory Layout
/// - Position: [f32; 4] (16 bytes), `w` is always 1
/// - UV: [f32; 2] (8 bytes), coordinates inside the block's face atlas
/// - Normal: [f32; 3] (12 bytes), one of the six axis unit vectors
/// - Texture Index: u32 (4 bytes), the block value, used as texture-array slice
///
/// Total size: 40 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 4],
    pub uv: [f32; 2],
    pub normal: [f32; 3],
    pub texture_index: u32,
}

impl Vertex {
    /// Creates a new vertex with the given parameters.
    ///
    /// # Arguments
    /// * `position` - World-space position
    /// * `uv` - Texture coordinates inside the block texture
    /// * `normal` - Outward face normal
    /// * `texture_index` - Index of the texture in the texture array
    pub fn new(position: Point3<f32>, uv: [f32; 2], normal: Vector3<i32>, texture_index: u32) -> Self {
        Vertex {
            position: [position.x, position.y, position.z, 1.0],
            uv,
            normal: [normal.x as f32, normal.y as f32, normal.z as f32],
            texture_index,
        }
    }

    pub fn position3(&self) -> Point3<f32> {
        Point3::new(self.position[0], self.position[1], self.position[2])
    }

    pub fn normal3(&self) -> Vector3<f32> {
        Vector3::new(self.normal[0], self.normal[1], self.normal[2])
    }

    /// Returns the vertex buffer layout description for the shader pipeline.
    ///
    /// # Shader Attributes
    /// - `location = 0`: position (vec4<f32>)
    /// - `location = 1`: uv (vec2<f32>)
    /// - `location = 2`: normal (vec3<f32>)
    /// - `location = 3`: texture_index (u32)
    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
            0 => Float32x4,
            1 => Float32x2,
            2 => Float32x3,
            3 => Uint32
        ];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<Vertex>(), 40);
        let layout = Vertex::desc();
        assert_eq!(layout.array_stride, 40);
        assert_eq!(layout.attributes[3].offset, 36);
    }
}
