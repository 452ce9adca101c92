//! # Shader Constant Blocks
//!
//! Per-frame data the world shaders read. Layouts are `#[repr(C)]` and made
//! of 16-byte rows so they can be copied into uniform buffers as-is.
//!
//! We can't use cgmath with bytemuck directly, so matrices are stored as
//! `[[f32; 4]; 4]` column arrays.

use cgmath::{EuclideanSpace, InnerSpace, Matrix, Matrix4, Point3, SquareMatrix, Vector3};

use crate::config::LightingConfig;
use crate::engine_state::camera_state::{Camera, Projection, OPENGL_TO_WGPU_MATRIX};

/// Model, normal and projection matrices (binding 0).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TransformConstants {
    pub model: [[f32; 4]; 4],
    /// Inverse transpose of `model`, for normals
    pub model_inverse_transpose: [[f32; 4]; 4],
    pub model_view_projection: [[f32; 4]; 4],
    pub dir_light_view_projection: [[f32; 4]; 4],
}

impl TransformConstants {
    pub fn new(
        model: Matrix4<f32>,
        camera: &Camera,
        projection: &Projection,
        dir_light_view_projection: Matrix4<f32>,
    ) -> Self {
        let model_inverse_transpose = model
            .invert()
            .map(|inverse| inverse.transpose())
            .unwrap_or_else(Matrix4::identity);
        let model_view_projection = projection.projection_matrix() * camera.view_matrix() * model;
        Self {
            model: model.into(),
            model_inverse_transpose: model_inverse_transpose.into(),
            model_view_projection: model_view_projection.into(),
            dir_light_view_projection: dir_light_view_projection.into(),
        }
    }
}

/// Selection highlight and lighting (binding 1).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneConstants {
    pub selected_block_world_pos: [i32; 3],
    pub is_selecting_block: i32,
    pub select_color: [f32; 4],
    pub dir_light_dir: [f32; 3],
    pub _pad0: f32,
    pub dir_light_color: [f32; 4],
    pub ambient_light_color: [f32; 4],
    pub cast_shadow: i32,
    pub _pad1: [f32; 3],
    pub shadow_color: [f32; 4],
}

impl SceneConstants {
    /// # Arguments
    /// * `selected_block` - World position of the block the player looks at, if any
    pub fn new(lighting: &LightingConfig, selected_block: Option<Vector3<i32>>) -> Self {
        let dir_light_dir = Vector3::from(lighting.dir_light_dir);
        let dir_light_dir = if dir_light_dir.magnitude2() > 0.0 {
            dir_light_dir.normalize()
        } else {
            -Vector3::unit_y()
        };
        Self {
            selected_block_world_pos: selected_block.map(Into::into).unwrap_or([0; 3]),
            is_selecting_block: selected_block.is_some() as i32,
            select_color: lighting.select_color,
            dir_light_dir: dir_light_dir.into(),
            _pad0: 0.0,
            dir_light_color: lighting.dir_light_color,
            ambient_light_color: lighting.ambient_light_color,
            cast_shadow: lighting.cast_shadow as i32,
            _pad1: [0.0; 3],
            shadow_color: lighting.shadow_color,
        }
    }
}

/// Orthographic view-projection of the directional light, covering a cube
/// of half-size `extent` centred on `center`.
pub fn dir_light_view_projection(
    center: Point3<f32>,
    light_dir: Vector3<f32>,
    extent: f32,
) -> Matrix4<f32> {
    let light_dir = if light_dir.magnitude2() > 0.0 {
        light_dir.normalize()
    } else {
        -Vector3::unit_y()
    };
    let up = if light_dir.y.abs() > 0.99 {
        Vector3::unit_z()
    } else {
        Vector3::unit_y()
    };
    let eye = Point3::from_vec(center.to_vec() - light_dir * extent);
    let view = Matrix4::look_to_rh(eye, light_dir, up);
    let projection = cgmath::ortho(-extent, extent, -extent, extent, 0.0, 2.0 * extent);
    OPENGL_TO_WGPU_MATRIX * projection * view
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector4;

    #[test]
    fn test_layouts_match_shader_blocks() {
        assert_eq!(std::mem::size_of::<TransformConstants>(), 256);
        assert_eq!(std::mem::size_of::<SceneConstants>(), 112);
    }

    #[test]
    fn test_selection_flag() {
        let lighting = LightingConfig::default();
        let none = SceneConstants::new(&lighting, None);
        assert_eq!(none.is_selecting_block, 0);

        let some = SceneConstants::new(&lighting, Some(Vector3::new(3, 40, -2)));
        assert_eq!(some.is_selecting_block, 1);
        assert_eq!(some.selected_block_world_pos, [3, 40, -2]);
        assert!((Vector3::from(some.dir_light_dir).magnitude() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_light_volume_centre_lands_mid_depth() {
        let center = Point3::new(100.0, 60.0, 100.0);
        let vp = dir_light_view_projection(center, Vector3::new(-0.4, -1.0, -0.3), 64.0);
        let clip = vp * Vector4::new(center.x, center.y, center.z, 1.0);
        assert!(clip.x.abs() < 1e-3 && clip.y.abs() < 1e-3);
        assert!((clip.z - 0.5).abs() < 1e-3);
    }
}
