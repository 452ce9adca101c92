//! # Player Camera
//!
//! The view is built straight from the player's eye position and orientation
//! quaternion; there is no separate yaw/pitch state. `Projection` holds the
//! perspective settings for the current viewport and folds in the conversion
//! to wgpu's `[0, 1]` depth range.

use cgmath::{perspective, InnerSpace, Matrix4, Point3, Quaternion, Rad, Vector3};

/// Maps cgmath's `[-1, 1]` clip-space depth onto wgpu's `[0, 1]`.
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// Direction the camera looks along with an identity orientation.
pub const FORWARD_BASIS: Vector3<f32> = Vector3::new(0.0, 0.0, -1.0);

/// Snapshot of the player's eye for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// World-space eye position
    pub eye: Point3<f32>,
    /// Rotation applied to [`FORWARD_BASIS`] and the +Y up axis
    pub orientation: Quaternion<f32>,
}

impl Camera {
    pub fn new(eye: Point3<f32>, orientation: Quaternion<f32>) -> Self {
        Self { eye, orientation }
    }

    /// Normalized direction the camera faces.
    pub fn forward(&self) -> Vector3<f32> {
        (self.orientation * FORWARD_BASIS).normalize()
    }

    pub fn up(&self) -> Vector3<f32> {
        (self.orientation * Vector3::unit_y()).normalize()
    }

    /// World-to-view matrix.
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_to_rh(self.eye, self.forward(), self.up())
    }
}

/// Perspective settings of the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    aspect: f32,
    fovy: Rad<f32>,
    znear: f32,
    zfar: f32,
}

impl Projection {
    /// # Arguments
    /// * `width`, `height` - Viewport size in pixels; a zero height is treated as 1
    /// * `fovy` - Vertical field of view
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width as f32 / height.max(1) as f32,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// View-to-clip matrix in wgpu's depth convention.
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}
