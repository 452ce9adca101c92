//! # Camera State
//!
//! View and projection matrices for the first-person view.
//!
//! The camera has no controller of its own: it is rebuilt every frame from
//! the player's eye position and orientation.

pub mod camera;

pub use camera::{Camera, Projection, OPENGL_TO_WGPU_MATRIX};
