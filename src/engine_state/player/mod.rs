//! # Player
//!
//! Kinematic first-person player: collision helpers against the block grid,
//! the per-frame controller, and block picking and editing.

pub mod collision;
mod controller;

pub use controller::{BlockHit, PlayerConstants, PlayerController, PlayerInputs, GRAVITY};
