//! # Errors
//!
//! Typed failures surfaced by the world and player code.
//!
//! Three kinds of failure are distinguished:
//! - **Transient** ([`UploadError`]): the graphics collaborator could not take a
//!   mesh right now. Nothing advances; the same call may be retried next frame.
//! - **Validation** ([`EditError`]): a mine/place request targets something it
//!   is not allowed to touch. Nothing is mutated.
//! - **Invariant violations** are not represented here. They `panic!`.

use cgmath::{Vector2, Vector3};
use thiserror::Error;

/// The mesh uploader could not create GPU buffers for a mesh.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UploadError {
    #[error("out of GPU memory while uploading mesh: {0}")]
    OutOfMemory(String),
    #[error("graphics device lost: {0}")]
    DeviceLost(String),
    #[error("mesh upload rejected: {0}")]
    Rejected(String),
}

/// A block edit was refused. The world is unchanged.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EditError {
    #[error("not looking at any block")]
    NoTarget,
    #[error("no face to place against")]
    NoFace,
    #[error("block {0:?} is outside the world bounds")]
    OutOfWorld(Vector3<i32>),
    #[error("chunk {0:?} has not finished generating")]
    ChunkNotReady(Vector2<i32>),
    #[error("block {0:?} is already occupied")]
    TargetOccupied(Vector3<i32>),
    #[error("block {0:?} would overlap the player")]
    OverlapsPlayer(Vector3<i32>),
    #[error("edit is cooling down")]
    CoolingDown,
    #[error(transparent)]
    Upload(#[from] UploadError),
}

/// Engine configuration could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}
