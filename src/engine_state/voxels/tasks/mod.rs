//! # Voxel Task System
//!
//! Background work on the voxel world. Tasks here run on the
//! [`TaskManager`](crate::engine_state::task_management::TaskManager) pool and
//! hand their output back through per-chunk shared state rather than through
//! the task result.

pub mod chunk_generation_task;

pub use chunk_generation_task::{ChunkGenerationReport, ChunkGenerationTask, ChunkPayload};
