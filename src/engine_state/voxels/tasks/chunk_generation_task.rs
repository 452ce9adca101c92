//! # Chunk Generation Task
//!
//! Generates one chunk's blocks from noise, builds its surface mesh, and
//! publishes both through the chunk's shared payload cell.
//!
//! The task only runs after the caller has claimed the chunk with
//! [`AtomicGenerationState::try_begin_creating`]. If generation unwinds, the
//! claim is handed back so the chunk is retried on a later frame instead of
//! staying in `CreatingParallel` forever.

use std::sync::Arc;

use log::debug;
use web_time::{Duration, Instant};

use crate::core::MtResource;
use crate::engine_state::diagnostics::Diagnostics;
use crate::engine_state::rendering::meshing::{build_surface_mesh, Mesh};
use crate::engine_state::task_management::task::{Task, TaskResult};
use crate::engine_state::voxels::chunk::{Chunk, TerrainParams};
use crate::engine_state::voxels::generation_state::AtomicGenerationState;
use crate::engine_state::voxels::{chunk_origin, ChunkIndex};

/// A generated chunk and the mesh built from it.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkPayload {
    pub chunk: Chunk,
    pub mesh: Mesh,
}

impl ChunkPayload {
    /// Generates the chunk at `chunk_index` and meshes it in world space.
    pub fn generate(chunk_index: ChunkIndex, params: &TerrainParams) -> Self {
        let origin = chunk_origin(chunk_index);
        let chunk = Chunk::create_from_noise(chunk_index, params);
        let mesh = build_surface_mesh(&chunk, origin.map(|c| c as f32));
        Self { chunk, mesh }
    }
}

/// Resets a claimed chunk to `NotYet` unless disarmed.
pub(crate) struct CreatingGuard<'a> {
    state: &'a AtomicGenerationState,
    armed: bool,
}

impl<'a> CreatingGuard<'a> {
    pub(crate) fn new(state: &'a AtomicGenerationState) -> Self {
        Self { state, armed: true }
    }

    pub(crate) fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for CreatingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.state.abandon_creating();
        }
    }
}

/// Generates and meshes one claimed chunk.
pub struct ChunkGenerationTask {
    chunk_index: ChunkIndex,
    params: TerrainParams,
    state: Arc<AtomicGenerationState>,
    payload: MtResource<Option<ChunkPayload>>,
}

impl ChunkGenerationTask {
    /// # Arguments
    /// * `state` - The chunk's state, already moved to `CreatingParallel` by the caller
    /// * `payload` - Where the generated chunk and mesh are stored
    pub fn new(
        chunk_index: ChunkIndex,
        params: TerrainParams,
        state: Arc<AtomicGenerationState>,
        payload: MtResource<Option<ChunkPayload>>,
    ) -> Self {
        ChunkGenerationTask {
            chunk_index,
            params,
            state,
            payload,
        }
    }

    /// Does the work on the calling thread and moves the chunk to
    /// `FinishedParallel`.
    pub fn generate(&self) -> ChunkGenerationReport {
        let guard = CreatingGuard::new(&self.state);
        let start = Instant::now();

        let payload = ChunkPayload::generate(self.chunk_index, &self.params);
        let face_count = payload.mesh.face_count();
        *self.payload.get_mut() = Some(payload);

        guard.disarm();
        self.state.finish_parallel();

        ChunkGenerationReport {
            chunk_index: self.chunk_index,
            face_count,
            elapsed: start.elapsed(),
        }
    }
}

impl Task for ChunkGenerationTask {
    fn process(&self) -> Box<dyn TaskResult + Send> {
        Box::new(self.generate())
    }
}

/// What a finished generation reports back to the main thread.
#[derive(Debug, Clone, Copy)]
pub struct ChunkGenerationReport {
    pub chunk_index: ChunkIndex,
    pub face_count: usize,
    pub elapsed: Duration,
}

impl TaskResult for ChunkGenerationReport {
    fn handle_result(self: Box<Self>, diagnostics: &mut Diagnostics) {
        debug!(
            "Generated chunk ({}, {}) with {} faces in {:.2?}",
            self.chunk_index.x, self.chunk_index.y, self.face_count, self.elapsed
        );
        diagnostics.chunks_generated += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorldConfig;
    use crate::engine_state::task_management::TaskManager;
    use crate::engine_state::voxels::ChunkGenerationState;
    use cgmath::Vector2;
    use std::panic::{self, AssertUnwindSafe};

    fn params() -> TerrainParams {
        TerrainParams::from_config(&WorldConfig::default(), 7)
    }

    #[test]
    fn test_generate_publishes_payload() {
        let state = Arc::new(AtomicGenerationState::new());
        let payload = MtResource::new(None);
        assert!(state.try_begin_creating());

        let task = ChunkGenerationTask::new(Vector2::new(1, 2), params(), state.clone(), payload.clone());
        let report = task.generate();

        assert_eq!(state.load(), ChunkGenerationState::FinishedParallel);
        let guard = payload.get();
        let stored = guard.as_ref().expect("payload written");
        assert_eq!(stored.mesh.face_count(), report.face_count);
        assert_eq!(stored, &ChunkPayload::generate(Vector2::new(1, 2), &params()));
    }

    #[test]
    fn test_guard_hands_claim_back_on_unwind() {
        let state = AtomicGenerationState::new();
        assert!(state.try_begin_creating());

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let _guard = CreatingGuard::new(&state);
            panic!("generation failed");
        }));

        assert!(result.is_err());
        assert_eq!(state.load(), ChunkGenerationState::NotYet);
    }

    #[test]
    fn test_panicking_generation_on_a_worker_releases_the_chunk() {
        let state = Arc::new(AtomicGenerationState::new());
        let payload = MtResource::new(None);
        assert!(state.try_begin_creating());

        // Far enough out that the chunk origin overflows.
        let unaddressable = Vector2::new(i32::MAX / 4, 0);
        let mut pool = TaskManager::new(1);
        let mut diagnostics = Diagnostics::default();
        pool.publish_task(Box::new(ChunkGenerationTask::new(
            unaddressable,
            params(),
            state.clone(),
            payload.clone(),
        )));

        let deadline = Instant::now() + Duration::from_secs(10);
        while pool.pending_task_count() > 0 {
            pool.process_completed_tasks(&mut diagnostics);
            assert!(Instant::now() < deadline, "worker never reported back");
            std::thread::sleep(Duration::from_millis(1));
        }

        assert_eq!(diagnostics.worker_panics, 1);
        assert_eq!(diagnostics.chunks_generated, 0);
        assert_eq!(state.load(), ChunkGenerationState::NotYet);
        assert!(payload.get().is_none());
        // The chunk can be claimed again.
        assert!(state.try_begin_creating());
    }

    #[test]
    fn test_report_counts_generated_chunks() {
        let mut diagnostics = Diagnostics::default();
        let report = ChunkGenerationReport {
            chunk_index: Vector2::new(0, 0),
            face_count: 12,
            elapsed: Duration::from_millis(3),
        };
        Box::new(report).handle_result(&mut diagnostics);
        assert_eq!(diagnostics.chunks_generated, 1);
    }
}
