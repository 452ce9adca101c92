//! # Chunks Manager
//!
//! Owns every chunk of the world grid and streams them around the player.
//!
//! ## Lifecycle of a chunk
//!
//! 1. The chunk enters the draw window while still `NotYet`.
//! 2. [`ChunksManager::update_draw_window`] claims it with a CAS and either
//!    publishes a [`ChunkGenerationTask`] to the worker pool or runs the task
//!    inline.
//! 3. Once the task has stored blocks and mesh, the state is
//!    `FinishedParallel` and the next window update uploads the mesh on the
//!    main thread, moving the chunk to `FinishedAll`.
//! 4. Only `FinishedAll` chunks contribute GPU views to the draw lists.
//!
//! Chunks leaving the window keep their data and buffers, so walking back
//! over old ground costs nothing.

use std::sync::Arc;

use cgmath::Vector3;
use log::{debug, warn};

use super::block::Block;
use super::chunk::{Chunk, TerrainParams, CHUNK_DIMENSION_Y};
use super::generation_state::{AtomicGenerationState, ChunkGenerationState};
use super::tasks::{ChunkGenerationTask, ChunkPayload};
use super::{
    block_of_local, chunk_index_of_block, chunk_origin, local_of_block, ChunkIndex, ChunkSource,
    GridExtent, WorldBounds,
};
use crate::config::WorldConfig;
use crate::core::MtResource;
use crate::engine_state::diagnostics::Diagnostics;
use crate::engine_state::rendering::mesh_uploader::{
    GpuMesh, IndexBufferView, MeshUploader, VertexBufferView,
};
use crate::engine_state::rendering::meshing::{build_surface_mesh, Mesh};
use crate::engine_state::task_management::task::TaskResult;
use crate::engine_state::task_management::TaskManager;
use crate::error::{EditError, UploadError};

/// The square of chunks around the player that are generated and drawn.
///
/// Both ranges are inclusive and clamped to the grid; a range with
/// `min > max` on either axis is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawChunksIndexRangeInfo {
    pub min: ChunkIndex,
    pub max: ChunkIndex,
}

impl DrawChunksIndexRangeInfo {
    /// The window of radius `draw_distance` around `center`, clamped to `extent`.
    pub fn around(center: ChunkIndex, draw_distance: i32, extent: GridExtent) -> Self {
        Self {
            min: ChunkIndex::new((center.x - draw_distance).max(0), (center.y - draw_distance).max(0)),
            max: ChunkIndex::new(
                (center.x + draw_distance).min(extent.chunk_count_x - 1),
                (center.y + draw_distance).min(extent.chunk_count_z - 1),
            ),
        }
    }

    pub fn width(&self) -> usize {
        (self.max.x - self.min.x + 1).max(0) as usize
    }

    pub fn depth(&self) -> usize {
        (self.max.y - self.min.y + 1).max(0) as usize
    }

    pub fn cell_count(&self) -> usize {
        self.width() * self.depth()
    }

    pub fn contains(&self, chunk_index: ChunkIndex) -> bool {
        (self.min.x..=self.max.x).contains(&chunk_index.x)
            && (self.min.y..=self.max.y).contains(&chunk_index.y)
    }

    /// Position of `chunk_index` in the packed window, x-major.
    pub fn window_position(&self, chunk_index: ChunkIndex) -> Option<usize> {
        self.contains(chunk_index).then(|| {
            (chunk_index.x - self.min.x) as usize * self.depth() + (chunk_index.y - self.min.y) as usize
        })
    }

    /// Every chunk index in the window, `x` outer and `z` inner.
    pub fn iter(&self) -> impl Iterator<Item = ChunkIndex> {
        let Self { min, max } = *self;
        (min.x..=max.x).flat_map(move |cx| (min.y..=max.y).map(move |cz| ChunkIndex::new(cx, cz)))
    }
}

/// Borrowed, packed draw lists for one frame. Entry `i` of each slice
/// belongs to the same chunk.
#[derive(Debug, Clone, Copy)]
pub struct DrawLists<'a> {
    pub vbvs: &'a [VertexBufferView],
    pub ibvs: &'a [IndexBufferView],
    pub index_counts: &'a [u32],
}

impl DrawLists<'_> {
    pub fn len(&self) -> usize {
        self.vbvs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vbvs.is_empty()
    }

    /// Number of cells that actually draw something.
    pub fn drawable_count(&self) -> usize {
        self.vbvs.iter().filter(|vbv| !vbv.is_empty()).count()
    }
}

/// Everything the manager keeps for one grid cell.
struct ChunkSlot {
    state: Arc<AtomicGenerationState>,
    payload: MtResource<Option<ChunkPayload>>,
    gpu_mesh: GpuMesh,
}

impl ChunkSlot {
    fn new() -> Self {
        Self {
            state: Arc::new(AtomicGenerationState::new()),
            payload: MtResource::new(None),
            gpu_mesh: GpuMesh::default(),
        }
    }
}

/// Streaming owner of the chunk grid.
pub struct ChunksManager {
    bounds: WorldBounds,
    terrain: TerrainParams,
    draw_distance: i32,
    slots: Vec<ChunkSlot>,
    draw_range: DrawChunksIndexRangeInfo,
    draw_window: Vec<GpuMesh>,
    packed_vbvs: Vec<VertexBufferView>,
    packed_ibvs: Vec<IndexBufferView>,
    packed_index_counts: Vec<u32>,
    task_manager: TaskManager,
    diagnostics: Diagnostics,
}

impl ChunksManager {
    /// Creates the grid described by `config` with every chunk `NotYet`.
    ///
    /// Worker threads are only started when `config.allow_parallel` is set.
    pub fn new(config: &WorldConfig, seed: u32) -> Self {
        let extent = GridExtent::new(config.chunk_count_x, config.chunk_count_z);
        let num_workers = if config.allow_parallel {
            config.resolve_worker_count()
        } else {
            0
        };
        let slots = (0..extent.chunk_count()).map(|_| ChunkSlot::new()).collect();
        let draw_range = DrawChunksIndexRangeInfo::around(ChunkIndex::new(0, 0), config.draw_distance as i32, extent);

        ChunksManager {
            bounds: WorldBounds::new(extent, config.edge_margin),
            terrain: TerrainParams::from_config(config, seed),
            draw_distance: config.draw_distance as i32,
            slots,
            draw_range,
            draw_window: Vec::new(),
            packed_vbvs: Vec::new(),
            packed_ibvs: Vec::new(),
            packed_index_counts: Vec::new(),
            task_manager: TaskManager::new(num_workers),
            diagnostics: Diagnostics::default(),
        }
    }

    pub fn terrain(&self) -> &TerrainParams {
        &self.terrain
    }

    pub fn draw_distance(&self) -> i32 {
        self.draw_distance
    }

    pub fn draw_range(&self) -> DrawChunksIndexRangeInfo {
        self.draw_range
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn diagnostics_mut(&mut self) -> &mut Diagnostics {
        &mut self.diagnostics
    }

    fn slot(&self, chunk_index: ChunkIndex) -> Option<&ChunkSlot> {
        self.bounds.extent.slot_of(chunk_index).map(|slot| &self.slots[slot])
    }

    /// Lifecycle state of a chunk, or `None` outside the grid.
    pub fn chunk_state(&self, chunk_index: ChunkIndex) -> Option<ChunkGenerationState> {
        self.slot(chunk_index).map(|slot| slot.state.load())
    }

    /// GPU views of a chunk; default for chunks that are not uploaded.
    pub fn gpu_mesh(&self, chunk_index: ChunkIndex) -> GpuMesh {
        self.slot(chunk_index)
            .filter(|slot| slot.state.load() == ChunkGenerationState::FinishedAll)
            .map(|slot| slot.gpu_mesh)
            .unwrap_or_default()
    }

    /// Runs `f` on the cached mesh of a generated chunk.
    pub fn with_mesh<R>(&self, chunk_index: ChunkIndex, f: impl FnOnce(&Mesh) -> R) -> Option<R> {
        let slot = self.slot(chunk_index)?;
        if !slot.state.load().has_payload() {
            return None;
        }
        slot.payload.get().as_ref().map(|payload| f(&payload.mesh))
    }

    /// Moves the draw window to `player_chunk_index`, starts generation of
    /// new chunks in it, and uploads chunks whose generation has finished.
    ///
    /// Every chunk in the window is visited even after an upload fails; the
    /// first failure is returned and the failed chunks are retried on the
    /// next call.
    pub fn update_draw_window(
        &mut self,
        player_chunk_index: ChunkIndex,
        allow_parallel: bool,
        mesh_uploader: &mut dyn MeshUploader,
    ) -> Result<(), UploadError> {
        self.task_manager.process_completed_tasks(&mut self.diagnostics);

        let draw_range = DrawChunksIndexRangeInfo::around(player_chunk_index, self.draw_distance, self.bounds.extent);
        if draw_range != self.draw_range {
            debug!(
                "Draw window moved to ({}, {})..=({}, {})",
                draw_range.min.x, draw_range.min.y, draw_range.max.x, draw_range.max.y
            );
            self.draw_range = draw_range;
        }

        // Nearest chunks first, so the worker queue starts under the player.
        let mut by_distance: Vec<ChunkIndex> = draw_range.iter().collect();
        by_distance.sort_by_key(|chunk_index| {
            let offset = *chunk_index - player_chunk_index;
            offset.x.abs().max(offset.y.abs())
        });

        let mut first_error = None;
        for chunk_index in by_distance {
            let Some(slot) = self.bounds.extent.slot_of(chunk_index) else {
                continue;
            };
            if self.slots[slot].state.load() == ChunkGenerationState::NotYet {
                self.start_generation(slot, chunk_index, allow_parallel);
            }
            if self.slots[slot].state.load() == ChunkGenerationState::FinishedParallel {
                if let Err(err) = self.upload_slot(slot, chunk_index, mesh_uploader) {
                    first_error.get_or_insert(err);
                }
            }
        }

        self.task_manager.process_backlog();
        self.refresh_draw_window();

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Generates every missing chunk within `radius` of `center` on the
    /// calling thread.
    ///
    /// Returns whether all of those chunks have block data afterwards. A
    /// chunk that a worker has already claimed is left to the worker and
    /// makes the result `false` until it is done.
    pub fn generate_around_now(&mut self, center: ChunkIndex, radius: i32) -> bool {
        self.task_manager.process_completed_tasks(&mut self.diagnostics);

        let range = DrawChunksIndexRangeInfo::around(center, radius, self.bounds.extent);
        let mut ready = true;
        for chunk_index in range.iter() {
            let Some(slot) = self.bounds.extent.slot_of(chunk_index) else {
                continue;
            };
            if self.slots[slot].state.load() == ChunkGenerationState::NotYet {
                self.start_generation(slot, chunk_index, false);
            }
            ready &= self.slots[slot].state.load().has_payload();
        }
        ready
    }

    fn start_generation(&mut self, slot: usize, chunk_index: ChunkIndex, allow_parallel: bool) {
        let ChunkSlot { state, payload, .. } = &self.slots[slot];
        if !state.try_begin_creating() {
            return;
        }
        let task = ChunkGenerationTask::new(chunk_index, self.terrain, state.clone(), payload.clone());

        if allow_parallel && self.task_manager.worker_count() > 0 {
            self.task_manager.publish_task(Box::new(task));
        } else {
            Box::new(task.generate()).handle_result(&mut self.diagnostics);
        }
    }

    fn upload_slot(
        &mut self,
        slot: usize,
        chunk_index: ChunkIndex,
        mesh_uploader: &mut dyn MeshUploader,
    ) -> Result<(), UploadError> {
        let slot = &mut self.slots[slot];
        let uploaded = match slot.payload.get().as_ref() {
            Some(payload) => mesh_uploader.upload(&payload.mesh),
            None => panic!("chunk {chunk_index:?} finished generating without a payload"),
        };

        match uploaded {
            Ok(gpu_mesh) => {
                slot.gpu_mesh = gpu_mesh;
                slot.state.finish_all();
                self.diagnostics.chunks_uploaded += 1;
                Ok(())
            }
            Err(err) => {
                warn!(
                    "Uploading chunk ({}, {}) failed, retrying next frame: {err}",
                    chunk_index.x, chunk_index.y
                );
                self.diagnostics.upload_failures += 1;
                Err(err)
            }
        }
    }

    fn refresh_draw_window(&mut self) {
        let draw_window = self
            .draw_range
            .iter()
            .map(|chunk_index| self.gpu_mesh(chunk_index))
            .collect();
        self.draw_window = draw_window;
    }

    /// Chunks in the draw window that are not uploaded yet.
    pub fn pending_chunk_count(&self) -> usize {
        self.draw_range
            .iter()
            .filter(|&chunk_index| {
                self.chunk_state(chunk_index)
                    .is_some_and(|state| state != ChunkGenerationState::FinishedAll)
            })
            .count()
    }

    /// Whether some chunk in the draw window still needs generating or uploading.
    pub fn has_pending_chunks(&self) -> bool {
        self.pending_chunk_count() > 0
    }

    /// Replaces one block of an uploaded chunk, then remeshes and re-uploads
    /// that chunk.
    ///
    /// If the upload fails the block is restored and the old buffers stay in
    /// use. Setting a block to its current value does nothing.
    pub fn update_chunk_block(
        &mut self,
        chunk_index: ChunkIndex,
        local_pos: Vector3<i32>,
        new_block: Block,
        mesh_uploader: &mut dyn MeshUploader,
    ) -> Result<(), EditError> {
        let slot = self
            .bounds
            .extent
            .slot_of(chunk_index)
            .ok_or(EditError::ChunkNotReady(chunk_index))?;
        if !Chunk::contains_local(local_pos.x, local_pos.y, local_pos.z) {
            return Err(EditError::OutOfWorld(block_of_local(chunk_index, local_pos)));
        }

        let slot = &mut self.slots[slot];
        if slot.state.load() != ChunkGenerationState::FinishedAll {
            return Err(EditError::ChunkNotReady(chunk_index));
        }

        let mut payload_guard = slot.payload.get_mut();
        let Some(payload) = payload_guard.as_mut() else {
            panic!("chunk {chunk_index:?} is uploaded without a payload");
        };

        let previous = payload.chunk.get_at(local_pos);
        if previous == new_block {
            return Ok(());
        }
        payload.chunk.set_at(local_pos, new_block);
        let mesh = build_surface_mesh(&payload.chunk, chunk_origin(chunk_index).map(|c| c as f32));

        match mesh_uploader.upload(&mesh) {
            Ok(gpu_mesh) => {
                payload.mesh = mesh;
                drop(payload_guard);
                let old = std::mem::replace(&mut slot.gpu_mesh, gpu_mesh);
                mesh_uploader.release(old);
                if let Some(position) = self.draw_range.window_position(chunk_index) {
                    if let Some(cell) = self.draw_window.get_mut(position) {
                        *cell = gpu_mesh;
                    }
                }
                self.diagnostics.edits_applied += 1;
                Ok(())
            }
            Err(err) => {
                payload.chunk.set_at(local_pos, previous);
                warn!(
                    "Re-uploading chunk ({}, {}) after an edit failed: {err}",
                    chunk_index.x, chunk_index.y
                );
                self.diagnostics.upload_failures += 1;
                Err(err.into())
            }
        }
    }

    /// [`update_chunk_block`](Self::update_chunk_block) addressed by world block position.
    pub fn set_block_at_world(
        &mut self,
        block_pos: Vector3<i32>,
        new_block: Block,
        mesh_uploader: &mut dyn MeshUploader,
    ) -> Result<(), EditError> {
        if !(0..CHUNK_DIMENSION_Y).contains(&block_pos.y) {
            return Err(EditError::OutOfWorld(block_pos));
        }
        self.update_chunk_block(
            chunk_index_of_block(block_pos),
            local_of_block(block_pos),
            new_block,
            mesh_uploader,
        )
    }

    /// Refills the packed vertex buffer views from the draw window.
    pub fn pack_draw_vbvs(&mut self) -> &[VertexBufferView] {
        self.packed_vbvs.clear();
        self.packed_vbvs.extend(self.draw_window.iter().map(|mesh| mesh.vbv));
        &self.packed_vbvs
    }

    /// Refills the packed index buffer views from the draw window.
    pub fn pack_draw_ibvs(&mut self) -> &[IndexBufferView] {
        self.packed_ibvs.clear();
        self.packed_ibvs.extend(self.draw_window.iter().map(|mesh| mesh.ibv));
        &self.packed_ibvs
    }

    /// Refills the packed index counts from the draw window.
    pub fn pack_draw_indices_counts(&mut self) -> &[u32] {
        self.packed_index_counts.clear();
        self.packed_index_counts
            .extend(self.draw_window.iter().map(|mesh| mesh.index_count));
        &self.packed_index_counts
    }

    /// Packs all three lists at once.
    pub fn pack_draw_lists(&mut self) -> DrawLists<'_> {
        self.pack_draw_vbvs();
        self.pack_draw_ibvs();
        self.pack_draw_indices_counts();
        DrawLists {
            vbvs: &self.packed_vbvs,
            ibvs: &self.packed_ibvs,
            index_counts: &self.packed_index_counts,
        }
    }
}

impl ChunkSource for ChunksManager {
    fn world_bounds(&self) -> WorldBounds {
        self.bounds
    }

    /// Only chunks whose generation has finished are visible.
    fn with_chunk<R>(&self, chunk_index: ChunkIndex, f: impl FnOnce(&Chunk) -> R) -> Option<R> {
        let slot = self.slot(chunk_index)?;
        if !slot.state.load().has_payload() {
            return None;
        }
        slot.payload.get().as_ref().map(|payload| f(&payload.chunk))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::rendering::mesh_uploader::HeadlessMeshUploader;
    use cgmath::Vector2;

    fn small_config() -> WorldConfig {
        WorldConfig {
            chunk_count_x: 4,
            chunk_count_z: 3,
            draw_distance: 1,
            allow_parallel: false,
            ..WorldConfig::default()
        }
    }

    #[test]
    fn test_range_is_clamped_to_grid() {
        let extent = GridExtent::new(4, 3);
        let range = DrawChunksIndexRangeInfo::around(Vector2::new(0, 2), 1, extent);
        assert_eq!(range.min, Vector2::new(0, 1));
        assert_eq!(range.max, Vector2::new(1, 2));
        assert_eq!(range.cell_count(), 4);
        assert_eq!(range.window_position(Vector2::new(1, 1)), Some(2));
        assert_eq!(range.window_position(Vector2::new(2, 1)), None);
    }

    #[test]
    fn test_range_outside_grid_is_empty() {
        let extent = GridExtent::new(4, 3);
        let range = DrawChunksIndexRangeInfo::around(Vector2::new(-5, 1), 1, extent);
        assert_eq!(range.cell_count(), 0);
        assert_eq!(range.iter().count(), 0);
    }

    #[test]
    fn test_range_iterates_x_major() {
        let range = DrawChunksIndexRangeInfo::around(Vector2::new(1, 1), 1, GridExtent::new(4, 4));
        let cells: Vec<_> = range.iter().take(4).collect();
        assert_eq!(
            cells,
            vec![Vector2::new(0, 0), Vector2::new(0, 1), Vector2::new(0, 2), Vector2::new(1, 0)]
        );
    }

    #[test]
    fn test_synchronous_window_update_uploads_everything() {
        let mut manager = ChunksManager::new(&small_config(), 3);
        let mut uploader = HeadlessMeshUploader::new();

        manager
            .update_draw_window(Vector2::new(1, 1), false, &mut uploader)
            .expect("uploads succeed");

        assert!(!manager.has_pending_chunks());
        assert_eq!(manager.diagnostics().chunks_generated, 9);
        assert_eq!(manager.diagnostics().chunks_uploaded, 9);
        assert_eq!(manager.chunk_state(Vector2::new(3, 0)), Some(ChunkGenerationState::NotYet));

        let lists = manager.pack_draw_lists();
        assert_eq!(lists.len(), 9);
        assert_eq!(lists.drawable_count(), 9);
    }

    #[test]
    fn test_invisible_until_generated() {
        let manager = ChunksManager::new(&small_config(), 3);
        assert!(manager.with_chunk(Vector2::new(0, 0), |_| ()).is_none());
        assert_eq!(manager.block_at(Vector3::new(1, 0, 1)), Block::Air);
    }
}
