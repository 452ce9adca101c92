//! Chunk streaming, uploading and editing through the chunks manager.

mod common;

use std::time::Duration;

use cgmath::Vector3;
use voxel_world::config::WorldConfig;
use voxel_world::engine_state::rendering::{HeadlessMeshUploader, Vertex};
use voxel_world::engine_state::voxels::block::Block;
use voxel_world::engine_state::voxels::{
    chunk_index_of_block, local_of_block, ChunkGenerationState, ChunkIndex, ChunkSource,
    ChunksManager,
};
use voxel_world::error::{EditError, UploadError};

use common::small_world_config;

type MeshSnapshot = (Vec<Vertex>, Vec<u32>);

fn mesh_of(chunks: &ChunksManager, chunk_index: ChunkIndex) -> MeshSnapshot {
    chunks
        .with_mesh(chunk_index, |mesh| (mesh.vertices.clone(), mesh.indices.clone()))
        .expect("chunk has a mesh")
}

fn blocks_of(chunks: &ChunksManager, chunk_index: ChunkIndex) -> Vec<Block> {
    chunks
        .with_chunk(chunk_index, |chunk| chunk.blocks().to_vec())
        .expect("chunk is generated")
}

/// A 3×3 grid, fully streamed around its centre.
fn streamed_grid(uploader: &mut HeadlessMeshUploader) -> ChunksManager {
    let mut chunks = ChunksManager::new(&small_world_config(3, 1), 7);
    chunks
        .update_draw_window(ChunkIndex::new(1, 1), false, uploader)
        .unwrap();
    chunks
}

/// The top block of the column at world `(x, z)`.
fn surface_block(chunks: &ChunksManager, x: i32, z: i32) -> Vector3<i32> {
    Vector3::new(x, chunks.terrain().surface_height(x, z), z)
}

#[test]
fn worker_pool_matches_synchronous_generation() {
    let parallel_config = WorldConfig {
        allow_parallel: true,
        worker_count: Some(3),
        ..small_world_config(3, 1)
    };
    let mut parallel = ChunksManager::new(&parallel_config, 7);
    let mut parallel_uploader = HeadlessMeshUploader::new();
    let mut sync_uploader = HeadlessMeshUploader::new();
    let sync = streamed_grid(&mut sync_uploader);

    let center = ChunkIndex::new(1, 1);
    let mut rounds = 0;
    loop {
        parallel
            .update_draw_window(center, true, &mut parallel_uploader)
            .unwrap();
        if !parallel.has_pending_chunks() {
            break;
        }
        rounds += 1;
        assert!(rounds < 2000, "worker pool never finished the draw window");
        std::thread::sleep(Duration::from_millis(5));
    }

    for chunk_index in parallel.draw_range().iter() {
        assert_eq!(
            parallel.chunk_state(chunk_index),
            Some(ChunkGenerationState::FinishedAll)
        );
        assert!(blocks_of(&parallel, chunk_index) == blocks_of(&sync, chunk_index));
        assert!(mesh_of(&parallel, chunk_index) == mesh_of(&sync, chunk_index));
    }
    assert_eq!(parallel_uploader.upload_count(), sync_uploader.upload_count());
}

#[test]
fn chunks_around_a_point_can_be_generated_inline() {
    let config = WorldConfig {
        allow_parallel: true,
        worker_count: Some(2),
        ..small_world_config(5, 2)
    };
    let mut chunks = ChunksManager::new(&config, 7);
    let center = ChunkIndex::new(0, 3);

    assert!(chunks.generate_around_now(center, 1));
    assert_eq!(chunks.diagnostics().chunks_generated, 6);
    for cx in 0..=1 {
        for cz in 2..=4 {
            let state = chunks.chunk_state(ChunkIndex::new(cx, cz)).unwrap();
            assert_eq!(state, ChunkGenerationState::FinishedParallel);
        }
    }
    assert_eq!(
        chunks.chunk_state(ChunkIndex::new(2, 3)),
        Some(ChunkGenerationState::NotYet)
    );
    assert!(chunks.block_at(surface_block(&chunks, 8, 56)).is_solid());

    // A second call has nothing left to do.
    assert!(chunks.generate_around_now(center, 1));
    assert_eq!(chunks.diagnostics().chunks_generated, 6);
}

#[test]
fn failed_upload_is_retried_on_the_next_update() {
    let mut chunks = ChunksManager::new(&small_world_config(2, 0), 7);
    let mut uploader = HeadlessMeshUploader::new();
    let origin = ChunkIndex::new(0, 0);

    uploader.fail_next_uploads(1);
    let first = chunks.update_draw_window(origin, false, &mut uploader);
    assert!(matches!(first, Err(UploadError::OutOfMemory(_))));
    assert_eq!(
        chunks.chunk_state(origin),
        Some(ChunkGenerationState::FinishedParallel)
    );
    assert_eq!(chunks.diagnostics().upload_failures, 1);
    assert!(chunks.has_pending_chunks());
    {
        let lists = chunks.pack_draw_lists();
        assert_eq!(lists.len(), 1);
        assert_eq!(lists.drawable_count(), 0);
    }

    chunks.update_draw_window(origin, false, &mut uploader).unwrap();
    assert_eq!(
        chunks.chunk_state(origin),
        Some(ChunkGenerationState::FinishedAll)
    );
    assert_eq!(chunks.diagnostics().chunks_generated, 1);
    assert_eq!(chunks.diagnostics().chunks_uploaded, 1);
    assert_eq!(chunks.pack_draw_lists().drawable_count(), 1);
}

#[test]
fn draw_lists_cover_the_clamped_window() {
    let mut chunks = ChunksManager::new(&small_world_config(5, 1), 7);
    let mut uploader = HeadlessMeshUploader::new();
    uploader.fail_next_uploads(u32::MAX);

    assert!(chunks
        .update_draw_window(ChunkIndex::new(2, 2), false, &mut uploader)
        .is_err());
    {
        let lists = chunks.pack_draw_lists();
        assert_eq!(lists.len(), 9);
        assert_eq!(lists.vbvs.len(), lists.ibvs.len());
        assert_eq!(lists.index_counts.len(), 9);
        assert_eq!(lists.drawable_count(), 0);
    }

    assert!(chunks
        .update_draw_window(ChunkIndex::new(0, 0), false, &mut uploader)
        .is_err());
    assert_eq!(chunks.pack_draw_lists().len(), 4);
}

#[test]
fn moving_the_window_keeps_finished_chunks() {
    let mut chunks = ChunksManager::new(&small_world_config(5, 1), 7);
    let mut uploader = HeadlessMeshUploader::new();
    chunks
        .update_draw_window(ChunkIndex::new(1, 1), false, &mut uploader)
        .unwrap();
    chunks
        .update_draw_window(ChunkIndex::new(3, 3), false, &mut uploader)
        .unwrap();

    assert_eq!(
        chunks.chunk_state(ChunkIndex::new(0, 0)),
        Some(ChunkGenerationState::FinishedAll)
    );
    assert_eq!(
        chunks.chunk_state(ChunkIndex::new(4, 4)),
        Some(ChunkGenerationState::FinishedAll)
    );
    assert_eq!(
        chunks.chunk_state(ChunkIndex::new(4, 0)),
        Some(ChunkGenerationState::NotYet)
    );
    // (2, 2) is shared by both windows and generated only once.
    assert_eq!(chunks.diagnostics().chunks_generated, 17);
}

#[test]
fn editing_an_unfinished_chunk_is_refused() {
    let mut chunks = ChunksManager::new(&small_world_config(3, 1), 7);
    let mut uploader = HeadlessMeshUploader::new();
    let origin = ChunkIndex::new(0, 0);

    assert_eq!(
        chunks.update_chunk_block(origin, Vector3::new(1, 1, 1), Block::Stone, &mut uploader),
        Err(EditError::ChunkNotReady(origin))
    );
    let outside = ChunkIndex::new(7, 0);
    assert_eq!(
        chunks.update_chunk_block(outside, Vector3::new(1, 1, 1), Block::Stone, &mut uploader),
        Err(EditError::ChunkNotReady(outside))
    );
    assert_eq!(uploader.upload_count(), 0);
}

#[test]
fn edit_and_undo_restores_the_mesh() {
    let mut uploader = HeadlessMeshUploader::new();
    let mut chunks = streamed_grid(&mut uploader);
    let block = surface_block(&chunks, 24, 24);
    let chunk_index = chunk_index_of_block(block);
    let original_block = chunks.block_at(block);
    let original_mesh = mesh_of(&chunks, chunk_index);
    let original_bytes = uploader.live_vertex_bytes();
    assert!(original_block.is_solid());

    chunks
        .set_block_at_world(block, Block::Air, &mut uploader)
        .unwrap();
    assert_eq!(chunks.block_at(block), Block::Air);
    assert!(mesh_of(&chunks, chunk_index) != original_mesh);

    chunks
        .update_chunk_block(chunk_index, local_of_block(block), original_block, &mut uploader)
        .unwrap();
    assert!(mesh_of(&chunks, chunk_index) == original_mesh);
    assert_eq!(uploader.release_count(), 2);
    assert_eq!(uploader.live_vertex_bytes(), original_bytes);
    assert_eq!(chunks.diagnostics().edits_applied, 2);

    // The draw window points at the newest buffers.
    let gpu_mesh = chunks.gpu_mesh(chunk_index);
    let lists = chunks.pack_draw_lists();
    assert!(lists.vbvs.contains(&gpu_mesh.vbv));
}

#[test]
fn failed_edit_upload_reverts_the_block() {
    let mut uploader = HeadlessMeshUploader::new();
    let mut chunks = streamed_grid(&mut uploader);
    let block = surface_block(&chunks, 20, 12);
    let chunk_index = chunk_index_of_block(block);
    let before = chunks.block_at(block);
    let gpu_before = chunks.gpu_mesh(chunk_index);

    uploader.fail_next_uploads(1);
    let result = chunks.set_block_at_world(block, Block::Air, &mut uploader);
    assert!(matches!(result, Err(EditError::Upload(UploadError::OutOfMemory(_)))));
    assert_eq!(chunks.block_at(block), before);
    assert_eq!(chunks.gpu_mesh(chunk_index), gpu_before);
    assert_eq!(chunks.diagnostics().upload_failures, 1);
    assert_eq!(chunks.diagnostics().edits_applied, 0);
}

#[test]
fn setting_the_same_block_does_nothing() {
    let mut uploader = HeadlessMeshUploader::new();
    let mut chunks = streamed_grid(&mut uploader);
    let block = surface_block(&chunks, 20, 20);
    let uploads = uploader.upload_count();

    let current = chunks.block_at(block);
    chunks.set_block_at_world(block, current, &mut uploader).unwrap();
    assert_eq!(uploader.upload_count(), uploads);
    assert_eq!(chunks.diagnostics().edits_applied, 0);
}

#[test]
fn edits_above_the_world_are_refused() {
    let mut uploader = HeadlessMeshUploader::new();
    let mut chunks = streamed_grid(&mut uploader);
    let above = Vector3::new(20, 256, 20);
    assert_eq!(
        chunks.set_block_at_world(above, Block::Stone, &mut uploader),
        Err(EditError::OutOfWorld(above))
    );
}
