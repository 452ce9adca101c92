//! # Engine State Module
//!
//! The per-frame driver of the voxel world and its player.
//!
//! ## Key Components
//!
//! * `EngineState` - Owns the chunk grid, the player and the debug overlay, and runs one frame at a time
//! * `camera_state` - View and projection matrices derived from the player pose
//! * `diagnostics` - Counters for every skipped or failed piece of work
//! * `player` - Collision helpers and the first-person controller
//! * `rendering` - Meshing, the mesh upload contract, shader constants and the text UI
//! * `task_management` - Worker threads for chunk generation
//! * `voxels` - Blocks, chunks, terrain generation and chunk streaming
//!
//! ## Frame Dataflow
//!
//! 1. Global keys are handled (cursor lock, overlay toggle, held block selection)
//! 2. The chunks around the player are generated on the spot if they are
//!    still missing, then the player moves against them. While a worker is
//!    still building one of them the player holds still for the frame
//! 3. If the player changed chunk, or chunks in the draw window are still
//!    missing, the draw window is updated and new meshes are uploaded
//! 4. Mine and place requests are applied to the chunk grid
//! 5. The overlay text and shader constants are rebuilt, and the draw lists
//!    are packed for the renderer
//!
//! The engine never talks to the GPU itself. Meshes go out through a
//! [`MeshUploader`](rendering::MeshUploader); everything else a renderer
//! needs comes back in a [`FrameOutput`].

use cgmath::{Deg, Matrix4, Point3, SquareMatrix, Vector3};
use log::{debug, info};

use camera_state::Projection;
use player::{PlayerController, PlayerInputs};
use rendering::shader_data::{dir_light_view_projection, SceneConstants, TransformConstants};
use rendering::ui::{DebugOverlay, DebugOverlayInfo, TextGrid};
use rendering::MeshUploader;
use voxels::block::Block;
use voxels::chunk::CHUNK_DIMENSION_X;
use voxels::chunks_manager::DrawLists;
use voxels::{ChunkIndex, ChunksManager};

use crate::application_state::{InputSnapshot, Key};
use crate::config::EngineConfig;
use crate::core::{FrameTimeStats, TrackedValue};
use crate::error::{ConfigError, EditError};

pub mod camera_state;
pub mod diagnostics;
pub mod player;
pub mod rendering;
pub mod task_management;
pub mod voxels;

/// Number of frame times the FPS readout averages over
const FRAME_STATS_WINDOW: usize = 60;

/// Vertical field of view of the player camera
const FIELD_OF_VIEW_DEGREES: f32 = 70.0;
const Z_NEAR: f32 = 0.1;
const Z_FAR: f32 = 1000.0;

/// Radius, in chunks, around the player's chunk that must have block data
/// before the player moves
const GROUND_CHUNK_RADIUS: i32 = 1;

/// Extra clearance above the terrain when spawning, so the first frame
/// starts slightly airborne instead of inside the ground
const SPAWN_CLEARANCE: f32 = 0.05;

/// Everything a renderer needs to draw one frame.
pub struct FrameOutput<'a> {
    /// One entry per cell of the draw window; empty views are skipped
    pub draw_lists: DrawLists<'a>,
    pub transform: TransformConstants,
    pub scene: SceneConstants,
    /// The block under the crosshair, if any
    pub selected_block: Option<Vector3<i32>>,
    /// The overlay text, or `None` while the overlay is hidden
    pub overlay: Option<&'a TextGrid>,
}

/// The main state container of the engine
///
/// This struct owns the chunk grid, the player and the UI state, and
/// advances all of them once per [`frame`](EngineState::frame).
///
/// # Examples
///
/// ```
/// use voxel_world::application_state::InputState;
/// use voxel_world::config::EngineConfig;
/// use voxel_world::engine_state::rendering::HeadlessMeshUploader;
/// use voxel_world::engine_state::EngineState;
///
/// let mut config = EngineConfig::default();
/// config.world.chunk_count_x = 4;
/// config.world.chunk_count_z = 4;
/// config.world.draw_distance = 1;
/// config.world.seed = Some(3);
/// config.world.allow_parallel = false;
///
/// let mut engine = EngineState::new(config, 640, 480).unwrap();
/// let mut uploader = HeadlessMeshUploader::new();
/// let output = engine.frame(&InputState::new(), 1.0 / 60.0, &mut uploader);
/// assert_eq!(output.draw_lists.len(), 9);
/// ```
pub struct EngineState {
    config: EngineConfig,
    chunks: ChunksManager,
    player: PlayerController,
    /// The chunk the player stands in; dirty when the draw window must move
    tracked_chunk: TrackedValue<ChunkIndex>,
    projection: Projection,
    frame_stats: FrameTimeStats<FRAME_STATS_WINDOW>,
    overlay: DebugOverlay,
    held_block: Block,
    cursor_enabled: bool,
    selected_block: Option<Vector3<i32>>,
    frame_count: u64,
}

impl EngineState {
    /// Creates the engine and spawns the player above the centre of the map.
    ///
    /// No chunk is generated here; the first [`frame`](Self::frame) starts
    /// streaming the draw window.
    ///
    /// # Arguments
    /// * `config` - Validated before use
    /// * `width`, `height` - Viewport size in pixels
    pub fn new(config: EngineConfig, width: u32, height: u32) -> Result<Self, ConfigError> {
        config.validate()?;

        let seed = config.world.resolve_seed();
        info!("World seed: {seed}");
        let chunks = ChunksManager::new(&config.world, seed);

        let spawn_x = config.world.chunk_count_x as i32 * CHUNK_DIMENSION_X / 2;
        let spawn_z = config.world.chunk_count_z as i32 * CHUNK_DIMENSION_X / 2;
        let surface = chunks.terrain().surface_height(spawn_x, spawn_z);
        let mut player = PlayerController::new(Point3::new(0.0, 0.0, 0.0));
        let eye_height = player.constants().eye_height;
        player.set_position(Point3::new(
            spawn_x as f32,
            surface as f32 + 0.5 + eye_height + SPAWN_CLEARANCE,
            spawn_z as f32,
        ));
        info!("Spawning player at {:?}", player.position());

        let tracked_chunk = TrackedValue::new(player.chunk_index());

        Ok(Self {
            config,
            chunks,
            player,
            tracked_chunk,
            projection: Projection::new(width, height, Deg(FIELD_OF_VIEW_DEGREES), Z_NEAR, Z_FAR),
            frame_stats: FrameTimeStats::new(),
            overlay: DebugOverlay::new(),
            held_block: Block::Grass,
            cursor_enabled: false,
            selected_block: None,
            frame_count: 0,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn chunks(&self) -> &ChunksManager {
        &self.chunks
    }

    pub fn chunks_mut(&mut self) -> &mut ChunksManager {
        &mut self.chunks
    }

    pub fn player(&self) -> &PlayerController {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut PlayerController {
        &mut self.player
    }

    /// The block that right click places.
    pub fn held_block(&self) -> Block {
        self.held_block
    }

    /// Whether the cursor is free. While it is, mouse look and block edits
    /// are ignored.
    pub fn is_cursor_enabled(&self) -> bool {
        self.cursor_enabled
    }

    pub fn overlay(&self) -> &DebugOverlay {
        &self.overlay
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Resizes the projection to a new viewport.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.projection.resize(width, height);
    }

    /// Advances the world by one frame of `dt` seconds.
    pub fn frame<I: InputSnapshot>(
        &mut self,
        input: &I,
        dt: f32,
        mesh_uploader: &mut dyn MeshUploader,
    ) -> FrameOutput<'_> {
        self.frame_count += 1;
        self.frame_stats.push(dt);
        self.handle_global_keys(input);

        let mut inputs = PlayerInputs::from_snapshot(input);
        if self.cursor_enabled {
            inputs.look_dxdy = cgmath::Vector2::new(0.0, 0.0);
        }
        let ground_ready = self
            .chunks
            .generate_around_now(self.player.chunk_index(), GROUND_CHUNK_RADIUS);
        if ground_ready {
            self.player.on_every_frame(&self.chunks, &inputs, dt);
        } else {
            debug!("Holding the player until the chunks around it are generated");
        }

        self.stream_chunks(mesh_uploader);
        if !self.cursor_enabled {
            self.apply_edits(input, mesh_uploader);
        }

        self.selected_block = self
            .player
            .pick_looking_block(&self.chunks)
            .map(|hit| hit.block);
        self.overlay.update(&DebugOverlayInfo {
            fps: self.frame_stats.mean_fps(),
            position: self.player.position(),
            chunk_index: *self.tracked_chunk.get(),
            pending_chunks: self.chunks.pending_chunk_count(),
            held_block: self.held_block,
            looking_at: self.selected_block,
            diagnostics: *self.chunks.diagnostics(),
        });

        let lighting = &self.config.lighting;
        let light_view_projection = dir_light_view_projection(
            self.player.position(),
            Vector3::from(lighting.dir_light_dir),
            lighting.shadow_extent,
        );
        let transform = TransformConstants::new(
            Matrix4::identity(),
            &self.player.camera(),
            &self.projection,
            light_view_projection,
        );
        let scene = SceneConstants::new(lighting, self.selected_block);
        let overlay = self.overlay.is_visible().then(|| self.overlay.grid());

        FrameOutput {
            draw_lists: self.chunks.pack_draw_lists(),
            transform,
            scene,
            selected_block: self.selected_block,
            overlay,
        }
    }

    fn handle_global_keys<I: InputSnapshot>(&mut self, input: &I) {
        if input.key_pressed_now(Key::Escape) {
            self.cursor_enabled = !self.cursor_enabled;
            debug!("Cursor enabled: {}", self.cursor_enabled);
        }
        if input.key_pressed_now(Key::F3) {
            self.overlay.toggle();
        }

        let selection = [
            (Key::Digit1, Block::Grass),
            (Key::Digit2, Block::Dirt),
            (Key::Digit3, Block::Stone),
            (Key::Digit4, Block::Sand),
        ];
        for (key, block) in selection {
            if input.key_pressed_now(key) {
                self.held_block = block;
            }
        }
    }

    /// Moves the draw window with the player and keeps uploading until
    /// every chunk in it is finished.
    fn stream_chunks(&mut self, mesh_uploader: &mut dyn MeshUploader) {
        self.tracked_chunk.set(self.player.chunk_index());
        let moved = self.tracked_chunk.drop_dirty();
        if !moved && !self.chunks.has_pending_chunks() {
            return;
        }
        let allow_parallel = self.config.world.allow_parallel;
        if let Err(err) =
            self.chunks
                .update_draw_window(*self.tracked_chunk.get(), allow_parallel, mesh_uploader)
        {
            debug!("Draw window update incomplete, retrying next frame: {err}");
        }
    }

    fn apply_edits<I: InputSnapshot>(&mut self, input: &I, mesh_uploader: &mut dyn MeshUploader) {
        if input.key_pressed_now(Key::LeftMouse) {
            let result = self.player.try_mine_block(&mut self.chunks, mesh_uploader);
            self.record_edit("mine", result);
        }
        if input.key_pressed_now(Key::RightMouse) {
            let result =
                self.player
                    .try_place_block(&mut self.chunks, self.held_block, mesh_uploader);
            self.record_edit("place", result);
        }
    }

    fn record_edit(&mut self, action: &str, result: Result<Vector3<i32>, EditError>) {
        match result {
            Ok(block) => debug!("Applied {action} at {block:?}"),
            // Upload failures are already counted by the chunks manager.
            Err(EditError::Upload(err)) => debug!("{action} failed to upload: {err}"),
            Err(err) => {
                self.chunks.diagnostics_mut().rejected_edits += 1;
                debug!("Rejected {action}: {err}");
            }
        }
    }
}
