#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel World
//!
//! The world-and-player core of a block voxel game: a chunked block world
//! streamed around the player, a surface mesher, a first-person kinematic
//! controller with box collision, block picking and editing, and a small
//! glyph-grid text UI.
//!
//! The crate does not own a window or a swap chain. Meshes leave through the
//! [`MeshUploader`](engine_state::rendering::MeshUploader) contract and the
//! renderer gets back packed draw lists and shader constants each frame.
//!
//! ## Key Modules
//!
//! * `application_state` - Keys, per-frame input snapshots and the winit adapter
//! * `config` - JSON configuration of the world and lighting
//! * `core` - Small shared primitives: tracked values, timers, frame stats
//! * `engine_state` - The world, the player, meshing and the per-frame driver
//! * `error` - Typed failures
//!
//! ## Usage
//!
//! ```rust
//! use voxel_world::application_state::InputState;
//! use voxel_world::config::EngineConfig;
//! use voxel_world::engine_state::rendering::HeadlessMeshUploader;
//! use voxel_world::engine_state::EngineState;
//!
//! voxel_world::init_logger();
//!
//! let mut config = EngineConfig::default();
//! config.world.chunk_count_x = 2;
//! config.world.chunk_count_z = 2;
//! config.world.draw_distance = 0;
//! config.world.allow_parallel = false;
//!
//! let mut engine = EngineState::new(config, 800, 600).unwrap();
//! let mut uploader = HeadlessMeshUploader::new();
//! let frame = engine.frame(&InputState::new(), 1.0 / 60.0, &mut uploader);
//! assert_eq!(frame.draw_lists.len(), 1);
//! ```
//!
//! ## Threading
//!
//! Chunk generation and meshing run on a pool of worker threads. Each chunk
//! is claimed with a compare-and-swap on its generation state, so no chunk is
//! ever generated twice. GPU uploads, block edits and everything the player
//! does stay on the calling thread.

pub mod application_state;
pub mod config;
pub mod core;
pub mod engine_state;
pub mod error;

pub use config::EngineConfig;
pub use engine_state::{EngineState, FrameOutput};
pub use error::{ConfigError, EditError, UploadError};

/// Initializes `env_logger` on stdout, filtered by `RUST_LOG`.
///
/// Calling it more than once is harmless; later calls are ignored.
pub fn init_logger() {
    let mut log_builder = env_logger::Builder::new();
    let initialized = log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .try_init()
        .is_ok();
    if initialized {
        log::info!("Logger initialized");
    }
}
