//! # Voxel World Headless Demo
//!
//! Runs the engine without a window: the player walks, jumps, mines and
//! places blocks on a fixed script while chunks stream in around them.
//! Meshes go to a [`HeadlessMeshUploader`], so no GPU is needed.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release -- [config.json] [frames]
//! ```

use std::process::ExitCode;

use log::{error, info};
use voxel_world::application_state::{InputState, Key};
use voxel_world::config::EngineConfig;
use voxel_world::core::FramePacer;
use voxel_world::engine_state::rendering::HeadlessMeshUploader;
use voxel_world::engine_state::EngineState;

const DEFAULT_FRAME_COUNT: u64 = 600;

/// Input for frame `frame` of the scripted session.
fn scripted_input(frame: u64) -> InputState {
    let phase = frame % 240;
    let mut input = InputState::new();
    match phase {
        // Walk forward, looking slightly down.
        0..=89 => {
            input = input.with_held(Key::W).with_mouse_delta(0.0, 1.0);
            if phase == 45 {
                input = input.with_pressed(Key::Space);
            }
        }
        // Turn right while dashing.
        90..=149 => input = input.with_held(Key::W).with_held(Key::Shift).with_mouse_delta(2.0, 0.0),
        150 => input = input.with_pressed(Key::LeftMouse),
        170 => input = input.with_pressed(Key::Digit3),
        171 => input = input.with_pressed(Key::RightMouse),
        // Look back up.
        180..=209 => input = input.with_mouse_delta(0.0, -1.0),
        _ => {}
    }
    input
}

fn main() -> ExitCode {
    voxel_world::init_logger();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => match EngineConfig::load(&path) {
            Ok(config) => config,
            Err(err) => {
                error!("Could not load {path}: {err}");
                return ExitCode::FAILURE;
            }
        },
        None => EngineConfig::default(),
    };
    let frame_count = args
        .next()
        .and_then(|frames| frames.parse().ok())
        .unwrap_or(DEFAULT_FRAME_COUNT);

    let mut pacer = FramePacer::new(config.target_fps);
    let mut engine = match EngineState::new(config, 1280, 720) {
        Ok(engine) => engine,
        Err(err) => {
            error!("Invalid config: {err}");
            return ExitCode::FAILURE;
        }
    };
    let mut uploader = HeadlessMeshUploader::new();

    for frame in 0..frame_count {
        let dt = pacer.begin_frame();
        let input = scripted_input(frame);
        let output = engine.frame(&input, dt, &mut uploader);
        if frame % 60 == 0 {
            info!(
                "Frame {frame}: {} of {} chunks drawable, looking at {:?}",
                output.draw_lists.drawable_count(),
                output.draw_lists.len(),
                output.selected_block
            );
        }
        pacer.end_frame();
    }

    let player = engine.player();
    info!(
        "Finished {} frames at {:?}, grounded: {}",
        engine.frame_count(),
        player.position(),
        player.is_grounded()
    );
    info!("Diagnostics: {:?}", engine.chunks().diagnostics());
    info!(
        "Uploads: {}, releases: {}, live vertex bytes: {}",
        uploader.upload_count(),
        uploader.release_count(),
        uploader.live_vertex_bytes()
    );
    ExitCode::SUCCESS
}
