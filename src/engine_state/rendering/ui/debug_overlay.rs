//! Writes engine statistics into a [`TextGrid`] once per frame.

use cgmath::{Point3, Vector2, Vector3};

use super::text_grid::{TextGrid, DEFAULT_TEXT_COLOR};
use crate::engine_state::diagnostics::Diagnostics;
use crate::engine_state::voxels::block::Block;
use crate::engine_state::voxels::ChunkIndex;

const WARNING_COLOR: [u8; 3] = [255, 96, 64];
const DIM_COLOR: [u8; 3] = [160, 160, 160];

/// Everything the overlay prints.
#[derive(Debug, Clone, Copy)]
pub struct DebugOverlayInfo {
    pub fps: f32,
    pub position: Point3<f32>,
    pub chunk_index: ChunkIndex,
    pub pending_chunks: usize,
    pub held_block: Block,
    pub looking_at: Option<Vector3<i32>>,
    pub diagnostics: Diagnostics,
}

/// The debug text layer.
#[derive(Debug, Clone)]
pub struct DebugOverlay {
    grid: TextGrid,
    visible: bool,
}

impl DebugOverlay {
    pub const COLS: u32 = 48;
    pub const ROWS: u32 = 8;

    pub fn new() -> Self {
        Self {
            grid: TextGrid::new(Self::COLS, Self::ROWS),
            visible: true,
        }
    }

    pub fn grid(&self) -> &TextGrid {
        &self.grid
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
        if !self.visible {
            self.grid.clear_all();
        }
    }

    /// Rewrites the grid from `info`. A hidden overlay stays empty.
    pub fn update(&mut self, info: &DebugOverlayInfo) {
        self.grid.clear_all();
        if !self.visible {
            return;
        }
        let d = &info.diagnostics;
        let line = |row: u32| Vector2::new(0, row);

        self.grid.set_texts(line(0), &format!("FPS {:.1}", info.fps), DEFAULT_TEXT_COLOR);
        self.grid.set_texts(
            line(1),
            &format!(
                "POS {:.2} {:.2} {:.2}",
                info.position.x, info.position.y, info.position.z
            ),
            DEFAULT_TEXT_COLOR,
        );
        self.grid.set_texts(
            line(2),
            &format!(
                "CHUNK {} {} PENDING {}",
                info.chunk_index.x, info.chunk_index.y, info.pending_chunks
            ),
            DEFAULT_TEXT_COLOR,
        );
        self.grid.set_texts(
            line(3),
            &format!("GENERATED {} UPLOADED {}", d.chunks_generated, d.chunks_uploaded),
            DIM_COLOR,
        );
        self.grid.set_texts(
            line(4),
            &format!("EDITS {} REJECTED {}", d.edits_applied, d.rejected_edits),
            DIM_COLOR,
        );
        let failure_color = if d.upload_failures > 0 || d.worker_panics > 0 {
            WARNING_COLOR
        } else {
            DIM_COLOR
        };
        self.grid.set_texts(
            line(5),
            &format!("UPLOAD FAILURES {} PANICS {}", d.upload_failures, d.worker_panics),
            failure_color,
        );
        self.grid.set_texts(
            line(6),
            &format!("HOLDING {:?}", info.held_block),
            DEFAULT_TEXT_COLOR,
        );
        if let Some(target) = info.looking_at {
            self.grid.set_texts(
                line(7),
                &format!("TARGET {} {} {}", target.x, target.y, target.z),
                DEFAULT_TEXT_COLOR,
            );
        }
    }
}

impl Default for DebugOverlay {
    fn default() -> Self {
        Self::new()
    }
}
