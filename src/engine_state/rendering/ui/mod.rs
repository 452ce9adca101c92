//! Text UI for the voxel engine.
//!
//! This module contains the character grid the text shader draws over the 3D
//! view, and the debug overlay that fills it each frame.

mod debug_overlay;
mod text_grid;

pub use debug_overlay::{DebugOverlay, DebugOverlayInfo};
pub use text_grid::{glyph_index, TextCell, TextGrid, DEFAULT_TEXT_COLOR, GLYPH_COUNT, NO_GLYPH};
