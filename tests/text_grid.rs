//! Text grid behaviour as seen by a renderer.

use cgmath::Vector2;
use voxel_world::engine_state::rendering::ui::{
    glyph_index, DebugOverlay, DebugOverlayInfo, TextGrid, DEFAULT_TEXT_COLOR, NO_GLYPH,
};

#[test]
fn clearing_and_rewriting_gives_the_same_texture() {
    let mut grid = TextGrid::new(16, 4);
    grid.set_texts(Vector2::new(0, 0), "POS 1.0 2.0 3.0", [200, 100, 50]);
    grid.set_texts(Vector2::new(3, 2), "chunk (4, 5)", DEFAULT_TEXT_COLOR);
    let first = grid.to_texture();

    grid.clear_all();
    assert!(grid.to_texture().pixels().all(|pixel| pixel.0[3] == NO_GLYPH));

    grid.set_texts(Vector2::new(0, 0), "POS 1.0 2.0 3.0", [200, 100, 50]);
    grid.set_texts(Vector2::new(3, 2), "chunk (4, 5)", DEFAULT_TEXT_COLOR);
    assert_eq!(grid.to_texture(), first);
}

#[test]
fn texture_encodes_color_and_glyph() {
    let mut grid = TextGrid::new(5, 3);
    grid.set_text(Vector2::new(4, 2), 'q', [1, 2, 3]);
    let texture = grid.to_texture();
    assert_eq!(texture.dimensions(), (5, 3));
    assert_eq!(texture.get_pixel(4, 2).0, [1, 2, 3, glyph_index('Q')]);
    assert_eq!(texture.get_pixel(0, 0).0[3], NO_GLYPH);
}

#[test]
fn overflowing_text_stops_at_the_last_cell() {
    let mut grid = TextGrid::new(3, 2);
    let written = grid.set_texts(Vector2::new(1, 1), "ABCDE", DEFAULT_TEXT_COLOR);
    assert_eq!(written, 2);
    assert_eq!(grid.row_text(1), " AB");
    assert_eq!(grid.row_text(0), "   ");
}

#[test]
fn hidden_overlay_writes_nothing() {
    let mut overlay = DebugOverlay::new();
    let info = DebugOverlayInfo {
        fps: 60.0,
        position: cgmath::Point3::new(1.0, 2.0, 3.0),
        chunk_index: Vector2::new(0, 0),
        pending_chunks: 0,
        held_block: voxel_world::engine_state::voxels::block::Block::Dirt,
        looking_at: None,
        diagnostics: Default::default(),
    };
    overlay.update(&info);
    assert!(overlay.grid().row_text(0).starts_with("FPS"));

    overlay.toggle();
    overlay.update(&info);
    assert!(overlay
        .grid()
        .to_texture()
        .pixels()
        .all(|pixel| pixel.0[3] == NO_GLYPH));
}
