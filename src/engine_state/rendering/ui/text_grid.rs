//! Grid of coloured character cells.
//!
//! Each cell holds an RGB colour and an index into a 64-glyph atlas laid out
//! in ASCII order from `' '` (0x20) to `'_'` (0x5F). The grid is handed to
//! the text shader as an RGBA8 texture with one texel per cell: RGB is the
//! colour and A is the glyph index.

use cgmath::Vector2;
use image::{Rgba, RgbaImage};

/// Number of glyphs in the atlas.
pub const GLYPH_COUNT: u8 = 64;
/// Glyph index of a cell that draws nothing.
pub const NO_GLYPH: u8 = 0xFF;
pub const DEFAULT_TEXT_COLOR: [u8; 3] = [255, 255, 255];

const FIRST_GLYPH: u8 = 0x20;

/// Atlas index of `ch`.
///
/// Lower-case letters use their upper-case glyph. Space, and every character
/// outside the atlas, map to [`NO_GLYPH`].
pub fn glyph_index(ch: char) -> u8 {
    let ch = ch.to_ascii_uppercase();
    if !ch.is_ascii() || ch == ' ' {
        return NO_GLYPH;
    }
    let code = ch as u8;
    if (FIRST_GLYPH..FIRST_GLYPH + GLYPH_COUNT).contains(&code) {
        code - FIRST_GLYPH
    } else {
        NO_GLYPH
    }
}

/// One character cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextCell {
    pub color: [u8; 3],
    pub glyph: u8,
}

impl Default for TextCell {
    fn default() -> Self {
        Self {
            color: DEFAULT_TEXT_COLOR,
            glyph: NO_GLYPH,
        }
    }
}

impl TextCell {
    /// The character this cell shows, `' '` for an empty cell.
    pub fn as_char(&self) -> char {
        if self.glyph < GLYPH_COUNT {
            (self.glyph + FIRST_GLYPH) as char
        } else {
            ' '
        }
    }
}

/// A `cols × rows` grid of [`TextCell`]s, stored row by row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextGrid {
    cols: u32,
    rows: u32,
    cells: Vec<TextCell>,
}

impl TextGrid {
    pub fn new(cols: u32, rows: u32) -> Self {
        Self {
            cols,
            rows,
            cells: vec![TextCell::default(); cols as usize * rows as usize],
        }
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    fn offset(&self, pos: Vector2<u32>) -> Option<usize> {
        (pos.x < self.cols && pos.y < self.rows).then(|| (pos.y * self.cols + pos.x) as usize)
    }

    pub fn cell(&self, pos: Vector2<u32>) -> Option<TextCell> {
        self.offset(pos).map(|offset| self.cells[offset])
    }

    /// Sets one cell. Returns `false` if `pos` is outside the grid.
    pub fn set_text(&mut self, pos: Vector2<u32>, ch: char, color: [u8; 3]) -> bool {
        match self.offset(pos) {
            Some(offset) => {
                self.cells[offset] = TextCell {
                    color,
                    glyph: glyph_index(ch),
                };
                true
            }
            None => false,
        }
    }

    /// Writes `text` starting at `pos`, continuing at the start of the next
    /// row when a row is full. Characters past the last cell are dropped.
    ///
    /// # Returns
    /// The number of characters written.
    pub fn set_texts(&mut self, pos: Vector2<u32>, text: &str, color: [u8; 3]) -> usize {
        let Some(start) = self.offset(pos) else {
            return 0;
        };
        let mut written = 0;
        for (cell, ch) in self.cells[start..].iter_mut().zip(text.chars()) {
            *cell = TextCell {
                color,
                glyph: glyph_index(ch),
            };
            written += 1;
        }
        written
    }

    /// Restores every cell of row `y` to the default.
    pub fn clear_row(&mut self, y: u32) {
        if y >= self.rows {
            return;
        }
        let start = (y * self.cols) as usize;
        self.cells[start..start + self.cols as usize].fill(TextCell::default());
    }

    pub fn clear_all(&mut self) {
        self.cells.fill(TextCell::default());
    }

    /// Row `y` as a string, with empty cells as spaces.
    pub fn row_text(&self, y: u32) -> String {
        if y >= self.rows {
            return String::new();
        }
        let start = (y * self.cols) as usize;
        self.cells[start..start + self.cols as usize]
            .iter()
            .map(TextCell::as_char)
            .collect()
    }

    /// One texel per cell: RGB from the colour, A from the glyph index.
    pub fn to_texture(&self) -> RgbaImage {
        RgbaImage::from_fn(self.cols, self.rows, |x, y| {
            let cell = self.cells[(y * self.cols + x) as usize];
            Rgba([cell.color[0], cell.color[1], cell.color[2], cell.glyph])
        })
    }
}
