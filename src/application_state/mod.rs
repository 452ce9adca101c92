//! # Application State
//!
//! The input side of the application: which keys exist, how a frame's input
//! is read, and how winit events become that input.
//!
//! ## Key Components
//! - `Key`: Closed set of keys and mouse buttons the engine reacts to
//! - `InputSnapshot`: Per-frame pull interface the engine reads input through
//! - `input_state::InputState`: A concrete snapshot
//! - `input_manager::InputManager`: Builds snapshots from winit events

pub mod input_manager;
pub mod input_state;

use cgmath::Vector2;

pub use input_manager::InputManager;
pub use input_state::{InputState, RawInputState};

/// Keys and mouse buttons the engine reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    W,
    A,
    S,
    D,
    Space,
    Shift,
    Ctrl,
    Escape,
    F3,
    Digit1,
    Digit2,
    Digit3,
    Digit4,
    LeftMouse,
    RightMouse,
    MiddleMouse,
}

impl Key {
    pub const ALL: [Key; 16] = [
        Key::W,
        Key::A,
        Key::S,
        Key::D,
        Key::Space,
        Key::Shift,
        Key::Ctrl,
        Key::Escape,
        Key::F3,
        Key::Digit1,
        Key::Digit2,
        Key::Digit3,
        Key::Digit4,
        Key::LeftMouse,
        Key::RightMouse,
        Key::MiddleMouse,
    ];
}

/// One frame of input.
pub trait InputSnapshot {
    /// Whether `key` is down this frame.
    fn key_pressed(&self, key: Key) -> bool;

    /// Whether `key` went down this frame.
    fn key_pressed_now(&self, key: Key) -> bool;

    /// Mouse movement since the previous frame, in pixels. `+y` is down.
    fn mouse_delta(&self) -> Vector2<f32>;

    /// `(x, y)` axis from four keys, each component in `{-1, 0, 1}`.
    fn get_axis_2d(&self, positive_y: Key, negative_y: Key, positive_x: Key, negative_x: Key) -> Vector2<f32> {
        let axis = |positive: Key, negative: Key| {
            (self.key_pressed(positive) as i32 - self.key_pressed(negative) as i32) as f32
        };
        Vector2::new(axis(positive_x, negative_x), axis(positive_y, negative_y))
    }
}
