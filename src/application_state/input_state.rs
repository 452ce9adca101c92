//! Per-key edge detection and the frame input snapshot the engine consumes.

use std::collections::HashMap;

use cgmath::Vector2;

use super::{InputSnapshot, Key};

/// Where a key is in its press/hold/release cycle this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RawInputState {
    #[default]
    NotPressed,
    /// Went down this frame
    Pressed,
    /// Down this frame and the previous one
    Held,
    /// Went up this frame
    Released,
}

impl RawInputState {
    /// Down this frame, whether new or held.
    pub fn is_active(&self) -> bool {
        matches!(self, RawInputState::Pressed | RawInputState::Held)
    }

    pub fn is_just_pressed(&self) -> bool {
        matches!(self, RawInputState::Pressed)
    }

    pub fn is_just_released(&self) -> bool {
        matches!(self, RawInputState::Released)
    }

    /// Derives the state from whether the input was down last frame and is down now
    pub fn from_raw_states(previous: bool, current: bool) -> Self {
        match (previous, current) {
            (false, true) => RawInputState::Pressed,
            (true, true) => RawInputState::Held,
            (true, false) => RawInputState::Released,
            (false, false) => RawInputState::NotPressed,
        }
    }
}

/// Input for one frame, as produced by the input manager.
#[derive(Debug, Clone, PartialEq)]
pub struct InputState {
    /// State of every key that is not `NotPressed`
    pub key_states: HashMap<Key, RawInputState>,
    /// Accumulated mouse motion in pixels
    pub mouse_delta: Vector2<f32>,
}

impl InputState {
    pub fn new() -> Self {
        Self {
            key_states: HashMap::new(),
            mouse_delta: Vector2::new(0.0, 0.0),
        }
    }

    /// Gets the state of a key or mouse button
    pub fn get_key_state(&self, key: Key) -> RawInputState {
        self.key_states.get(&key).copied().unwrap_or_default()
    }

    pub fn with_key(mut self, key: Key, state: RawInputState) -> Self {
        self.key_states.insert(key, state);
        self
    }

    /// Shorthand for a key that has been down for several frames.
    pub fn with_held(self, key: Key) -> Self {
        self.with_key(key, RawInputState::Held)
    }

    /// Shorthand for a key that went down this frame.
    pub fn with_pressed(self, key: Key) -> Self {
        self.with_key(key, RawInputState::Pressed)
    }

    pub fn with_mouse_delta(mut self, dx: f32, dy: f32) -> Self {
        self.mouse_delta = Vector2::new(dx, dy);
        self
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

impl InputSnapshot for InputState {
    fn key_pressed(&self, key: Key) -> bool {
        self.get_key_state(key).is_active()
    }

    fn key_pressed_now(&self, key: Key) -> bool {
        self.get_key_state(key).is_just_pressed()
    }

    fn mouse_delta(&self) -> Vector2<f32> {
        self.mouse_delta
    }
}
