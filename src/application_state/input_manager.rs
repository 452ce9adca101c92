//! # Input Manager
//!
//! This module turns winit events into per-frame [`InputState`] snapshots:
//! - Keyboard and mouse button state tracking
//! - Mouse motion accumulation
//! - Pressed/held/released transitions between frames

use std::collections::HashMap;

use cgmath::Vector2;
use winit::{
    event::{ElementState, KeyEvent, MouseButton, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

use super::input_state::{InputState, RawInputState};
use super::Key;

/// The engine key bound to a physical keyboard key.
pub fn key_from_code(code: KeyCode) -> Option<Key> {
    Some(match code {
        KeyCode::KeyW => Key::W,
        KeyCode::KeyA => Key::A,
        KeyCode::KeyS => Key::S,
        KeyCode::KeyD => Key::D,
        KeyCode::Space => Key::Space,
        KeyCode::ShiftLeft | KeyCode::ShiftRight => Key::Shift,
        KeyCode::ControlLeft | KeyCode::ControlRight => Key::Ctrl,
        KeyCode::Escape => Key::Escape,
        KeyCode::F3 => Key::F3,
        KeyCode::Digit1 => Key::Digit1,
        KeyCode::Digit2 => Key::Digit2,
        KeyCode::Digit3 => Key::Digit3,
        KeyCode::Digit4 => Key::Digit4,
        _ => return None,
    })
}

/// The engine key bound to a mouse button.
pub fn key_from_mouse_button(button: MouseButton) -> Option<Key> {
    match button {
        MouseButton::Left => Some(Key::LeftMouse),
        MouseButton::Right => Some(Key::RightMouse),
        MouseButton::Middle => Some(Key::MiddleMouse),
        _ => None,
    }
}

/// Manages the state of all input devices and processes input events.
#[derive(Debug)]
pub struct InputManager {
    /// Whether each key was down at the end of the previous frame
    inputs_old: HashMap<Key, bool>,
    /// Whether each key is down now
    inputs_new: HashMap<Key, bool>,
    /// Mouse movement accumulated since the last snapshot
    mouse_delta: Vector2<f64>,
}

impl InputManager {
    /// Creates a new InputManager with every key released.
    pub fn new() -> Self {
        let released: HashMap<Key, bool> = Key::ALL.iter().map(|&key| (key, false)).collect();
        Self {
            inputs_old: released.clone(),
            inputs_new: released,
            mouse_delta: Vector2::new(0.0, 0.0),
        }
    }

    /// Records that `key` went up or down.
    pub fn set_key_down(&mut self, key: Key, down: bool) {
        self.inputs_new.insert(key, down);
    }

    /// Processes a window event and updates internal input state.
    pub fn intake_input(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state,
                        physical_key: PhysicalKey::Code(code),
                        ..
                    },
                ..
            } => {
                if let Some(key) = key_from_code(*code) {
                    self.set_key_down(key, *state == ElementState::Pressed);
                }
            }
            WindowEvent::MouseInput { button, state, .. } => {
                if let Some(key) = key_from_mouse_button(*button) {
                    self.set_key_down(key, *state == ElementState::Pressed);
                }
            }
            _ => {}
        }
    }

    /// Adds raw mouse motion, as reported by `DeviceEvent::MouseMotion`.
    pub fn intake_mouse_motion(&mut self, delta: (f64, f64)) {
        self.mouse_delta += Vector2::new(delta.0, delta.1);
    }

    /// Creates a snapshot from the current raw boolean states.
    pub fn create_processed_input_state(&self) -> InputState {
        let key_states = self
            .inputs_new
            .iter()
            .map(|(&key, &new_state)| {
                let old_state = self.inputs_old.get(&key).copied().unwrap_or(false);
                (key, RawInputState::from_raw_states(old_state, new_state))
            })
            .filter(|(_, state)| *state != RawInputState::NotPressed)
            .collect();

        InputState {
            key_states,
            mouse_delta: self.mouse_delta.map(|c| c as f32),
        }
    }

    /// Returns this frame's snapshot and starts the next frame.
    pub fn get_and_reset_processed_input(&mut self) -> InputState {
        let processed_input = self.create_processed_input_state();
        self.reset_inputs();
        processed_input
    }

    /// Moves the current key states into the previous-frame slot and clears
    /// mouse motion.
    pub fn reset_inputs(&mut self) {
        self.inputs_old.clone_from(&self.inputs_new);
        self.mouse_delta = Vector2::new(0.0, 0.0);
    }

    /// Releases every key, e.g. when the window loses focus.
    pub fn release_all(&mut self) {
        for down in self.inputs_new.values_mut() {
            *down = false;
        }
        self.mouse_delta = Vector2::new(0.0, 0.0);
    }
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}
