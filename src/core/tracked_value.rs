//! # Tracked Value
//!
//! A value wrapper that remembers whether it changed since the last time
//! somebody asked. The engine wraps the player's chunk index in one so the
//! draw window is only recomputed when the player crosses a chunk boundary.

/// A value paired with a one-shot dirty flag.
///
/// The flag is set on construction and whenever [`TrackedValue::set`] stores a
/// value that compares unequal to the current one. [`TrackedValue::drop_dirty`]
/// consumes it.
#[derive(Debug, Clone)]
pub struct TrackedValue<T: PartialEq> {
    value: T,
    dirty: bool,
}

impl<T: PartialEq> TrackedValue<T> {
    /// Wraps `value`; the result starts out dirty.
    pub fn new(value: T) -> Self {
        Self { value, dirty: true }
    }

    /// Current value.
    pub fn get(&self) -> &T {
        &self.value
    }

    /// Stores `value`, marking the wrapper dirty iff it differs from the current value.
    pub fn set(&mut self, value: T) {
        if self.value != value {
            self.value = value;
            self.dirty = true;
        }
    }

    /// Whether a change is pending, without consuming it.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Returns the dirty flag and clears it.
    pub fn drop_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }
}

impl<T: PartialEq + Default> Default for TrackedValue<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
