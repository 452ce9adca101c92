//! # Core Module
//!
//! Small building blocks shared by the world, player and rendering code.
//!
//! ## Key Components
//! - `MtResource`: Thread-safe reference-counted resource with read-write locking,
//!   used for chunk payloads that worker threads fill in
//! - `TrackedValue`: A value wrapper with a one-shot dirty signal
//! - `Timer`: Countdown used for mine/place cooldowns
//! - `FrameTimeStats`: Ring buffer of recent frame times
//! - `FramePacer`: Measures frame delta and caps the frame rate
//!
//! ## Usage
//! ```rust
//! use voxel_world::core::{MtResource, TrackedValue};
//!
//! let counter = MtResource::new(0);
//! *counter.get_mut() += 1;
//! assert_eq!(*counter.get(), 1);
//!
//! let mut chunk_index = TrackedValue::new((0, 0));
//! assert!(chunk_index.drop_dirty());
//! chunk_index.set((0, 0));
//! assert!(!chunk_index.drop_dirty());
//! ```

pub mod mt_resource;
pub mod timing;
pub mod tracked_value;

pub use mt_resource::MtResource;
pub use timing::{FramePacer, FrameTimeStats, Timer};
pub use tracked_value::TrackedValue;
