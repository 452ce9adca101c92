//! # Chunk Generation State
//!
//! Per-chunk lifecycle, stored in an atomic so that worker threads and the
//! main thread can hand a chunk back and forth without a lock:
//!
//! ```text
//! NotYet ──CAS──► CreatingParallel ──store──► FinishedParallel ──store──► FinishedAll
//!   ▲                   │                     (blocks + mesh written)     (mesh uploaded,
//!   └── panic unwind ───┘                                                  main thread)
//! ```
//!
//! The CAS out of `NotYet` is the admission ticket: at most one thread ever
//! generates a given chunk. The release store into `FinishedParallel` happens
//! after the blocks and mesh are written, and readers load with acquire
//! ordering before touching them.

use std::sync::atomic::{AtomicU8, Ordering};

/// Where a chunk is in its generate → mesh → upload lifecycle.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChunkGenerationState {
    NotYet = 0,
    CreatingParallel = 1,
    FinishedParallel = 2,
    FinishedAll = 3,
}

impl ChunkGenerationState {
    fn decode(raw: u8) -> Self {
        match raw {
            0 => Self::NotYet,
            1 => Self::CreatingParallel,
            2 => Self::FinishedParallel,
            3 => Self::FinishedAll,
            other => panic!("chunk generation state holds impossible value {other}"),
        }
    }

    /// Whether the chunk's blocks and mesh have been written.
    pub fn has_payload(self) -> bool {
        self >= Self::FinishedParallel
    }
}

/// Atomic cell holding a [`ChunkGenerationState`].
#[derive(Debug, Default)]
pub struct AtomicGenerationState(AtomicU8);

impl AtomicGenerationState {
    pub fn new() -> Self {
        Self(AtomicU8::new(ChunkGenerationState::NotYet as u8))
    }

    pub fn load(&self) -> ChunkGenerationState {
        ChunkGenerationState::decode(self.0.load(Ordering::Acquire))
    }

    /// Claims the chunk for generation. Returns `false` if another thread
    /// already claimed it or it is past `NotYet`.
    pub fn try_begin_creating(&self) -> bool {
        self.0
            .compare_exchange(
                ChunkGenerationState::NotYet as u8,
                ChunkGenerationState::CreatingParallel as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    /// Publishes a generated chunk. Must follow a successful
    /// [`try_begin_creating`](Self::try_begin_creating).
    pub fn finish_parallel(&self) {
        self.transition(
            ChunkGenerationState::CreatingParallel,
            ChunkGenerationState::FinishedParallel,
        );
    }

    /// Marks the chunk's mesh as uploaded. Main thread only.
    pub fn finish_all(&self) {
        self.transition(
            ChunkGenerationState::FinishedParallel,
            ChunkGenerationState::FinishedAll,
        );
    }

    /// Releases a claim taken by a generator that did not finish.
    pub fn abandon_creating(&self) {
        self.transition(
            ChunkGenerationState::CreatingParallel,
            ChunkGenerationState::NotYet,
        );
    }

    fn transition(&self, from: ChunkGenerationState, to: ChunkGenerationState) {
        let current = self.load();
        assert_eq!(
            current, from,
            "chunk generation state moved {current:?} -> {to:?}, expected to leave {from:?}"
        );
        self.0.store(to as u8, Ordering::Release);
    }
}
