//! Counters for every path that skips or fails work, printed by the debug
//! text overlay.

/// Running totals since startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Diagnostics {
    /// Chunks whose blocks and mesh were generated.
    pub chunks_generated: u64,
    /// Chunk meshes handed to the uploader successfully.
    pub chunks_uploaded: u64,
    /// Uploads that failed and will be retried.
    pub upload_failures: u64,
    /// Block edits applied to the world.
    pub edits_applied: u64,
    /// Mine/place requests refused by validation.
    pub rejected_edits: u64,
    /// Background tasks that panicked.
    pub worker_panics: u64,
}
