//! Job and result traits for the worker pool.
//!
//! A job runs once on some worker and hands back a boxed result. The result
//! is applied on the frame thread and may only touch engine state through the
//! `Diagnostics` it is given; anything else it shares with the job (chunk
//! payloads, generation states) carries its own synchronization.

use crate::engine_state::diagnostics::Diagnostics;

/// A unit of work that can be executed on a worker thread.
///
/// Tasks should own, or hold shared handles to, everything they need.
pub trait Task: Send {
    /// Performs the work. Runs on a worker thread.
    ///
    /// # Returns
    /// A boxed `TaskResult` that will be processed on the main thread.
    fn process(&self) -> Box<dyn TaskResult + Send>;
}

/// The result of processing a `Task`, consumed on the main thread.
pub trait TaskResult: Send {
    /// Handles the result. Keep it cheap; it runs inside the frame.
    fn handle_result(self: Box<Self>, diagnostics: &mut Diagnostics);
}

/// Stands in for the result of a task that panicked.
pub struct TaskPanicked {
    pub message: String,
}

impl TaskResult for TaskPanicked {
    fn handle_result(self: Box<Self>, diagnostics: &mut Diagnostics) {
        log::error!("Background task panicked: {}", self.message);
        diagnostics.worker_panics += 1;
    }
}
