//! # Timing
//!
//! Frame-time bookkeeping for the main loop.
//!
//! ## Key Components
//! - `Timer`: A clamped countdown, ticked once per frame. Mine and place
//!   cooldowns are `Timer`s.
//! - `FrameTimeStats`: Fixed-size ring buffer of the last `N` frame times with
//!   O(1) insertion and O(N) mean.
//! - `FramePacer`: Produces `delta_seconds()` from wall-clock time and sleeps
//!   the main thread to hold a target frame rate.

use web_time::{Duration, Instant};

/// A countdown that reports when `duration_seconds` have elapsed.
///
/// Elapsed time is clamped to `[0, duration]`, so a timer that has finished
/// stays finished until [`Timer::reset`] is called.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timer {
    duration_seconds: f32,
    elapsed_seconds: f32,
}

impl Timer {
    /// Creates a timer that has not started counting yet.
    pub fn new(duration_seconds: f32) -> Self {
        Self {
            duration_seconds: duration_seconds.max(0.0),
            elapsed_seconds: 0.0,
        }
    }

    /// Creates a timer that is already finished, so the first use is not delayed.
    pub fn finished(duration_seconds: f32) -> Self {
        let duration_seconds = duration_seconds.max(0.0);
        Self {
            duration_seconds,
            elapsed_seconds: duration_seconds,
        }
    }

    /// Advances the timer by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        self.elapsed_seconds = (self.elapsed_seconds + dt).clamp(0.0, self.duration_seconds);
    }

    /// Whether the full duration has elapsed.
    pub fn is_finished(&self) -> bool {
        self.elapsed_seconds >= self.duration_seconds
    }

    /// Restarts the countdown.
    pub fn reset(&mut self) {
        self.elapsed_seconds = 0.0;
    }

    pub fn duration_seconds(&self) -> f32 {
        self.duration_seconds
    }

    pub fn elapsed_seconds(&self) -> f32 {
        self.elapsed_seconds
    }
}

/// Ring buffer of the most recent `N` frame times, in seconds.
#[derive(Debug, Clone)]
pub struct FrameTimeStats<const N: usize> {
    samples: [f32; N],
    cursor: usize,
    filled: usize,
}

impl<const N: usize> FrameTimeStats<N> {
    pub fn new() -> Self {
        Self {
            samples: [0.0; N],
            cursor: 0,
            filled: 0,
        }
    }

    /// Records one frame time, overwriting the oldest sample once the buffer is full.
    pub fn push(&mut self, frame_seconds: f32) {
        if N == 0 {
            return;
        }
        self.samples[self.cursor] = frame_seconds;
        self.cursor = (self.cursor + 1) % N;
        self.filled = (self.filled + 1).min(N);
    }

    /// Mean of the recorded samples. Before the buffer fills up only the
    /// samples recorded so far count; with no samples the mean is zero.
    pub fn mean(&self) -> f32 {
        if self.filled == 0 {
            return 0.0;
        }
        self.samples[..self.filled].iter().sum::<f32>() / self.filled as f32
    }

    /// Frames per second derived from the mean frame time.
    pub fn mean_fps(&self) -> f32 {
        let mean = self.mean();
        if mean > 0.0 {
            1.0 / mean
        } else {
            0.0
        }
    }

    pub fn len(&self) -> usize {
        self.filled
    }

    pub fn is_empty(&self) -> bool {
        self.filled == 0
    }
}

impl<const N: usize> Default for FrameTimeStats<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Measures per-frame delta time and caps the frame rate.
///
/// The first call to [`FramePacer::begin_frame`] returns the nominal frame
/// time for the target rate, since there is no previous frame to measure.
#[derive(Debug)]
pub struct FramePacer {
    target_frame_time: Duration,
    last_frame: Option<Instant>,
    delta_seconds: f32,
}

impl FramePacer {
    /// # Arguments
    /// * `target_fps` - Frame rate to cap at; 0 disables the cap
    pub fn new(target_fps: u32) -> Self {
        let target_frame_time = if target_fps == 0 {
            Duration::ZERO
        } else {
            Duration::from_secs_f64(1.0 / target_fps as f64)
        };
        Self {
            target_frame_time,
            last_frame: None,
            delta_seconds: target_frame_time.as_secs_f32(),
        }
    }

    /// Marks the start of a frame and updates `delta_seconds()`.
    pub fn begin_frame(&mut self) -> f32 {
        let now = Instant::now();
        if let Some(last) = self.last_frame {
            self.delta_seconds = now.duration_since(last).as_secs_f32();
        }
        self.last_frame = Some(now);
        self.delta_seconds
    }

    /// Sleeps away whatever is left of the frame budget.
    pub fn end_frame(&self) {
        let Some(start) = self.last_frame else {
            return;
        };
        let spent = start.elapsed();
        if spent < self.target_frame_time {
            std::thread::sleep(self.target_frame_time - spent);
        }
    }

    pub fn delta_seconds(&self) -> f32 {
        self.delta_seconds
    }

    pub fn target_frame_time(&self) -> Duration {
        self.target_frame_time
    }
}
