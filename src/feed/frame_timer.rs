//! Frame timer
//!
//! Keeps the lengths of the most recent frames and turns them into an
//! averaged frame rate.

use std::time::Duration;

/// Frames averaged into one fps reading
pub const FRAME_WINDOW: usize = 100;

/// Default frame cap of the render loop
pub const DEFAULT_FRAME_CAP: u32 = 105;

#[derive(Debug, Clone)]
pub struct FrameTimer {
    lengths: [Duration; FRAME_WINDOW],
    next: usize,
    frames: u64,
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameTimer {
    pub fn new() -> Self {
        Self {
            lengths: [Duration::ZERO; FRAME_WINDOW],
            next: 0,
            frames: 0,
        }
    }

    /// Record the length of one finished frame
    pub fn record(&mut self, length: Duration) {
        self.lengths[self.next] = length;
        self.next = (self.next + 1) % FRAME_WINDOW;
        self.frames += 1;
    }

    /// Total frames recorded
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Mean frame length over the window, once the window has filled
    pub fn average_frame_length(&self) -> Option<Duration> {
        if self.frames < FRAME_WINDOW as u64 {
            return None;
        }
        let total: Duration = self.lengths.iter().sum();
        Some(total / FRAME_WINDOW as u32)
    }

    /// Frames per second over the window.
    ///
    /// `None` until [`FRAME_WINDOW`] frames were recorded, or while the
    /// window holds only zero-length frames.
    pub fn average_fps(&self) -> Option<f64> {
        let average = self.average_frame_length()?.as_secs_f64();
        (average > 0.0).then_some(1.0 / average)
    }

    /// How long to wait after `work` so a frame lasts `1 / cap` seconds
    pub fn frame_budget(work: Duration, cap: u32) -> Duration {
        let target = Duration::from_secs_f64(1.0 / f64::from(cap.max(1)));
        target.saturating_sub(work)
    }
}
