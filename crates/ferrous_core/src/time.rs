//! Frame timing.
//!
//! The host runner owns a [`TimeClock`] and calls [`TimeClock::tick`] once
//! at the top of every frame; the resulting [`Time`] snapshot is handed to
//! application callbacks by value.

#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;
#[cfg(target_arch = "wasm32")]
use web_time::Instant;

/// Longest frame delta reported to callers, in seconds.
pub const MAX_DELTA: f32 = 0.1;

/// Timing snapshot for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Time {
    /// Seconds since the previous frame, clamped to [`MAX_DELTA`].
    pub delta: f32,
    /// Seconds since the clock was created.
    pub elapsed: f64,
    /// Zero-based index of this frame.
    pub frame: u64,
}

impl Time {
    /// Frames per second derived from `delta`, or `0.0` on the first frame.
    pub fn fps(&self) -> f32 {
        if self.delta > 0.0 {
            1.0 / self.delta
        } else {
            0.0
        }
    }
}

/// Produces [`Time`] snapshots.
#[derive(Debug, Clone)]
pub struct TimeClock {
    start: Instant,
    last: Instant,
    frame: u64,
}

impl TimeClock {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last: now,
            frame: 0,
        }
    }

    /// Snapshot without advancing the frame counter.
    pub fn peek(&self) -> Time {
        self.snapshot(Instant::now())
    }

    /// Advance by one frame and return that frame's snapshot.
    pub fn tick(&mut self) -> Time {
        let now = Instant::now();
        let time = self.snapshot(now);
        self.last = now;
        self.frame += 1;
        time
    }

    /// Number of completed `tick` calls.
    pub fn frames(&self) -> u64 {
        self.frame
    }

    fn snapshot(&self, now: Instant) -> Time {
        Time {
            delta: (now - self.last).as_secs_f32().min(MAX_DELTA),
            elapsed: (now - self.start).as_secs_f64(),
            frame: self.frame,
        }
    }
}

impl Default for TimeClock {
    fn default() -> Self {
        Self::new()
    }
}
