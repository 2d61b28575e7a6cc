use std::time::Instant;

use tracing::debug;

/// Gates simulation frames to a fixed rate from a monotonic "now".
///
/// The host may call [`tick`](Self::tick) as often as it likes; a frame is
/// only due once a full frame interval has passed since the previous one.
/// Long gaps (suspend, a stalled window) are reported as a single nominal
/// frame so particles never jump across the screen.
#[derive(Clone, Debug)]
pub struct FrameClock {
    frame_interval: f64,
    max_frame_dt: f64,
    last: Option<f64>,
}

impl FrameClock {
    pub fn new(frame_rate: f32, max_frame_dt: f32) -> Self {
        Self {
            frame_interval: 1.0 / frame_rate as f64,
            max_frame_dt: max_frame_dt as f64,
            last: None,
        }
    }

    /// Seconds between simulated frames.
    pub fn frame_interval(&self) -> f32 {
        self.frame_interval as f32
    }

    /// Feed the current time in seconds. Returns the dt to simulate when a
    /// frame is due.
    pub fn tick(&mut self, now: f64) -> Option<f32> {
        let Some(last) = self.last else {
            self.last = Some(now);
            return None;
        };

        let elapsed = now - last;
        if !elapsed.is_finite() || elapsed < 0.0 {
            // Clock went backwards or produced garbage: restart from here.
            self.last = Some(now);
            return None;
        }
        if elapsed < self.frame_interval {
            return None;
        }

        self.last = Some(now);
        if elapsed > self.max_frame_dt {
            debug!(elapsed, "long frame gap, simulating one nominal frame");
            return Some(self.frame_interval as f32);
        }
        Some(elapsed as f32)
    }

    /// Forget the previous timestamp; the next tick only re-arms the clock.
    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// Monotonic seconds since creation, for native hosts.
#[derive(Clone, Copy, Debug)]
pub struct Stopwatch {
    start: Instant,
}

impl Stopwatch {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn now_secs(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}
