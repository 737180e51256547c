use std::time::{Duration, Instant};

/// Fixed-rate pacing for the frame producer.
pub struct CapturePacing {
    frame_duration: Duration,
}

impl CapturePacing {
    pub fn new(fps: f64) -> Self {
        Self {
            frame_duration: Duration::from_secs_f64(1.0 / fps),
        }
    }

    pub fn frame_duration(&self) -> Duration {
        self.frame_duration
    }

    /// Time left in the current frame period, if any.
    pub fn remaining(&self, elapsed: Duration) -> Option<Duration> {
        self.frame_duration.checked_sub(elapsed).filter(|d| !d.is_zero())
    }

    /// Sleep out the rest of the frame period that began at `start`.
    pub fn wait(&self, start: Instant) {
        if let Some(remaining) = self.remaining(start.elapsed()) {
            std::thread::sleep(remaining);
        }
    }
}
