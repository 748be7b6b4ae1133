//! Release velocity estimation
//!
//! Hosts usually report a velocity with each pan update. When one is missing
//! the tracker estimates it from the samples seen in the last
//! [`WINDOW_MS`] milliseconds.

use smallvec::SmallVec;

/// Maximum fling velocity in units per second
pub const MAX_FLING_VELOCITY: f32 = 8_000.0;

/// Samples older than this (relative to the newest) are ignored
pub const WINDOW_MS: f64 = 100.0;

#[derive(Clone, Copy, Debug)]
struct Sample {
    time_ms: f64,
    position: f32,
}

#[derive(Clone, Debug, Default)]
pub struct VelocityTracker {
    samples: SmallVec<[Sample; 16]>,
}

impl VelocityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.samples.clear();
    }

    pub fn add_sample(&mut self, time_ms: f64, position: f32) {
        // Out-of-order timestamps restart the window
        if let Some(last) = self.samples.last() {
            if time_ms < last.time_ms {
                self.samples.clear();
            }
        }
        self.samples.push(Sample { time_ms, position });

        let cutoff = time_ms - WINDOW_MS;
        let stale = self
            .samples
            .iter()
            .take_while(|s| s.time_ms < cutoff)
            .count();
        if stale > 0 {
            self.samples.drain(..stale);
        }
    }

    /// Units per second, clamped to [`MAX_FLING_VELOCITY`]
    pub fn velocity(&self) -> f32 {
        let (Some(first), Some(last)) = (self.samples.first(), self.samples.last()) else {
            return 0.0;
        };
        let dt_ms = last.time_ms - first.time_ms;
        if dt_ms <= f64::EPSILON {
            return 0.0;
        }
        let velocity = (last.position - first.position) / (dt_ms as f32 / 1000.0);
        velocity.clamp(-MAX_FLING_VELOCITY, MAX_FLING_VELOCITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracker_measures_steady_drag() {
        let mut tracker = VelocityTracker::new();
        for frame in 0..10 {
            // -20 units every 16ms
            tracker.add_sample(frame as f64 * 16.0, -20.0 * frame as f32);
        }
        let velocity = tracker.velocity();
        assert!((velocity + 1250.0).abs() < 1.0, "velocity was {velocity}");
    }

    #[test]
    fn test_tracker_drops_old_samples() {
        let mut tracker = VelocityTracker::new();
        tracker.add_sample(0.0, 0.0);
        tracker.add_sample(10.0, 500.0);
        // Finger rests for a while: the fling is forgotten
        tracker.add_sample(200.0, 500.0);
        tracker.add_sample(216.0, 500.0);
        assert_eq!(tracker.velocity(), 0.0);
    }

    #[test]
    fn test_tracker_clamps_and_handles_empty() {
        let mut tracker = VelocityTracker::new();
        assert_eq!(tracker.velocity(), 0.0);
        tracker.add_sample(0.0, 0.0);
        tracker.add_sample(1.0, 1000.0);
        assert_eq!(tracker.velocity(), MAX_FLING_VELOCITY);
    }
}
