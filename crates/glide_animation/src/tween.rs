//! Fixed-duration transitions
//!
//! A [`Tween`] moves a single `f32` from one value to another over a duration
//! in milliseconds, shaped by an [`Easing`]. Retargeting starts a fresh tween
//! from wherever the current one is, so a timed value never jumps.

use crate::easing::Easing;
use crate::values::Interpolate;

#[derive(Clone, Copy, Debug)]
pub struct Tween {
    from: f32,
    to: f32,
    duration_ms: f32,
    elapsed_ms: f32,
    easing: Easing,
}

impl Tween {
    pub fn new(from: f32, to: f32, duration_ms: f32, easing: Easing) -> Self {
        Self {
            from,
            to,
            duration_ms: duration_ms.max(0.0),
            elapsed_ms: 0.0,
            easing,
        }
    }

    /// A tween already resting at `value`
    pub fn at_rest(value: f32) -> Self {
        Self::new(value, value, 0.0, Easing::Linear)
    }

    pub fn from(&self) -> f32 {
        self.from
    }

    pub fn target(&self) -> f32 {
        self.to
    }

    pub fn duration_ms(&self) -> f32 {
        self.duration_ms
    }

    /// Progress through the duration in `[0, 1]`
    pub fn progress(&self) -> f32 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        (self.elapsed_ms / self.duration_ms).clamp(0.0, 1.0)
    }

    pub fn value(&self) -> f32 {
        self.from.lerp(&self.to, self.easing.apply(self.progress()))
    }

    pub fn is_finished(&self) -> bool {
        self.progress() >= 1.0
    }

    /// Advance by `dt_ms`; returns `true` while still running
    pub fn tick(&mut self, dt_ms: f32) -> bool {
        if self.is_finished() {
            return false;
        }
        self.elapsed_ms = (self.elapsed_ms + dt_ms.max(0.0)).min(self.duration_ms);
        !self.is_finished()
    }

    /// Head toward `to` from the current value over a new duration
    pub fn retarget(&mut self, to: f32, duration_ms: f32) {
        *self = Tween::new(self.value(), to, duration_ms, self.easing);
    }
}
