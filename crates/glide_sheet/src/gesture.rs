//! Gesture-to-motion bridge
//!
//! Hosts feed pan events in; the bridge turns them into sheet positions.
//! A [`GestureSession`] lives from `Begin` to `End`/`Cancel` and never leaves
//! this crate.

use glide_animation::{rubber_band, VelocityTracker};

use crate::resolver::Resolution;
use crate::snap::SnapTable;

/// Pan gesture input
///
/// Translations are cumulative since `Begin`, in layout units, positive
/// downward. Velocities are units per second; when the host does not supply
/// one it is estimated from recent updates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GestureEvent {
    Begin {
        timestamp_ms: f64,
    },
    Update {
        translation_y: f32,
        velocity_y: Option<f32>,
        timestamp_ms: f64,
    },
    End {
        translation_y: f32,
        velocity_y: Option<f32>,
        timestamp_ms: f64,
    },
    /// The system took the gesture away
    ///
    /// Reverts to the pre-drag position. A drag that interrupted a settle
    /// resumes that settle's target instead, since the pre-drag position
    /// was only a point along the way.
    Cancel,
}

/// Drag limits for one table
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragBounds {
    /// Smallest position (tallest sheet)
    pub min: f32,
    /// Largest position before resistance kicks in
    pub max: f32,
    /// Hard floor: the sheet can never go below closed
    pub closed: f32,
    pub over_drag: bool,
    pub resistance: f32,
}

impl DragBounds {
    pub fn new(table: &SnapTable, pan_down_to_close: bool, over_drag: bool, resistance: f32) -> Self {
        let max = if pan_down_to_close {
            table.closed_position()
        } else {
            table.bottom_position()
        };
        Self {
            min: table.top_position(),
            max,
            closed: table.closed_position(),
            over_drag,
            resistance,
        }
    }

    /// Map an unconstrained position onto what the sheet shows
    pub fn apply(&self, raw: f32) -> f32 {
        let dimension = self.closed.max(1.0);
        let position = if raw < self.min {
            if self.over_drag {
                self.min - rubber_band(self.min - raw, dimension, self.resistance)
            } else {
                self.min
            }
        } else if raw > self.max {
            if self.over_drag {
                self.max + rubber_band(raw - self.max, dimension, self.resistance)
            } else {
                self.max
            }
        } else {
            raw
        };
        position.min(self.closed)
    }
}

/// State of one physical drag
#[derive(Clone, Debug)]
pub(crate) struct GestureSession {
    anchor: f32,
    translation: f32,
    reported_velocity: Option<f32>,
    tracker: VelocityTracker,
    /// Settle that this drag interrupted; cancel returns there
    interrupted: Option<Resolution>,
}

impl GestureSession {
    pub(crate) fn begin(anchor: f32, timestamp_ms: f64, interrupted: Option<Resolution>) -> Self {
        let mut tracker = VelocityTracker::new();
        tracker.add_sample(timestamp_ms, anchor);
        Self {
            anchor,
            translation: 0.0,
            reported_velocity: None,
            tracker,
            interrupted,
        }
    }

    pub(crate) fn anchor(&self) -> f32 {
        self.anchor
    }

    pub(crate) fn interrupted(&self) -> Option<Resolution> {
        self.interrupted
    }

    /// Record an update and return the constrained position
    pub(crate) fn update(
        &mut self,
        translation_y: f32,
        velocity_y: Option<f32>,
        timestamp_ms: f64,
        bounds: &DragBounds,
    ) -> f32 {
        if translation_y.is_finite() {
            self.translation = translation_y;
        } else {
            tracing::warn!("ignoring non-finite gesture translation");
        }
        self.reported_velocity = velocity_y.filter(|v| v.is_finite());
        let raw = self.anchor + self.translation;
        self.tracker.add_sample(timestamp_ms, raw);
        bounds.apply(raw)
    }

    /// Release velocity: the host's if it sent one, otherwise estimated
    pub(crate) fn velocity(&self) -> f32 {
        self.reported_velocity
            .unwrap_or_else(|| self.tracker.velocity())
    }
}
