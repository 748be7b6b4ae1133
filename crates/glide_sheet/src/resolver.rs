//! Snap resolution
//!
//! Picks where a released (or commanded) sheet comes to rest. Releases are
//! classified by projecting the release velocity forward with the same
//! exponential deceleration a native scroll view uses, then choosing the snap
//! point nearest to the projected resting place.

use glide_animation::project;
use smallvec::SmallVec;

use crate::config::SheetConfig;
use crate::snap::{SnapTable, CLOSED_INDEX};

/// Costs within this distance are considered tied
const TIE_EPSILON: f32 = 1e-3;

/// Explicit destination from the programmatic API
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SnapTarget {
    /// Table index; -1 closes
    Index(i32),
    /// Arbitrary position, clamped into the table's range
    Position(f32),
    Close,
}

/// Resolved destination
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Resolution {
    /// Index committed once the settle completes
    pub index: i32,
    pub position: f32,
}

impl Resolution {
    pub fn closed(table: &SnapTable) -> Self {
        Self {
            index: CLOSED_INDEX,
            position: table.closed_position(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SnapResolver {
    velocity_threshold: f32,
    deceleration_rate: f32,
    /// Closed sentinel is a release candidate
    allow_close: bool,
}

impl SnapResolver {
    pub fn new(velocity_threshold: f32, deceleration_rate: f32, allow_close: bool) -> Self {
        Self {
            velocity_threshold: velocity_threshold.max(0.0),
            deceleration_rate,
            allow_close,
        }
    }

    pub fn from_config(config: &SheetConfig) -> Self {
        Self::new(
            config.gesture.velocity_threshold,
            config.gesture.deceleration_rate,
            config.enable_pan_down_to_close,
        )
    }

    /// Where a release at `position` moving at `velocity` (units/s) would
    /// coast to
    pub fn projected_position(&self, position: f32, velocity: f32) -> f32 {
        if velocity.abs() < self.velocity_threshold {
            return position;
        }
        position + project(velocity, self.deceleration_rate)
    }

    /// Resolve a destination
    ///
    /// An explicit target always wins. The result is always inside the
    /// table's index range; an empty table resolves to closed.
    pub fn resolve(
        &self,
        position: f32,
        velocity: f32,
        table: &SnapTable,
        explicit: Option<SnapTarget>,
    ) -> Resolution {
        if table.is_empty() {
            return Resolution::closed(table);
        }
        match explicit {
            Some(target) => self.resolve_explicit(target, table),
            None => self.resolve_release(position, velocity, table),
        }
    }

    fn resolve_explicit(&self, target: SnapTarget, table: &SnapTable) -> Resolution {
        match target {
            SnapTarget::Close => Resolution::closed(table),
            SnapTarget::Index(index) => {
                let clamped = table.clamp_index(index);
                if clamped != index {
                    tracing::debug!("snap index {} clamped to {}", index, clamped);
                }
                Resolution {
                    index: clamped,
                    position: table
                        .position(clamped)
                        .unwrap_or(table.closed_position()),
                }
            }
            SnapTarget::Position(position) => {
                let position = if position.is_finite() {
                    position.clamp(table.top_position(), table.closed_position())
                } else {
                    table.closed_position()
                };
                let index = if position >= table.closed_position() {
                    CLOSED_INDEX
                } else {
                    table.nearest_index(position)
                };
                Resolution { index, position }
            }
        }
    }

    fn resolve_release(&self, position: f32, velocity: f32, table: &SnapTable) -> Resolution {
        let projected = self.projected_position(position, velocity);
        let direction = if velocity.abs() < self.velocity_threshold {
            0.0
        } else {
            velocity.signum()
        };

        let mut candidates: SmallVec<[Resolution; 6]> = table
            .positions()
            .iter()
            .enumerate()
            .map(|(index, &position)| Resolution {
                index: index as i32,
                position,
            })
            .collect();
        if self.allow_close {
            candidates.push(Resolution::closed(table));
        }

        let mut best = candidates[0];
        for &candidate in candidates.iter().skip(1) {
            if self.prefer(candidate, best, position, projected, direction) {
                best = candidate;
            }
        }

        tracing::debug!(
            "release at {:.1} v={:.0} projected {:.1} -> index {} ({:.1})",
            position,
            velocity,
            projected,
            best.index,
            best.position
        );
        best
    }

    /// Whether `a` beats `b`
    fn prefer(
        &self,
        a: Resolution,
        b: Resolution,
        position: f32,
        projected: f32,
        direction: f32,
    ) -> bool {
        let cost_a = (a.position - projected).abs();
        let cost_b = (b.position - projected).abs();
        if (cost_a - cost_b).abs() > TIE_EPSILON {
            return cost_a < cost_b;
        }

        // Tied: favour the point lying in the direction of travel
        let along = |r: Resolution| direction != 0.0 && (r.position - position) * direction > 0.0;
        match (along(a), along(b)) {
            (true, false) => return true,
            (false, true) => return false,
            _ => {}
        }
        (a.position - position).abs() < (b.position - position).abs()
    }
}
