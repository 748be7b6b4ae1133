//! Momentum decay and overdrag resistance
//!
//! [`project`] estimates where a released sheet would come to rest if it kept
//! decelerating like a native scroll view. [`rubber_band`] damps movement past
//! a bound so overdrag feels elastic instead of hitting a wall.

/// Per-millisecond velocity retention of a normal native scroll view
pub const DEFAULT_DECELERATION_RATE: f32 = 0.998;

/// Largest rate accepted before projection distance explodes
const MAX_DECELERATION_RATE: f32 = 0.9999;

/// Distance travelled by a body moving at `velocity` (units/s) that keeps
/// `deceleration_rate` of its velocity every millisecond
///
/// Geometric series: `v/1000 * r / (1 - r)`. A rate of zero stops instantly.
pub fn project(velocity: f32, deceleration_rate: f32) -> f32 {
    if !velocity.is_finite() || deceleration_rate <= 0.0 {
        return 0.0;
    }
    let rate = deceleration_rate.min(MAX_DECELERATION_RATE);
    velocity / 1000.0 * rate / (1.0 - rate)
}

/// Resisted displacement for an `overshoot` past a bound
///
/// Approaches `dimension` asymptotically; `coefficient` controls stiffness
/// (0.55 matches the platform scroll view). Sign of `overshoot` is kept.
pub fn rubber_band(overshoot: f32, dimension: f32, coefficient: f32) -> f32 {
    if overshoot == 0.0 || dimension <= 0.0 || coefficient <= 0.0 {
        return 0.0;
    }
    let magnitude = overshoot.abs();
    let resisted = (1.0 - 1.0 / (magnitude * coefficient / dimension + 1.0)) * dimension;
    resisted.copysign(overshoot)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projection_direction_and_magnitude() {
        let up = project(-2000.0, DEFAULT_DECELERATION_RATE);
        assert!((up + 998.0).abs() < 0.5);

        let down = project(500.0, DEFAULT_DECELERATION_RATE);
        assert!(down > 0.0);
        assert_eq!(project(500.0, 0.0), 0.0);
        assert_eq!(project(f32::NAN, DEFAULT_DECELERATION_RATE), 0.0);
    }

    #[test]
    fn test_projection_rate_is_capped() {
        assert!(project(1000.0, 1.0).is_finite());
    }

    #[test]
    fn test_rubber_band_is_sublinear_and_bounded() {
        let dimension = 800.0;
        let small = rubber_band(10.0, dimension, 0.55);
        let large = rubber_band(1000.0, dimension, 0.55);

        assert!(small > 0.0 && small < 10.0);
        assert!(large < dimension);
        assert!(large > small);
        assert!(rubber_band(-50.0, dimension, 0.55) < 0.0);
        assert_eq!(rubber_band(0.0, dimension, 0.55), 0.0);
    }
}
