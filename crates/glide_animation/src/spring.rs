//! Spring physics animation
//!
//! RK4-integrated spring used for sheet settle transitions. A spring can be
//! seeded with a release velocity so the settle continues the finger's motion
//! instead of starting from rest.

use serde::{Deserialize, Serialize};

/// Configuration for a spring animation
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpringConfig {
    pub stiffness: f32,
    pub damping: f32,
    pub mass: f32,
    /// Distance from target under which the spring may rest
    pub rest_displacement: f32,
    /// Speed under which the spring may rest
    pub rest_velocity: f32,
}

impl SpringConfig {
    /// Create a new spring configuration with default rest thresholds
    pub fn new(stiffness: f32, damping: f32, mass: f32) -> Self {
        Self {
            stiffness,
            damping,
            mass,
            ..Self::stiff()
        }
    }

    /// A gentle, slow spring
    pub fn gentle() -> Self {
        Self::preset(120.0, 14.0)
    }

    /// A wobbly spring with visible overshoot
    pub fn wobbly() -> Self {
        Self::preset(180.0, 12.0)
    }

    /// A stiff, snappy spring
    pub fn stiff() -> Self {
        Self::preset(400.0, 30.0)
    }

    /// Critically damped at unit mass: reaches the snap point without overshoot
    pub fn sheet() -> Self {
        Self::preset(500.0, 2.0 * 500.0_f32.sqrt())
    }

    fn preset(stiffness: f32, damping: f32) -> Self {
        Self {
            stiffness,
            damping,
            mass: 1.0,
            rest_displacement: 0.5,
            rest_velocity: 5.0,
        }
    }

    /// Calculate critical damping for this spring's stiffness and mass
    pub fn critical_damping(&self) -> f32 {
        2.0 * (self.stiffness * self.mass).sqrt()
    }

    pub fn is_underdamped(&self) -> bool {
        self.damping < self.critical_damping()
    }

    /// All parameters are finite and strictly positive
    pub fn is_valid(&self) -> bool {
        [
            self.stiffness,
            self.damping,
            self.mass,
            self.rest_displacement,
            self.rest_velocity,
        ]
        .iter()
        .all(|v| v.is_finite() && *v > 0.0)
    }
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self::stiff()
    }
}

/// A spring-based animator
#[derive(Clone, Copy, Debug)]
pub struct Spring {
    config: SpringConfig,
    value: f32,
    velocity: f32,
    target: f32,
}

impl Spring {
    pub fn new(config: SpringConfig, initial: f32) -> Self {
        Self {
            config,
            value: initial,
            velocity: 0.0,
            target: initial,
        }
    }

    /// Start from `initial` already moving at `velocity` units per second
    pub fn with_velocity(config: SpringConfig, initial: f32, velocity: f32) -> Self {
        Self {
            velocity: if velocity.is_finite() { velocity } else { 0.0 },
            ..Self::new(config, initial)
        }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn config(&self) -> &SpringConfig {
        &self.config
    }

    /// Retarget mid-flight; current velocity is kept
    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    /// Jump to `value` and stop
    pub fn snap_to(&mut self, value: f32) {
        self.value = value;
        self.target = value;
        self.velocity = 0.0;
    }

    /// Within the rest thresholds of the target
    pub fn is_settled(&self) -> bool {
        (self.value - self.target).abs() < self.config.rest_displacement
            && self.velocity.abs() < self.config.rest_velocity
    }

    /// Step the simulation by `dt` seconds using RK4 integration
    ///
    /// Returns `true` while the spring is still moving. Once settled the value
    /// is pinned exactly to the target.
    pub fn step(&mut self, dt: f32) -> bool {
        if self.is_settled() {
            self.value = self.target;
            self.velocity = 0.0;
            return false;
        }

        let half = dt * 0.5;

        let k1_v = self.acceleration(self.value, self.velocity);
        let k1_x = self.velocity;

        let k2_v = self.acceleration(self.value + k1_x * half, self.velocity + k1_v * half);
        let k2_x = self.velocity + k1_v * half;

        let k3_v = self.acceleration(self.value + k2_x * half, self.velocity + k2_v * half);
        let k3_x = self.velocity + k2_v * half;

        let k4_v = self.acceleration(self.value + k3_x * dt, self.velocity + k3_v * dt);
        let k4_x = self.velocity + k3_v * dt;

        self.velocity += (k1_v + 2.0 * k2_v + 2.0 * k3_v + k4_v) * dt / 6.0;
        self.value += (k1_x + 2.0 * k2_x + 2.0 * k3_x + k4_x) * dt / 6.0;

        if self.is_settled() {
            self.value = self.target;
            self.velocity = 0.0;
            return false;
        }
        true
    }

    fn acceleration(&self, x: f32, v: f32) -> f32 {
        let spring_force = -self.config.stiffness * (x - self.target);
        let damping_force = -self.config.damping * v;
        (spring_force + damping_force) / self.config.mass
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(spring: &mut Spring, frames: usize) {
        for _ in 0..frames {
            if !spring.step(1.0 / 60.0) {
                break;
            }
        }
    }

    #[test]
    fn test_spring_settles_exactly_on_target() {
        let mut spring = Spring::new(SpringConfig::stiff(), 600.0);
        spring.set_target(400.0);

        run(&mut spring, 120);

        assert!(spring.is_settled());
        assert_eq!(spring.value(), 400.0);
        assert_eq!(spring.velocity(), 0.0);
    }

    #[test]
    fn test_spring_release_velocity_carries_motion() {
        // Released moving upward (negative) toward a target below: the spring
        // first continues upward before turning around.
        let mut spring = Spring::with_velocity(SpringConfig::sheet(), 320.0, -1500.0);
        spring.set_target(400.0);

        spring.step(1.0 / 60.0);
        assert!(spring.value() < 320.0);

        run(&mut spring, 240);
        assert_eq!(spring.value(), 400.0);
    }

    #[test]
    fn test_spring_retarget_keeps_velocity() {
        let mut spring = Spring::new(SpringConfig::wobbly(), 0.0);
        spring.set_target(100.0);
        for _ in 0..10 {
            spring.step(1.0 / 60.0);
        }

        let velocity = spring.velocity();
        assert!(velocity > 0.0);

        spring.set_target(50.0);
        assert_eq!(spring.velocity(), velocity);
    }

    #[test]
    fn test_sheet_preset_does_not_overshoot() {
        let config = SpringConfig::sheet();
        assert!(!config.is_underdamped());

        let mut spring = Spring::new(config, 600.0);
        spring.set_target(80.0);
        for _ in 0..240 {
            spring.step(1.0 / 60.0);
            assert!(spring.value() >= 80.0 - config.rest_displacement);
        }
    }

    #[test]
    fn test_spring_config_validation() {
        assert!(SpringConfig::stiff().is_valid());
        assert!(!SpringConfig::new(0.0, 10.0, 1.0).is_valid());
        assert!(!SpringConfig::new(100.0, f32::NAN, 1.0).is_valid());
    }

    #[test]
    fn test_spring_non_finite_release_velocity_is_dropped() {
        let spring = Spring::with_velocity(SpringConfig::stiff(), 10.0, f32::INFINITY);
        assert_eq!(spring.velocity(), 0.0);
    }
}
