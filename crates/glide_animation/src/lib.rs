//! Glide Animation System
//!
//! Motion primitives used by the sheet state machine.
//!
//! # Features
//!
//! - **Spring Physics**: RK4-integrated springs with stiffness, damping, mass
//! - **Tweens**: Fixed-duration transitions shaped by an easing curve
//! - **Interpolation**: Piecewise-linear mapping with clamp/extend modes
//! - **Decay**: Ballistic projection of a release velocity and rubber-band
//!   resistance past a bound
//! - **Velocity Tracking**: Windowed velocity estimation from position samples
//! - **Interruptible**: Springs inherit velocity when retargeted mid-flight

pub mod decay;
pub mod easing;
pub mod spring;
pub mod tween;
pub mod values;
pub mod velocity;

pub use decay::{project, rubber_band, DEFAULT_DECELERATION_RATE};
pub use easing::Easing;
pub use spring::{Spring, SpringConfig};
pub use tween::Tween;
pub use values::{interpolate, Extrapolate, Interpolate};
pub use velocity::{VelocityTracker, MAX_FLING_VELOCITY};
