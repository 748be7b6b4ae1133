//! Interpolation of animatable values
//!
//! [`interpolate`] maps an input through a piecewise-linear range, the way
//! dependent visuals (backdrop opacity, handle indicators) derive their value
//! from the sheet's animated index.

use serde::{Deserialize, Serialize};

/// Trait for values that can be linearly interpolated
pub trait Interpolate: Clone {
    /// Linearly interpolate between self and other by factor t (0.0 to 1.0)
    fn lerp(&self, other: &Self, t: f32) -> Self;

    /// Check if two values are approximately equal (for settling detection)
    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool;
}

impl Interpolate for f32 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        self + (other - self) * t
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        (self - other).abs() < epsilon
    }
}

/// Behaviour outside the first/last input breakpoint
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Extrapolate {
    /// Hold the first/last output
    #[default]
    Clamp,
    /// Continue the slope of the outermost segment
    Extend,
    /// Return the input unchanged
    Identity,
}

/// Piecewise-linear interpolation of `x` over `input` → `output`
///
/// `input` must be non-decreasing and the same length as `output`. A
/// zero-width segment resolves to its right-hand output. Empty ranges return
/// `x` unchanged.
pub fn interpolate(x: f32, input: &[f32], output: &[f32], extrapolate: Extrapolate) -> f32 {
    debug_assert_eq!(input.len(), output.len());
    let len = input.len().min(output.len());
    if len == 0 {
        return x;
    }
    if len == 1 {
        return output[0];
    }

    let first = input[0];
    let last = input[len - 1];

    if x < first || x > last {
        match extrapolate {
            Extrapolate::Clamp => {
                return if x < first { output[0] } else { output[len - 1] };
            }
            Extrapolate::Identity => return x,
            Extrapolate::Extend => {
                let segment = if x < first { 0 } else { len - 2 };
                return segment_value(x, input, output, segment);
            }
        }
    }

    // Last segment whose left edge is <= x, so ties pick the right-hand output
    let segment = (0..len - 1)
        .rev()
        .find(|&i| input[i] <= x)
        .unwrap_or(0);
    segment_value(x, input, output, segment)
}

fn segment_value(x: f32, input: &[f32], output: &[f32], segment: usize) -> f32 {
    let (x0, x1) = (input[segment], input[segment + 1]);
    let (y0, y1) = (output[segment], output[segment + 1]);
    let width = x1 - x0;
    if width.abs() < f32::EPSILON {
        return y1;
    }
    y0.lerp(&y1, (x - x0) / width)
}
