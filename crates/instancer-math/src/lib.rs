// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Float32 linear algebra for motion-blurred instancing.
//!
//! Vectors, quaternions, 3×3 matrices and affine transforms in column-major
//! layout, plus closed-interval arithmetic used to enclose transformed
//! bounds over a time span. Nothing here allocates or panics on degenerate
//! input: non-finite results propagate so callers can filter them.
#![forbid(unsafe_code)]

use std::f32::consts::TAU;

mod affine;
mod interval;
mod mat3;
mod quat;
mod vec3;

pub use affine::AffineTransform;
pub use interval::{Interval, IntervalVec3};
pub use mat3::Mat3;
pub use quat::{Quat, SLERP_LINEAR_THRESHOLD};
pub use vec3::Vec3;

/// Global epsilon used by math routines when detecting degenerate values.
pub const EPSILON: f32 = 1e-6;

/// Clamps `value` to the inclusive `[min, max]` range.
///
/// `min > max` is a caller bug and trips a debug assertion; release builds
/// return `min`.
pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
    debug_assert!(min <= max, "invalid clamp range: {min} > {max}");
    value.min(max).max(min)
}

/// Scalar `(1 - t) * a + t * b`, exact at both endpoints.
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    (1.0 - t) * a + t * b
}

/// Converts degrees to radians.
pub fn deg_to_rad(value: f32) -> f32 {
    value * (TAU / 360.0)
}

/// Converts radians to degrees.
pub fn rad_to_deg(value: f32) -> f32 {
    value * (360.0 / TAU)
}
