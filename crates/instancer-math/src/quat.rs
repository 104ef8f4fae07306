// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use crate::{Mat3, Vec3, EPSILON};

/// Dot-product threshold above which [`Quat::slerp`] falls back to a
/// normalised linear blend (the arc is too short for a stable `acos`).
pub const SLERP_LINEAR_THRESHOLD: f32 = 0.9995;

/// Quaternion stored as `(x, y, z, w)` with `w` as the scalar part.
///
/// * All angles are expressed in radians.
/// * Rotation helpers normalise internally; arithmetic helpers do not.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Quat {
    data: [f32; 4],
}

impl Quat {
    /// Creates a quaternion from components.
    ///
    /// Use [`Quat::from_axis_angle`] for axis/angle construction.
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { data: [x, y, z, w] }
    }

    /// Returns the identity quaternion.
    pub const fn identity() -> Self {
        Self::new(0.0, 0.0, 0.0, 1.0)
    }

    /// Returns the quaternion as an array `(x, y, z, w)`.
    pub fn to_array(self) -> [f32; 4] {
        self.data
    }

    fn component(&self, idx: usize) -> f32 {
        self.data[idx]
    }

    /// Scalar (real) part.
    pub fn w(&self) -> f32 {
        self.data[3]
    }

    /// Vector (imaginary) part.
    pub fn vector(&self) -> Vec3 {
        Vec3::new(self.data[0], self.data[1], self.data[2])
    }

    /// Constructs a quaternion from a rotation axis and angle in radians.
    ///
    /// Returns the identity quaternion when the axis length is ≤ `EPSILON`.
    pub fn from_axis_angle(axis: Vec3, angle: f32) -> Self {
        let len_sq = axis.length_squared();
        if len_sq <= EPSILON * EPSILON {
            return Self::identity();
        }
        let norm_axis = axis.scale(1.0 / len_sq.sqrt());
        let (sin_half, cos_half) = (angle * 0.5).sin_cos();
        let scaled = norm_axis.scale(sin_half);
        Self::new(scaled.x(), scaled.y(), scaled.z(), cos_half)
    }

    /// Hamilton product of two quaternions (`self * other`).
    ///
    /// Operand order matters: the result applies `other` first, then `self`,
    /// when both are used to rotate vectors.
    pub fn multiply(&self, other: &Self) -> Self {
        let ax = self.component(0);
        let ay = self.component(1);
        let az = self.component(2);
        let aw = self.component(3);

        let bx = other.component(0);
        let by = other.component(1);
        let bz = other.component(2);
        let bw = other.component(3);

        Self::new(
            aw * bx + ax * bw + ay * bz - az * by,
            aw * by - ax * bz + ay * bw + az * bx,
            aw * bz + ax * by - ay * bx + az * bw,
            aw * bw - ax * bx - ay * by - az * bz,
        )
    }

    /// Conjugate `(-x, -y, -z, w)`; the inverse rotation for unit quaternions.
    pub fn conjugate(&self) -> Self {
        Self::new(
            -self.component(0),
            -self.component(1),
            -self.component(2),
            self.component(3),
        )
    }

    /// Four-component dot product.
    pub fn dot(&self, other: &Self) -> f32 {
        self.component(0) * other.component(0)
            + self.component(1) * other.component(1)
            + self.component(2) * other.component(2)
            + self.component(3) * other.component(3)
    }

    /// Component-wise scale.
    pub fn scale(&self, s: f32) -> Self {
        Self::new(
            self.component(0) * s,
            self.component(1) * s,
            self.component(2) * s,
            self.component(3) * s,
        )
    }

    /// Component-wise sum.
    pub fn add(&self, other: &Self) -> Self {
        Self::new(
            self.component(0) + other.component(0),
            self.component(1) + other.component(1),
            self.component(2) + other.component(2),
            self.component(3) + other.component(3),
        )
    }

    /// Euclidean norm of the four components.
    pub fn length(&self) -> f32 {
        self.dot(self).sqrt()
    }

    /// Normalises the quaternion; returns identity when norm is ~0.
    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len <= EPSILON {
            return Self::identity();
        }
        self.scale(1.0 / len)
    }

    /// Returns `true` when every component is finite.
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|c| c.is_finite())
    }

    /// Spherical linear interpolation along the shortest arc.
    ///
    /// Inputs are expected to be unit quaternions. When the dot product is
    /// negative `other` is negated so the path never takes the long way
    /// around. Nearly parallel inputs (`dot >` [`SLERP_LINEAR_THRESHOLD`])
    /// use a normalised linear blend instead. Both branches stay on the great
    /// arc between the inputs, so the rotation axis relative to `self` is the
    /// same for every `t`.
    ///
    /// # Examples
    /// ```
    /// use core::f32::consts::FRAC_PI_2;
    /// use instancer_math::{Quat, Vec3};
    /// let a = Quat::identity();
    /// let b = Quat::from_axis_angle(Vec3::UNIT_Z, FRAC_PI_2);
    /// let mid = a.slerp(&b, 0.5);
    /// let expected = Quat::from_axis_angle(Vec3::UNIT_Z, FRAC_PI_2 * 0.5);
    /// assert!((mid.dot(&expected) - 1.0).abs() < 1e-6);
    /// ```
    pub fn slerp(&self, other: &Self, t: f32) -> Self {
        let mut cos_theta = self.dot(other);
        let mut target = *other;
        if cos_theta < 0.0 {
            target = target.scale(-1.0);
            cos_theta = -cos_theta;
        }

        if cos_theta > SLERP_LINEAR_THRESHOLD {
            return self.scale(1.0 - t).add(&target.scale(t)).normalize();
        }

        let theta = cos_theta.clamp(-1.0, 1.0).acos();
        let perp = target.add(&self.scale(-cos_theta)).normalize();
        let (sin_t, cos_t) = (theta * t).sin_cos();
        self.scale(cos_t).add(&perp.scale(sin_t))
    }

    /// Rotation angle (radians, in `[0, π]`) of `conj(self) * other`, i.e. how
    /// far `other` is rotated away from `self`.
    pub fn angle_to(&self, other: &Self) -> f32 {
        let rel = self.conjugate().multiply(other);
        let w = rel.w().abs();
        2.0 * rel.vector().length().atan2(w)
    }

    /// Decomposes a unit quaternion into `(axis, angle)`.
    ///
    /// The angle is in `[0, 2π)`. A rotation with no measurable axis returns
    /// `(UNIT_X, 0.0)`.
    pub fn to_axis_angle(&self) -> (Vec3, f32) {
        let q = self.normalize();
        let v = q.vector();
        let len = v.length();
        if len <= EPSILON {
            return (Vec3::UNIT_X, 0.0);
        }
        (v.scale(1.0 / len), 2.0 * len.atan2(q.w()))
    }

    /// Converts the quaternion to a column-major rotation matrix.
    ///
    /// The quaternion is normalised first.
    pub fn to_mat3(&self) -> Mat3 {
        let q = self.normalize();
        let x = q.component(0);
        let y = q.component(1);
        let z = q.component(2);
        let w = q.component(3);

        let xx = x * x;
        let yy = y * y;
        let zz = z * z;
        let xy = x * y;
        let xz = x * z;
        let yz = y * z;
        let wx = w * x;
        let wy = w * y;
        let wz = w * z;

        Mat3::new([
            1.0 - 2.0 * (yy + zz),
            2.0 * (xy + wz),
            2.0 * (xz - wy),
            2.0 * (xy - wz),
            1.0 - 2.0 * (xx + zz),
            2.0 * (yz + wx),
            2.0 * (xz + wy),
            2.0 * (yz - wx),
            1.0 - 2.0 * (xx + yy),
        ])
    }
}

impl Default for Quat {
    fn default() -> Self {
        Self::identity()
    }
}

/// Converts `(x, y, z, w)` verbatim; normalisation is not enforced.
impl From<[f32; 4]> for Quat {
    fn from(value: [f32; 4]) -> Self {
        Self { data: value }
    }
}
