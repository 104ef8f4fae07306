// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use crate::{Mat3, Vec3};

/// Affine map `x' = linear · x + translation`.
///
/// The 3×3 block carries rotation, scale and skew; translation is stored
/// separately so the map never needs a homogeneous row.
///
/// # Examples
/// ```
/// use instancer_math::{AffineTransform, Vec3};
/// let t = AffineTransform::from_translation(Vec3::new(5.0, -3.0, 2.0));
/// let p = Vec3::new(2.0, 4.0, -1.0);
/// assert_eq!(t.transform_point(&p).to_array(), [7.0, 1.0, 1.0]);
/// ```
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AffineTransform {
    /// Linear block (rotation, scale, skew).
    pub linear: Mat3,
    /// Translation applied after the linear block.
    pub translation: Vec3,
}

impl AffineTransform {
    /// The identity map.
    pub const fn identity() -> Self {
        Self {
            linear: Mat3::identity(),
            translation: Vec3::ZERO,
        }
    }

    /// Creates a transform from its linear block and translation.
    pub const fn new(linear: Mat3, translation: Vec3) -> Self {
        Self {
            linear,
            translation,
        }
    }

    /// Pure translation.
    pub const fn from_translation(translation: Vec3) -> Self {
        Self::new(Mat3::identity(), translation)
    }

    /// Pure linear map (no translation).
    pub const fn from_linear(linear: Mat3) -> Self {
        Self::new(linear, Vec3::ZERO)
    }

    /// Composition `self ∘ rhs`: applies `rhs` first, then `self`.
    pub fn compose(&self, rhs: &Self) -> Self {
        Self::new(
            self.linear.multiply(&rhs.linear),
            self.linear.transform(&rhs.translation).add(&self.translation),
        )
    }

    /// Exact inverse: inverted linear block, translation `-(L⁻¹ · t)`.
    ///
    /// A singular linear block yields non-finite values rather than an error.
    pub fn inverse(&self) -> Self {
        let inv = self.linear.inverse();
        Self::new(inv, inv.transform(&self.translation).scale(-1.0))
    }

    /// Transforms a point (translation applied).
    pub fn transform_point(&self, point: &Vec3) -> Vec3 {
        self.linear.transform(point).add(&self.translation)
    }

    /// Transforms a direction (translation ignored).
    pub fn transform_direction(&self, direction: &Vec3) -> Vec3 {
        self.linear.transform(direction)
    }

    /// Entry-wise linear interpolation of both the linear block and the
    /// translation.
    pub fn lerp(&self, other: &Self, t: f32) -> Self {
        Self::new(
            self.linear.lerp(&other.linear, t),
            self.translation.lerp(&other.translation, t),
        )
    }

    /// Determinant of the linear block.
    pub fn determinant(&self) -> f32 {
        self.linear.determinant()
    }

    /// Returns `true` when every entry is finite.
    pub fn is_finite(&self) -> bool {
        self.linear.is_finite() && self.translation.is_finite()
    }

    /// Largest absolute difference between corresponding entries.
    pub fn max_abs_diff(&self, other: &Self) -> f32 {
        let a = self.linear.to_array();
        let b = other.linear.to_array();
        let lin = a
            .iter()
            .zip(b.iter())
            .map(|(x, y)| (x - y).abs())
            .fold(0.0, f32::max);
        let tr = self.translation.sub(&other.translation).abs().max_element();
        lin.max(tr)
    }
}

impl Default for AffineTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl core::ops::Mul for AffineTransform {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self::Output {
        self.compose(&rhs)
    }
}
