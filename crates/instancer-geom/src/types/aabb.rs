// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use instancer_math::{AffineTransform, Vec3};

/// Magnitude beyond which a bound coordinate is treated as invalid.
pub const FLT_LARGE: f32 = 1.844e18;

/// Axis-aligned bounding box.
///
/// Unlike a collision proxy this box is allowed to be empty (`min > max`) or
/// non-finite; use [`Aabb::is_valid`] before handing it to a builder.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Aabb {
    min: Vec3,
    max: Vec3,
}

impl Aabb {
    /// Constructs an AABB from its minimum and maximum corners.
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// The empty box: `+inf` lower corner and `-inf` upper corner, the
    /// identity for [`Aabb::union`].
    pub const fn empty() -> Self {
        Self {
            min: Vec3::splat(f32::INFINITY),
            max: Vec3::splat(f32::NEG_INFINITY),
        }
    }

    /// Returns the minimum corner.
    pub fn min(&self) -> Vec3 {
        self.min
    }

    /// Returns the maximum corner.
    pub fn max(&self) -> Vec3 {
        self.max
    }

    /// Builds an AABB centered at `center` with half-extents `hx, hy, hz`.
    pub fn from_center_half_extents(center: Vec3, hx: f32, hy: f32, hz: f32) -> Self {
        let he = Vec3::new(hx, hy, hz);
        Self::new(center.sub(&he), center.add(&he))
    }

    /// Builds the minimal AABB that contains all `points`; empty input yields
    /// [`Aabb::empty`].
    pub fn from_points(points: &[Vec3]) -> Self {
        points
            .iter()
            .fold(Self::empty(), |acc, p| acc.extend_point(p))
    }

    /// Returns the union of two AABBs.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.min(&other.min),
            max: self.max.max(&other.max),
        }
    }

    /// Grows the box to contain `p`.
    pub fn extend_point(&self, p: &Vec3) -> Self {
        Self {
            min: self.min.min(p),
            max: self.max.max(p),
        }
    }

    /// Inflates the box by a uniform margin `m` in all directions.
    pub fn inflate(&self, m: f32) -> Self {
        self.enlarge(&Vec3::splat(m))
    }

    /// Inflates the box by a per-axis margin.
    pub fn enlarge(&self, margin: &Vec3) -> Self {
        Self {
            min: self.min.sub(margin),
            max: self.max.add(margin),
        }
    }

    /// Extent per axis (`max - min`).
    pub fn size(&self) -> Vec3 {
        self.max.sub(&self.min)
    }

    /// `min + max`: twice the center, as consumed by centroid binning.
    pub fn center2(&self) -> Vec3 {
        self.min.add(&self.max)
    }

    /// Corner-wise linear interpolation.
    pub fn lerp(&self, other: &Self, t: f32) -> Self {
        Self {
            min: self.min.lerp(&other.min, t),
            max: self.max.lerp(&other.max, t),
        }
    }

    /// Computes the AABB that bounds this box after the affine map `xfm`.
    ///
    /// Uses the center/half-extent form: `c' = L·c + t`, `e' = |L|·e`, which
    /// equals the box of the eight transformed corners. Non-finite input or
    /// transform values propagate instead of being dropped by `min`/`max`.
    pub fn transformed(&self, xfm: &AffineTransform) -> Self {
        let center = self.center2().scale(0.5);
        let half = self.size().scale(0.5);
        let c = xfm.transform_point(&center);
        let e = xfm.linear.abs().transform(&half);
        Self {
            min: c.sub(&e),
            max: c.add(&e),
        }
    }

    /// Returns `true` when every coordinate lies strictly inside
    /// `±`[`FLT_LARGE`] and `min <= max` on every axis. NaN fails.
    pub fn is_valid(&self) -> bool {
        (0..3).all(|i| {
            let lo = self.min.component(i);
            let hi = self.max.component(i);
            lo > -FLT_LARGE && hi < FLT_LARGE && lo <= hi
        })
    }

    /// Returns `true` if `other` lies inside this box, allowing each face to
    /// be off by `tolerance`.
    pub fn contains(&self, other: &Self, tolerance: f32) -> bool {
        (0..3).all(|i| {
            self.min.component(i) <= other.min.component(i) + tolerance
                && self.max.component(i) >= other.max.component(i) - tolerance
        })
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use instancer_math::Mat3;

    #[test]
    fn transformed_matches_corner_hull() {
        let b = Aabb::new(Vec3::new(-1.0, 0.0, 2.0), Vec3::new(3.0, 1.0, 4.0));
        let xfm = AffineTransform::new(
            Mat3::rotation_z(0.7).multiply(&Mat3::from_diagonal(Vec3::new(2.0, 1.0, 0.5))),
            Vec3::new(5.0, -2.0, 1.0),
        );
        let mut corners = Vec::new();
        for i in 0..8u8 {
            let pick = |bit: u8, lo: f32, hi: f32| if i & bit == 0 { lo } else { hi };
            let p = Vec3::new(pick(1, -1.0, 3.0), pick(2, 0.0, 1.0), pick(4, 2.0, 4.0));
            corners.push(xfm.transform_point(&p));
        }
        let expected = Aabb::from_points(&corners);
        let got = b.transformed(&xfm);
        for i in 0..3 {
            assert!((got.min().component(i) - expected.min().component(i)).abs() < 1e-5);
            assert!((got.max().component(i) - expected.max().component(i)).abs() < 1e-5);
        }
    }

    #[test]
    fn validity_rejects_nan_and_inverted() {
        assert!(Aabb::from_center_half_extents(Vec3::ZERO, 1.0, 1.0, 1.0).is_valid());
        assert!(!Aabb::empty().is_valid());
        assert!(!Aabb::new(Vec3::splat(f32::NAN), Vec3::ONE).is_valid());
        assert!(!Aabb::new(Vec3::ZERO, Vec3::splat(2.0e18)).is_valid());
    }

    #[test]
    fn nan_transform_propagates() {
        let b = Aabb::from_center_half_extents(Vec3::ZERO, 1.0, 1.0, 1.0);
        let xfm = AffineTransform::from_linear(Mat3::from_diagonal(Vec3::new(f32::NAN, 1.0, 1.0)));
        assert!(!b.transformed(&xfm).is_valid());
    }
}
