// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use instancer_math::{AffineTransform, Mat3, Quat, Vec3};

/// Transform split into a residual linear part, a rotation and two
/// translations, so rotations can be interpolated on the sphere.
///
/// Conventions:
/// - The effective map is `x' = translation + R · (scale_skew · x + shift)`,
///   i.e. `Translate(translation) ∘ Rotate(rotation) ∘ (scale_skew, shift)`.
/// - `scale_skew` is upper-triangular when built through the packed form or
///   the builder helpers; any 3×3 block is accepted.
/// - `rotation` need not be normalised on input; instances normalise it when
///   committing.
///
/// # Examples
/// ```
/// use core::f32::consts::FRAC_PI_2;
/// use instancer_geom::QuaternionDecomposition;
/// use instancer_math::{Quat, Vec3};
/// let qd = QuaternionDecomposition::identity()
///     .with_scale(Vec3::new(2.0, 2.0, 2.0))
///     .with_rotation(Quat::from_axis_angle(Vec3::UNIT_Z, FRAC_PI_2))
///     .with_translation(Vec3::new(0.0, 0.0, 5.0));
/// let p = qd.to_affine().transform_point(&Vec3::UNIT_X);
/// assert!((p.y() - 2.0).abs() < 1e-6 && (p.z() - 5.0).abs() < 1e-6);
/// ```
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QuaternionDecomposition {
    /// Residual linear part (scale and skew), applied first.
    pub scale_skew: Mat3,
    /// Translation applied before the rotation.
    pub shift: Vec3,
    /// Rotation quaternion.
    pub rotation: Quat,
    /// Translation applied after the rotation.
    pub translation: Vec3,
}

impl QuaternionDecomposition {
    /// Unit scale, no skew, no shift, identity rotation, no translation.
    pub const fn identity() -> Self {
        Self {
            scale_skew: Mat3::identity(),
            shift: Vec3::ZERO,
            rotation: Quat::identity(),
            translation: Vec3::ZERO,
        }
    }

    /// Creates a decomposition from all four parts.
    pub const fn from_parts(
        scale_skew: Mat3,
        shift: Vec3,
        rotation: Quat,
        translation: Vec3,
    ) -> Self {
        Self {
            scale_skew,
            shift,
            rotation,
            translation,
        }
    }

    /// Identity-rotation equivalent of a plain transform.
    pub fn from_affine(xfm: &AffineTransform) -> Self {
        Self::from_parts(xfm.linear, Vec3::ZERO, Quat::identity(), xfm.translation)
    }

    /// Replaces the diagonal of `scale_skew`.
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        let mut m = self.scale_skew.to_array();
        m[0] = scale.x();
        m[4] = scale.y();
        m[8] = scale.z();
        self.scale_skew = Mat3::new(m);
        self
    }

    /// Replaces the upper off-diagonal entries of `scale_skew`.
    pub fn with_skew(mut self, xy: f32, xz: f32, yz: f32) -> Self {
        let mut m = self.scale_skew.to_array();
        m[3] = xy;
        m[6] = xz;
        m[7] = yz;
        self.scale_skew = Mat3::new(m);
        self
    }

    /// Replaces the pre-rotation shift.
    pub fn with_shift(mut self, shift: Vec3) -> Self {
        self.shift = shift;
        self
    }

    /// Replaces the rotation.
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Replaces the post-rotation translation.
    pub fn with_translation(mut self, translation: Vec3) -> Self {
        self.translation = translation;
        self
    }

    /// Reads the packed 16-float record (four columns of four).
    ///
    /// ```text
    /// col0 = (scale_x, translation_x, translation_y, quaternion_r)
    /// col1 = (skew_xy, scale_y,       translation_z, quaternion_i)
    /// col2 = (skew_xz, skew_yz,       scale_z,       quaternion_j)
    /// col3 = (shift_x, shift_y,       shift_z,       quaternion_k)
    /// ```
    pub fn from_packed(cols: &[[f32; 4]; 4]) -> Self {
        let [c0, c1, c2, c3] = *cols;
        Self {
            scale_skew: Mat3::new([c0[0], 0.0, 0.0, c1[0], c1[1], 0.0, c2[0], c2[1], c2[2]]),
            shift: Vec3::new(c3[0], c3[1], c3[2]),
            rotation: Quat::new(c1[3], c2[3], c3[3], c0[3]),
            translation: Vec3::new(c0[1], c0[2], c1[2]),
        }
    }

    /// Writes the packed 16-float record; see [`Self::from_packed`].
    ///
    /// The lower-triangular entries of `scale_skew` have no slot and are
    /// dropped.
    pub fn to_packed(&self) -> [[f32; 4]; 4] {
        let s = &self.scale_skew;
        let [qi, qj, qk, qr] = self.rotation.to_array();
        let [tx, ty, tz] = self.translation.to_array();
        let [sx, sy, sz] = self.shift.to_array();
        [
            [s.at(0, 0), tx, ty, qr],
            [s.at(0, 1), s.at(1, 1), tz, qi],
            [s.at(0, 2), s.at(1, 2), s.at(2, 2), qj],
            [sx, sy, sz, qk],
        ]
    }

    /// Copy with a unit-length rotation.
    pub fn normalized(&self) -> Self {
        Self {
            rotation: self.rotation.normalize(),
            ..*self
        }
    }

    /// Recomposes the plain affine transform.
    pub fn to_affine(&self) -> AffineTransform {
        let r = self.rotation.to_mat3();
        AffineTransform::new(
            r.multiply(&self.scale_skew),
            r.transform(&self.shift).add(&self.translation),
        )
    }

    /// Rotation-aware blend: linear in `scale_skew`, `shift` and
    /// `translation`, shortest-arc slerp in `rotation`.
    pub fn interpolate(&self, other: &Self, f: f32) -> Self {
        Self {
            scale_skew: self.scale_skew.lerp(&other.scale_skew, f),
            shift: self.shift.lerp(&other.shift, f),
            rotation: self.rotation.slerp(&other.rotation, f),
            translation: self.translation.lerp(&other.translation, f),
        }
    }
}

impl Default for QuaternionDecomposition {
    fn default() -> Self {
        Self::identity()
    }
}

/// One timestep of an instance's transform, tagged with the encoding it was
/// written in.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransformRecord {
    /// Plain affine transform.
    Plain(AffineTransform),
    /// Quaternion-decomposed transform.
    Decomposed(QuaternionDecomposition),
}

impl TransformRecord {
    /// Returns `true` for [`TransformRecord::Decomposed`].
    pub fn is_decomposed(&self) -> bool {
        matches!(self, Self::Decomposed(_))
    }

    /// The effective affine transform of this record.
    pub fn to_affine(&self) -> AffineTransform {
        match self {
            Self::Plain(xfm) => *xfm,
            Self::Decomposed(qd) => qd.to_affine(),
        }
    }

    /// The record as a decomposition; plain records map to their
    /// identity-rotation equivalent.
    pub fn to_decomposition(&self) -> QuaternionDecomposition {
        match self {
            Self::Plain(xfm) => QuaternionDecomposition::from_affine(xfm),
            Self::Decomposed(qd) => *qd,
        }
    }
}

impl Default for TransformRecord {
    fn default() -> Self {
        Self::Plain(AffineTransform::identity())
    }
}

/// How an instance blends transforms between timesteps.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Interpolation {
    /// Entry-wise lerp of the affine transforms.
    #[default]
    Linear,
    /// Slerp of the rotation, lerp of everything else.
    Spherical,
}
