// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use crate::{Quat, Vec3};

/// Column-major 3×3 matrix: the linear block of an affine transform.
///
/// # Examples
/// ```
/// use instancer_math::{Mat3, Vec3};
/// let s = Mat3::from_diagonal(Vec3::new(2.0, 3.0, 4.0));
/// assert_eq!(s.transform(&Vec3::ONE).to_array(), [2.0, 3.0, 4.0]);
/// ```
///
/// # Precision
/// `f32` throughout. [`Mat3::inverse`] divides by the determinant without a
/// guard: singular input produces infinities or NaN, which callers detect
/// with [`Mat3::is_finite`].
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Mat3 {
    data: [f32; 9],
}

impl Mat3 {
    /// Returns the identity matrix.
    pub const fn identity() -> Self {
        Self {
            data: [
                1.0, 0.0, 0.0, // col 0
                0.0, 1.0, 0.0, // col 1
                0.0, 0.0, 1.0, // col 2
            ],
        }
    }

    /// The all-zero matrix.
    pub const fn zero() -> Self {
        Self { data: [0.0; 9] }
    }

    /// Creates a matrix from column-major array data.
    pub const fn new(data: [f32; 9]) -> Self {
        Self { data }
    }

    /// Creates a matrix from its three columns.
    pub fn from_cols(c0: Vec3, c1: Vec3, c2: Vec3) -> Self {
        Self::new([
            c0.x(),
            c0.y(),
            c0.z(),
            c1.x(),
            c1.y(),
            c1.z(),
            c2.x(),
            c2.y(),
            c2.z(),
        ])
    }

    /// Creates a matrix from its three rows.
    pub fn from_rows(r0: Vec3, r1: Vec3, r2: Vec3) -> Self {
        Self::from_cols(r0, r1, r2).transpose()
    }

    /// Builds a diagonal (non-uniform scale) matrix.
    pub fn from_diagonal(d: Vec3) -> Self {
        Self::new([d.x(), 0.0, 0.0, 0.0, d.y(), 0.0, 0.0, 0.0, d.z()])
    }

    /// Builds a rotation matrix from a quaternion (normalised internally).
    pub fn from_quat(q: &Quat) -> Self {
        q.to_mat3()
    }

    /// Builds a rotation matrix around the X axis by `angle` radians.
    pub fn rotation_x(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self::new([
            1.0, 0.0, 0.0,
            0.0, c,   s,
            0.0, -s,  c,
        ])
    }

    /// Builds a rotation matrix around the Y axis by `angle` radians.
    pub fn rotation_y(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self::new([
            c,   0.0, -s,
            0.0, 1.0, 0.0,
            s,   0.0, c,
        ])
    }

    /// Builds a rotation matrix around the Z axis by `angle` radians.
    pub fn rotation_z(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self::new([
            c,   s,   0.0,
            -s,  c,   0.0,
            0.0, 0.0, 1.0,
        ])
    }

    /// Returns the matrix as a column-major array.
    pub fn to_array(self) -> [f32; 9] {
        self.data
    }

    /// Entry at `(row, col)`.
    pub fn at(&self, row: usize, col: usize) -> f32 {
        self.data[col * 3 + row]
    }

    /// Column `idx` as a vector.
    pub fn col(&self, idx: usize) -> Vec3 {
        Vec3::new(
            self.data[idx * 3],
            self.data[idx * 3 + 1],
            self.data[idx * 3 + 2],
        )
    }

    /// Row `idx` as a vector.
    pub fn row(&self, idx: usize) -> Vec3 {
        Vec3::new(self.at(idx, 0), self.at(idx, 1), self.at(idx, 2))
    }

    /// Transposed copy.
    pub fn transpose(&self) -> Self {
        let mut out = [0.0; 9];
        for row in 0..3 {
            for col in 0..3 {
                out[row * 3 + col] = self.at(row, col);
            }
        }
        Self::new(out)
    }

    /// Multiplies the matrix with another matrix (`self * rhs`).
    pub fn multiply(&self, rhs: &Self) -> Self {
        let mut out = [0.0; 9];
        for row in 0..3 {
            for col in 0..3 {
                let mut sum = 0.0;
                for k in 0..3 {
                    sum += self.at(row, k) * rhs.at(k, col);
                }
                out[col * 3 + row] = sum;
            }
        }
        Self::new(out)
    }

    /// Applies the matrix to a vector.
    pub fn transform(&self, v: &Vec3) -> Vec3 {
        let x = v.x();
        let y = v.y();
        let z = v.z();
        Vec3::new(
            self.at(0, 0) * x + self.at(0, 1) * y + self.at(0, 2) * z,
            self.at(1, 0) * x + self.at(1, 1) * y + self.at(1, 2) * z,
            self.at(2, 0) * x + self.at(2, 1) * y + self.at(2, 2) * z,
        )
    }

    /// Determinant (triple product of the columns).
    pub fn determinant(&self) -> f32 {
        self.col(0).dot(&self.col(1).cross(&self.col(2)))
    }

    /// Inverse via the adjugate divided by the determinant.
    ///
    /// No singularity guard: a zero determinant yields non-finite entries.
    pub fn inverse(&self) -> Self {
        let c0 = self.col(0);
        let c1 = self.col(1);
        let c2 = self.col(2);
        let r0 = c1.cross(&c2);
        let r1 = c2.cross(&c0);
        let r2 = c0.cross(&c1);
        let inv_det = 1.0 / c0.dot(&r0);
        Self::from_rows(r0.scale(inv_det), r1.scale(inv_det), r2.scale(inv_det))
    }

    /// Entry-wise `(1 - t) * self + t * other`.
    pub fn lerp(&self, other: &Self, t: f32) -> Self {
        let s = 1.0 - t;
        let mut out = [0.0; 9];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = s * self.data[i] + t * other.data[i];
        }
        Self::new(out)
    }

    /// Entry-wise absolute value.
    pub fn abs(&self) -> Self {
        Self::new(self.data.map(f32::abs))
    }

    /// Largest absolute row sum (the induced ∞-norm).
    pub fn norm_inf(&self) -> f32 {
        (0..3)
            .map(|row| self.row(row).abs().dot(&Vec3::ONE))
            .fold(0.0, f32::max)
    }

    /// Returns `true` when every entry is finite.
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|c| c.is_finite())
    }
}

impl Default for Mat3 {
    fn default() -> Self {
        Self::identity()
    }
}

impl From<[f32; 9]> for Mat3 {
    fn from(value: [f32; 9]) -> Self {
        Self { data: value }
    }
}

impl core::ops::Mul for Mat3 {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self::Output {
        self.multiply(&rhs)
    }
}
