// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use once_cell::sync::Lazy;

const SUBDIVISIONS: usize = 16;
const TABLE_SIZE: usize = SUBDIVISIONS + 1;

/// Cubic Bernstein basis.
#[derive(Debug, Copy, Clone)]
pub struct BezierBasis;

impl BezierBasis {
    /// Basis weights `(B0, B1, B2, B3)` at `u`.
    pub fn eval(u: f32) -> [f32; 4] {
        let t1 = u;
        let t0 = 1.0 - t1;
        [
            t0 * t0 * t0,
            3.0 * t1 * (t0 * t0),
            3.0 * (t1 * t1) * t0,
            t1 * t1 * t1,
        ]
    }

    /// First derivative of the weights with respect to `u`.
    pub fn derivative(u: f32) -> [f32; 4] {
        let t1 = u;
        let t0 = 1.0 - t1;
        [
            3.0 * -(t0 * t0),
            3.0 * (t0 * t0 - 2.0 * t0 * t1),
            3.0 * (2.0 * t0 * t1 - t1 * t1),
            3.0 * (t1 * t1),
        ]
    }

    /// Second derivative of the weights with respect to `u`.
    pub fn derivative2(u: f32) -> [f32; 4] {
        let t1 = u;
        let t0 = 1.0 - t1;
        [
            6.0 * t0,
            6.0 * (t1 - 2.0 * t0),
            6.0 * (t0 - 2.0 * t1),
            6.0 * t1,
        ]
    }
}

/// Basis weights sampled at `u = (j + shift) / i` for `i in 1..=N`,
/// `j in 0..=N`; row `i` holds an `i`-way subdivision.
#[derive(Debug, Clone, PartialEq)]
pub struct PrecomputedBezierBasis {
    /// `c[b][i][j]`: weight `b` of the curve at the sample.
    pub c: [[[f32; TABLE_SIZE]; TABLE_SIZE]; 4],
    /// `d[b][i][j]`: weight `b` of the first derivative at the sample.
    pub d: [[[f32; TABLE_SIZE]; TABLE_SIZE]; 4],
}

impl PrecomputedBezierBasis {
    /// Largest subdivision count.
    pub const N: usize = SUBDIVISIONS;

    /// Tables for a given sample `shift`. Row 0 is left zeroed.
    #[allow(clippy::cast_precision_loss)]
    pub fn new(shift: usize) -> Self {
        let mut c = [[[0.0; TABLE_SIZE]; TABLE_SIZE]; 4];
        let mut d = [[[0.0; TABLE_SIZE]; TABLE_SIZE]; 4];
        for i in 1..=Self::N {
            for j in 0..=Self::N {
                let u = (j + shift) as f32 / i as f32;
                let samples = BezierBasis::eval(u).into_iter().zip(BezierBasis::derivative(u));
                for (b, (w, dw)) in samples.enumerate() {
                    c[b][i][j] = w;
                    d[b][i][j] = dw;
                }
            }
        }
        Self { c, d }
    }

    /// Curve weights at sample `ofs` of a `size`-way subdivision.
    pub fn weights(&self, ofs: usize, size: usize) -> [f32; 4] {
        debug_assert!(size <= Self::N && ofs <= Self::N, "sample ({ofs}/{size}) out of table");
        [
            self.c[0][size][ofs],
            self.c[1][size][ofs],
            self.c[2][size][ofs],
            self.c[3][size][ofs],
        ]
    }

    /// Derivative weights at sample `ofs` of a `size`-way subdivision.
    pub fn derivative_weights(&self, ofs: usize, size: usize) -> [f32; 4] {
        debug_assert!(size <= Self::N && ofs <= Self::N, "sample ({ofs}/{size}) out of table");
        [
            self.d[0][size][ofs],
            self.d[1][size][ofs],
            self.d[2][size][ofs],
            self.d[3][size][ofs],
        ]
    }
}

/// Tables sampled at `j / i`.
pub static BEZIER_BASIS0: Lazy<PrecomputedBezierBasis> = Lazy::new(|| PrecomputedBezierBasis::new(0));

/// Tables sampled at `(j + 1) / i`.
pub static BEZIER_BASIS1: Lazy<PrecomputedBezierBasis> = Lazy::new(|| PrecomputedBezierBasis::new(1));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_partition_unity() {
        for step in 0..=10u8 {
            let u = f32::from(step) / 10.0;
            let sum: f32 = BezierBasis::eval(u).iter().sum();
            assert!((sum - 1.0).abs() < 1e-6);
            let dsum: f32 = BezierBasis::derivative(u).iter().sum();
            assert!(dsum.abs() < 1e-5);
            let d2sum: f32 = BezierBasis::derivative2(u).iter().sum();
            assert!(d2sum.abs() < 1e-5);
        }
    }

    #[test]
    fn tables_match_direct_evaluation() {
        let table = &*BEZIER_BASIS0;
        assert_eq!(table.weights(3, 8), BezierBasis::eval(3.0 / 8.0));
        assert_eq!(table.derivative_weights(5, 16), BezierBasis::derivative(5.0 / 16.0));
        let shifted = &*BEZIER_BASIS1;
        assert_eq!(shifted.weights(0, 4), BezierBasis::eval(0.25));
    }
}
