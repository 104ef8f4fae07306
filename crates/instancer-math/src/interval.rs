// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Closed-interval arithmetic for conservative enclosures.
//!
//! Every operation returns an interval containing all results of the scalar
//! operation over its operands. Rounding is not directed; callers that need a
//! strict guarantee pad the final result (see [`Interval::widen`]).

use crate::{Mat3, Vec3};

/// A closed interval `[lo, hi]`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Interval {
    /// Lower bound.
    pub lo: f32,
    /// Upper bound.
    pub hi: f32,
}

impl Interval {
    /// The degenerate interval `[0, 0]`.
    pub const ZERO: Self = Self { lo: 0.0, hi: 0.0 };

    /// Creates an interval; `lo` must not exceed `hi`.
    pub fn new(lo: f32, hi: f32) -> Self {
        debug_assert!(!(lo > hi), "interval lo ({lo}) > hi ({hi})");
        Self { lo, hi }
    }

    /// The point interval `[v, v]`.
    pub const fn point(v: f32) -> Self {
        Self { lo: v, hi: v }
    }

    /// Smallest interval containing both values, in either order.
    pub fn hull(a: f32, b: f32) -> Self {
        Self {
            lo: a.min(b),
            hi: a.max(b),
        }
    }

    /// Smallest interval containing both intervals.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            lo: self.lo.min(other.lo),
            hi: self.hi.max(other.hi),
        }
    }

    /// Interval sum.
    pub fn add(&self, other: &Self) -> Self {
        Self {
            lo: self.lo + other.lo,
            hi: self.hi + other.hi,
        }
    }

    /// Interval product (extremes of the four endpoint products).
    pub fn mul(&self, other: &Self) -> Self {
        let a = self.lo * other.lo;
        let b = self.lo * other.hi;
        let c = self.hi * other.lo;
        let d = self.hi * other.hi;
        Self {
            lo: a.min(b).min(c).min(d),
            hi: a.max(b).max(c).max(d),
        }
    }

    /// Product with a scalar.
    pub fn scale(&self, s: f32) -> Self {
        Self::hull(self.lo * s, self.hi * s)
    }

    /// Grows the interval outward by `margin` on both sides.
    pub fn widen(&self, margin: f32) -> Self {
        Self {
            lo: self.lo - margin,
            hi: self.hi + margin,
        }
    }

    /// Width `hi - lo`.
    pub fn width(&self) -> f32 {
        self.hi - self.lo
    }

    /// Inclusive containment test.
    pub fn contains(&self, v: f32) -> bool {
        self.lo <= v && v <= self.hi
    }
}

/// Three independent intervals, one per axis.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct IntervalVec3 {
    /// Per-axis intervals.
    pub axes: [Interval; 3],
}

impl IntervalVec3 {
    /// Box `[lo, hi]` as per-axis intervals.
    pub fn from_bounds(lo: Vec3, hi: Vec3) -> Self {
        Self {
            axes: [
                Interval::new(lo.x(), hi.x()),
                Interval::new(lo.y(), hi.y()),
                Interval::new(lo.z(), hi.z()),
            ],
        }
    }

    /// Hull of two points.
    pub fn hull(a: Vec3, b: Vec3) -> Self {
        Self {
            axes: [
                Interval::hull(a.x(), b.x()),
                Interval::hull(a.y(), b.y()),
                Interval::hull(a.z(), b.z()),
            ],
        }
    }

    /// Per-axis sum.
    pub fn add(&self, other: &Self) -> Self {
        Self {
            axes: [
                self.axes[0].add(&other.axes[0]),
                self.axes[1].add(&other.axes[1]),
                self.axes[2].add(&other.axes[2]),
            ],
        }
    }

    /// Exact image of the box under a point matrix.
    ///
    /// For each output row the extremes are reached at box corners, so the
    /// row-wise sum of `m_ij * [lo_j, hi_j]` is tight.
    pub fn transform(&self, m: &Mat3) -> Self {
        let row = |r: usize| {
            let mut acc = Interval::ZERO;
            for c in 0..3 {
                acc = acc.add(&self.axes[c].scale(m.at(r, c)));
            }
            acc
        };
        Self {
            axes: [row(0), row(1), row(2)],
        }
    }

    /// Image of the box under a matrix whose entries are themselves
    /// intervals (row-major `m[row][col]`).
    pub fn transform_interval(&self, m: &[[Interval; 3]; 3]) -> Self {
        let row = |r: usize| {
            let mut acc = Interval::ZERO;
            for c in 0..3 {
                acc = acc.add(&m[r][c].mul(&self.axes[c]));
            }
            acc
        };
        Self {
            axes: [row(0), row(1), row(2)],
        }
    }

    /// Lower corner.
    pub fn lo(&self) -> Vec3 {
        Vec3::new(self.axes[0].lo, self.axes[1].lo, self.axes[2].lo)
    }

    /// Upper corner.
    pub fn hi(&self) -> Vec3 {
        Vec3::new(self.axes[0].hi, self.axes[1].hi, self.axes[2].hi)
    }
}
