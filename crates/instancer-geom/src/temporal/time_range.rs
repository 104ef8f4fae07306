// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use crate::error::GeometryError;

/// Closed time interval `[lower, upper]`.
///
/// Geometry motion is sampled at `segments + 1` evenly spaced timesteps over
/// its time range. The helpers here map continuous times onto those samples;
/// they are shared by the scalar and batched transform paths so both see the
/// same segment and fraction for a given time.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeRange {
    /// Start of the range.
    pub lower: f32,
    /// End of the range.
    pub upper: f32,
}

impl TimeRange {
    /// The unit range `[0, 1]`.
    pub const UNIT: Self = Self {
        lower: 0.0,
        upper: 1.0,
    };

    /// Creates a range; `lower <= upper` is a caller contract.
    pub fn new(lower: f32, upper: f32) -> Self {
        debug_assert!(lower <= upper, "time range lower ({lower}) > upper ({upper})");
        Self { lower, upper }
    }

    /// Creates a range after checking it is finite and ordered.
    pub fn try_new(lower: f32, upper: f32) -> Result<Self, GeometryError> {
        if lower.is_finite() && upper.is_finite() && lower <= upper {
            Ok(Self { lower, upper })
        } else {
            Err(GeometryError::InvalidTimeRange { lower, upper })
        }
    }

    /// The empty range (`+inf`, `-inf`), identity for [`Self::union`].
    pub const fn empty() -> Self {
        Self {
            lower: f32::INFINITY,
            upper: f32::NEG_INFINITY,
        }
    }

    /// `upper - lower`.
    pub fn size(&self) -> f32 {
        self.upper - self.lower
    }

    /// Inclusive containment test.
    pub fn contains(&self, t: f32) -> bool {
        self.lower <= t && t <= self.upper
    }

    /// Smallest range containing both.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            lower: self.lower.min(other.lower),
            upper: self.upper.max(other.upper),
        }
    }

    /// Overlap of both ranges (may be empty).
    pub fn intersect(&self, other: &Self) -> Self {
        Self {
            lower: self.lower.max(other.lower),
            upper: self.upper.min(other.upper),
        }
    }

    /// Parameter of `t` within this range (`0` at `lower`, `1` at `upper`);
    /// a zero-length range maps everything to `0`.
    pub fn normalize(&self, t: f32) -> f32 {
        let size = self.size();
        if size > 0.0 {
            (t - self.lower) / size
        } else {
            0.0
        }
    }

    /// Time of timestep `itime` when the range is split into `segments`
    /// equal segments.
    #[allow(clippy::cast_precision_loss)]
    pub fn time_of_step(&self, itime: usize, segments: usize) -> f32 {
        if segments == 0 {
            return self.lower;
        }
        let u = itime as f32 / segments as f32;
        instancer_math::lerp(self.lower, self.upper, u)
    }

    /// Segment index and fraction for time `t`.
    ///
    /// `scaled = (t - lower) / size · segments`; the index is
    /// `floor(scaled)` clamped to `[0, segments - 1]` and the fraction
    /// `scaled - index` clamped to `[0, 1]`, so times outside the range pin to
    /// its ends. With zero segments every time maps to `(0, 0.0)`.
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn segment(&self, t: f32, segments: usize) -> (usize, f32) {
        if segments == 0 {
            return (0, 0.0);
        }
        let nsegs = segments as f32;
        let scaled = self.normalize(t) * nsegs;
        let floor = scaled.floor();
        let itime = if floor >= nsegs - 1.0 {
            segments - 1
        } else if floor > 0.0 {
            floor as usize
        } else {
            0
        };
        // A NaN time keeps a NaN fraction, which propagates into the transform.
        (itime, (scaled - itime as f32).clamp(0.0, 1.0))
    }

    /// Inclusive range of timestep indices whose samples influence motion
    /// over `range`.
    ///
    /// Ends are nudged by two ulps toward the inside so a range starting or
    /// ending exactly on a timestep does not pull in its neighbour through
    /// rounding.
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn segment_range(&self, range: &Self, segments: usize) -> (usize, usize) {
        if segments == 0 {
            return (0, 0);
        }
        let nsegs = segments as f32;
        let lower = self.normalize(range.lower).max(0.0);
        let upper = self.normalize(range.upper).min(1.0);
        let round_up = 1.0 + 2.0 * f32::EPSILON;
        let round_down = 1.0 - 2.0 * f32::EPSILON;
        let ilower = (lower * round_up * nsegs).floor().clamp(0.0, nsegs);
        let iupper = (upper * round_down * nsegs).ceil().clamp(0.0, nsegs);
        let ilower = ilower as usize;
        (ilower, (iupper as usize).max(ilower))
    }
}

impl Default for TimeRange {
    fn default() -> Self {
        Self::UNIT
    }
}
