// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Bounds of the transformed object: at timesteps, at instants, over
//! segments and conservatively over arbitrary time ranges.
//!
//! Interval bounds start from the boxes at the range ends and grow a linear
//! envelope until it contains
//! - the box at every timestep strictly inside the range (knots), and
//! - an interval-arithmetic enclosure of the swept box over every piece
//!   between knots, bisected until the enclosure is tight relative to the
//!   boxes at its ends.
//!
//! Each enclosure contains the true box for every time in its piece, so the
//! envelope is conservative regardless of how deep bisection goes. Linear
//! motion of a constant box is convex per axis between knots and needs no
//! enclosure at all.

use core::f32::consts::{FRAC_PI_2, PI};
use core::ops::RangeInclusive;

use instancer_math::{Interval, IntervalVec3, Mat3, Vec3};
use tracing::trace;

use super::track::{RotationArc, SegmentKeys};
use super::Instance;
use crate::temporal::time_range::TimeRange;
use crate::types::aabb::Aabb;
use crate::types::linear_bounds::LinearBounds;
use crate::types::transform::Interpolation;

/// Relative margin added to interval bounds to absorb float rounding.
const ROUNDING_MARGIN: f32 = 1e-5;

/// Slack added to the swept-angle interval before taking sin/cos.
const ANGLE_SLACK: f32 = 1e-6;

type IntervalMat3 = [[Interval; 3]; 3];

impl Instance {
    /// Object bounds at timestep `itime` under the transform at `itime`.
    pub fn bounds_at(&self, itime: usize) -> Aabb {
        self.object_bounds(itime)
            .transformed(&self.transform_at_timestep(itime))
    }

    /// Box at time `t`: the object bounds lerped between the bracketing
    /// timesteps, under [`Instance::transform_at`].
    pub fn bounds_at_time(&self, t: f32) -> Aabb {
        self.debug_assert_readable();
        let (itime, f) = self.time_segment(t);
        self.bounds_in_segment(itime, f)
    }

    /// `{bounds_at(itime), bounds_at(itime + 1)}`: exact for linear motion
    /// of a constant box over segment `itime`.
    pub fn segment_bounds(&self, itime: usize) -> LinearBounds {
        debug_assert!(
            itime < self.num_time_segments().max(1),
            "segment {itime} out of range"
        );
        let next = (itime + 1).min(self.num_time_segments());
        LinearBounds::new(self.bounds_at(itime), self.bounds_at(next))
    }

    /// Inclusive timestep indices that influence motion over `range`.
    pub fn time_segment_range(&self, range: &TimeRange) -> (usize, usize) {
        self.time_range
            .segment_range(range, self.num_time_segments())
    }

    /// Returns `true` when every timestep in `itimes` has a valid box and an
    /// invertible, finite linear part.
    pub fn is_valid(&self, itimes: RangeInclusive<usize>) -> bool {
        debug_assert!(
            *itimes.end() < self.num_time_steps(),
            "timestep range {itimes:?} out of range"
        );
        itimes.into_iter().all(|i| self.timestep_is_valid(i))
    }

    /// Validity of a single timestep; see [`Instance::is_valid`].
    pub fn timestep_is_valid(&self, itime: usize) -> bool {
        let det = self.transform_at_timestep(itime).determinant();
        det.is_finite() && det.abs() > 0.0 && self.bounds_at(itime).is_valid()
    }

    /// Linear envelope over `range` that contains [`Instance::bounds_at_time`]
    /// at every `t` in the range: `bounds.interpolate(range.normalize(t))`
    /// encloses the box at `t`.
    pub fn interval_bounds(&self, range: &TimeRange) -> LinearBounds {
        self.debug_assert_readable();
        let b0 = self.bounds_at_time(range.lower);
        let b1 = self.bounds_at_time(range.upper);
        if range.size() <= 0.0 {
            let mut env = Envelope::new(LinearBounds::constant(b0), *range);
            env.push(range.lower, range.upper, &b1);
            return env.finish();
        }

        let mut env = Envelope::new(LinearBounds::new(b0, b1), *range);
        let knots = self.knots(range);
        for &k in knots.iter().take(knots.len() - 1).skip(1) {
            env.push(k, k, &self.bounds_at_time(k));
        }
        for piece in knots.windows(2) {
            self.refine_piece(&mut env, piece[0], piece[1]);
        }
        env.finish()
    }

    // ── internals ──────────────────────────────────────────────────────

    pub(crate) fn bounds_in_segment(&self, itime: usize, f: f32) -> Aabb {
        let (o0, o1) = self.segment_object_bounds(itime);
        o0.lerp(&o1, f)
            .transformed(&self.motion.segment_keys(itime).interpolate(f))
    }

    /// Returns `true` when the object's bounds differ across segment
    /// `itime`, which makes linear motion sweep outside its end boxes.
    pub(crate) fn object_bounds_vary(&self, itime: usize) -> bool {
        let (o0, o1) = self.segment_object_bounds(itime);
        o0 != o1
    }

    fn segment_object_bounds(&self, itime: usize) -> (Aabb, Aabb) {
        let last = self.num_time_segments();
        (
            self.object_bounds(itime.min(last)),
            self.object_bounds((itime + 1).min(last)),
        )
    }

    /// Range ends plus every timestep time strictly inside.
    fn knots(&self, range: &TimeRange) -> Vec<f32> {
        let mut knots = Vec::with_capacity(self.num_time_steps() + 2);
        knots.push(range.lower);
        knots.extend(
            (0..self.num_time_steps())
                .map(|i| self.time_of_step(i))
                .filter(|&t| range.lower < t && t < range.upper),
        );
        knots.push(range.upper);
        knots
    }

    /// Fraction of segment `itime` at time `t`, clamped to `[0, 1]`.
    #[allow(clippy::cast_precision_loss)]
    fn segment_fraction(&self, itime: usize, t: f32) -> f32 {
        let segments = self.num_time_segments();
        if segments == 0 {
            return 0.0;
        }
        let scaled = self.time_range.normalize(t) * segments as f32;
        (scaled - itime as f32).clamp(0.0, 1.0)
    }

    fn refine_piece(&self, env: &mut Envelope, ta: f32, tb: f32) {
        let (itime, _) = self.time_segment(0.5 * (ta + tb));
        let curved = match self.motion.mode {
            Interpolation::Spherical => true,
            Interpolation::Linear => self.object_bounds_vary(itime),
        };
        if curved {
            self.refine(env, itime, ta, tb, 0);
        }
    }

    fn refine(&self, env: &mut Envelope, itime: usize, ta: f32, tb: f32, depth: u32) {
        let fa = self.segment_fraction(itime, ta);
        let fb = self.segment_fraction(itime, tb);
        let enclosure = self.enclose(itime, fa, fb);
        let ends = self
            .bounds_in_segment(itime, fa)
            .union(&self.bounds_in_segment(itime, fb));
        let slack = enclosure
            .max()
            .sub(&ends.max())
            .max(&ends.min().sub(&enclosure.min()))
            .max_element();
        let extent = ends.size().max_element();
        if slack.is_nan() || slack <= self.config.refine_tolerance * extent {
            env.push(ta, tb, &enclosure);
            return;
        }
        if depth >= self.config.max_refine_depth {
            trace!(itime, ta, tb, slack, "interval refinement hit depth cap");
            env.push(ta, tb, &enclosure);
            return;
        }
        let mid = 0.5 * (ta + tb);
        self.refine(env, itime, ta, mid, depth + 1);
        self.refine(env, itime, mid, tb, depth + 1);
    }

    /// Box containing the transformed object for every fraction in
    /// `[fa, fb]` of segment `itime`.
    fn enclose(&self, itime: usize, fa: f32, fb: f32) -> Aabb {
        let (o0, o1) = self.segment_object_bounds(itime);
        let oa = o0.lerp(&o1, fa);
        let ob = o0.lerp(&o1, fb);
        if !(oa.is_valid() && ob.is_valid()) {
            return oa.union(&ob);
        }
        let object = IntervalVec3::from_bounds(oa.min().min(&ob.min()), oa.max().max(&ob.max()));

        let swept = match self.motion.segment_keys(itime) {
            SegmentKeys::Linear(a, b) => {
                let xa = a.lerp(b, fa);
                let xb = a.lerp(b, fb);
                object
                    .transform_interval(&hull_mat3(&xa.linear, &xb.linear))
                    .add(&IntervalVec3::hull(xa.translation, xb.translation))
            }
            SegmentKeys::Spherical(a, b) => {
                let da = a.interpolate(b, fa);
                let db = a.interpolate(b, fb);
                let local = object
                    .transform_interval(&hull_mat3(&da.scale_skew, &db.scale_skew))
                    .add(&IntervalVec3::hull(da.shift, db.shift));
                let arc = self.motion.arcs.get(itime).copied().unwrap_or(RotationArc {
                    axis: Vec3::ZERO,
                    angle: 0.0,
                });
                let phi = Interval::hull(
                    a.rotation.angle_to(&da.rotation),
                    a.rotation.angle_to(&db.rotation),
                );
                local
                    .transform_interval(&rotation_interval(&arc.axis, &phi))
                    .transform(&a.rotation.to_mat3())
                    .add(&IntervalVec3::hull(da.translation, db.translation))
            }
        };
        Aabb::new(swept.lo(), swept.hi())
    }
}

/// Entry-wise hull of two matrices, row-major.
fn hull_mat3(a: &Mat3, b: &Mat3) -> IntervalMat3 {
    let mut out = [[Interval::ZERO; 3]; 3];
    for (r, row) in out.iter_mut().enumerate() {
        for (c, entry) in row.iter_mut().enumerate() {
            *entry = Interval::hull(a.at(r, c), b.at(r, c));
        }
    }
    out
}

/// Encloses `I + sin φ · K + (1 - cos φ) · K²` (Rodrigues) for every angle
/// in `phi ⊂ [0, π]`, where `K` is the cross-product matrix of `axis`.
fn rotation_interval(axis: &Vec3, phi: &Interval) -> IntervalMat3 {
    let lo = (phi.lo - ANGLE_SLACK).max(0.0);
    let hi = (phi.hi + ANGLE_SLACK).min(PI);
    let sin_hi = if lo <= FRAC_PI_2 && FRAC_PI_2 <= hi {
        1.0
    } else {
        lo.sin().max(hi.sin())
    };
    let sin = Interval::new(lo.sin().min(hi.sin()), sin_hi);
    let versine = Interval::new(1.0 - lo.cos(), 1.0 - hi.cos());

    let [x, y, z] = axis.to_array();
    let k = [[0.0, -z, y], [z, 0.0, -x], [-y, x, 0.0]];
    let n2 = axis.length_squared();
    let mut out = [[Interval::ZERO; 3]; 3];
    for (r, row) in out.iter_mut().enumerate() {
        for (c, entry) in row.iter_mut().enumerate() {
            let delta = if r == c { 1.0 } else { 0.0 };
            // K² = a·aᵀ - |a|²·I
            let k2 = axis.component(r) * axis.component(c) - delta * n2;
            *entry = Interval::point(delta)
                .add(&sin.scale(k[r][c]))
                .add(&versine.scale(k2))
                .widen(ANGLE_SLACK);
        }
    }
    out
}

/// Linear envelope over `range`.
///
/// Pushes grow it by uniform shifts of both ends. [`Envelope::finish`] then
/// refits each face to the pushed samples and keeps the refit only where it
/// lowers the face's mean without widening its hull.
struct Envelope {
    bounds: LinearBounds,
    range: TimeRange,
    /// `(s, box)`: the envelope must contain `box` at parameter `s`.
    samples: Vec<(f32, Aabb)>,
    invalid: Option<Aabb>,
}

impl Envelope {
    fn new(bounds: LinearBounds, range: TimeRange) -> Self {
        Self {
            bounds,
            range,
            samples: vec![(0.0, bounds.bounds0), (1.0, bounds.bounds1)],
            invalid: None,
        }
    }

    /// Shifts the envelope so it contains `enclosure` for every time in
    /// `[ta, tb]`. A line's extremes over an interval sit at its ends, so
    /// checking both ends suffices.
    fn push(&mut self, ta: f32, tb: f32, enclosure: &Aabb) {
        if !enclosure.is_valid() {
            self.invalid.get_or_insert(*enclosure);
            return;
        }
        let sa = self.range.normalize(ta);
        let sb = self.range.normalize(tb);
        self.samples.push((sa, *enclosure));
        if tb > ta {
            self.samples.push((sb, *enclosure));
        }
        let la = self.bounds.interpolate(sa);
        let lb = self.bounds.interpolate(sb);
        let down = enclosure
            .min()
            .sub(&la.min())
            .min(&enclosure.min().sub(&lb.min()))
            .min(&Vec3::ZERO);
        let up = enclosure
            .max()
            .sub(&la.max())
            .max(&enclosure.max().sub(&lb.max()))
            .max(&Vec3::ZERO);
        let shift = |b: &Aabb| Aabb::new(b.min().add(&down), b.max().add(&up));
        self.bounds = LinearBounds::new(shift(&self.bounds.bounds0), shift(&self.bounds.bounds1));
    }

    fn finish(self) -> LinearBounds {
        if let Some(bad) = self.invalid {
            return LinearBounds::constant(bad);
        }
        if !self.bounds.is_valid() {
            return self.bounds;
        }
        let b = if self.range.size() > 0.0 {
            self.refit()
        } else {
            self.bounds
        };
        let magnitude = b
            .bounds0
            .min()
            .abs()
            .max(&b.bounds0.max().abs())
            .max(&b.bounds1.min().abs())
            .max(&b.bounds1.max().abs())
            .max_element();
        let pad = magnitude * ROUNDING_MARGIN;
        LinearBounds::new(b.bounds0.inflate(pad), b.bounds1.inflate(pad))
    }

    /// Refits every face of the uniform-shift envelope to the samples.
    fn refit(&self) -> LinearBounds {
        let axes: [[f32; 4]; 3] = core::array::from_fn(|axis| self.refit_axis(axis));
        let pick = |face: usize| Vec3::new(axes[0][face], axes[1][face], axes[2][face]);
        LinearBounds::new(Aabb::new(pick(0), pick(2)), Aabb::new(pick(1), pick(3)))
    }

    /// `[min0, min1, max0, max1]` along `axis`. Lower faces are fitted as
    /// negated upper faces.
    fn refit_axis(&self, axis: usize) -> [f32; 4] {
        let (b0, b1) = (&self.bounds.bounds0, &self.bounds.bounds1);
        let mut lo = (b0.min().component(axis), b1.min().component(axis));
        let mut hi = (b0.max().component(axis), b1.max().component(axis));
        let mut points: Vec<(f32, f32)> = self
            .samples
            .iter()
            .map(|(s, b)| (*s, b.max().component(axis)))
            .collect();
        if let Some(face) = tighter_face(&mut points, hi) {
            hi = face;
        }
        points.clear();
        points.extend(self.samples.iter().map(|(s, b)| (*s, -b.min().component(axis))));
        if let Some((a, b)) = tighter_face(&mut points, (-lo.0, -lo.1)) {
            lo = (-a, -b);
        }
        [lo.0, lo.1, hi.0, hi.1]
    }
}

/// Upper face `(value at s=0, value at s=1)` lying above every `(s, v)` in
/// `points`, with the smallest mean whose larger end stays at or below the
/// larger end of `current`. `None` when `current` is already as good.
fn tighter_face(points: &mut [(f32, f32)], current: (f32, f32)) -> Option<(f32, f32)> {
    let cap = current.0.max(current.1);
    let (mut a, mut b) = supporting_line(points)?;
    if a > cap {
        a = cap;
        b = points
            .iter()
            .filter(|p| p.0 > 0.0)
            .map(|&(s, v)| (v - cap * (1.0 - s)) / s)
            .fold(f32::NEG_INFINITY, f32::max);
    } else if b > cap {
        b = cap;
        a = points
            .iter()
            .filter(|p| p.0 < 1.0)
            .map(|&(s, v)| (v - cap * s) / (1.0 - s))
            .fold(f32::NEG_INFINITY, f32::max);
    }
    let lift = points
        .iter()
        .map(|&(s, v)| v - (a + (b - a) * s))
        .fold(0.0f32, f32::max);
    a += lift;
    b += lift;
    let better =
        a.is_finite() && b.is_finite() && a.max(b) <= cap && a + b < current.0 + current.1;
    better.then_some((a, b))
}

/// Line `(value at s=0, value at s=1)` through the edge of the upper convex
/// hull of `points` that spans `s = 0.5`. The line minimises its value at
/// `s = 0.5` among lines above every point.
fn supporting_line(points: &mut [(f32, f32)]) -> Option<(f32, f32)> {
    points.sort_by(|p, q| p.0.total_cmp(&q.0).then(q.1.total_cmp(&p.1)));
    let mut hull: Vec<(f32, f32)> = Vec::with_capacity(points.len());
    for &p in points.iter() {
        if hull.last().is_some_and(|last| last.0.total_cmp(&p.0).is_eq()) {
            continue;
        }
        while hull.len() >= 2 {
            let o = hull[hull.len() - 2];
            let a = hull[hull.len() - 1];
            let cross = (a.0 - o.0) * (p.1 - o.1) - (a.1 - o.1) * (p.0 - o.0);
            if cross < 0.0 {
                break;
            }
            hull.pop();
        }
        hull.push(p);
    }
    let (p, q) = hull
        .windows(2)
        .map(|w| (w[0], w[1]))
        .find(|(p, q)| p.0 <= 0.5 && 0.5 <= q.0)?;
    let slope = (q.1 - p.1) / (q.0 - p.0);
    let a = p.1 - slope * p.0;
    Some((a, a + slope))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_interval_contains_samples() {
        let axis = Vec3::new(1.0, 2.0, -0.5).normalize();
        let phi = Interval::new(0.2, 2.4);
        let enc = rotation_interval(&axis, &phi);
        for step in 0..=20u8 {
            let angle = 0.2 + 2.2 * f32::from(step) / 20.0;
            let m = instancer_math::Quat::from_axis_angle(axis, angle).to_mat3();
            for (r, row) in enc.iter().enumerate() {
                for (c, entry) in row.iter().enumerate() {
                    assert!(
                        entry.contains(m.at(r, c)),
                        "entry ({r},{c}) = {} outside {entry:?} at angle {angle}",
                        m.at(r, c)
                    );
                }
            }
        }
    }

    #[test]
    fn envelope_shift_covers_enclosure() {
        let unit = Aabb::from_center_half_extents(Vec3::ZERO, 1.0, 1.0, 1.0);
        let mut env = Envelope::new(LinearBounds::constant(unit), TimeRange::UNIT);
        let bump = Aabb::from_center_half_extents(Vec3::new(0.0, 2.0, 0.0), 1.0, 1.0, 1.0);
        env.push(0.25, 0.75, &bump);
        let out = env.finish();
        for u in [0.25f32, 0.5, 0.75] {
            assert!(out.interpolate(u).contains(&bump, 0.0));
        }
        let grow0 = unit.max().y() - out.bounds0.max().y();
        let grow1 = unit.max().y() - out.bounds1.max().y();
        assert!((grow0 - grow1).abs() < 1e-6);
    }

    #[test]
    fn refit_drops_slack_from_the_far_end() {
        let start = Aabb::new(Vec3::splat(-1.0), Vec3::ZERO);
        let end = Aabb::new(Vec3::splat(3.0), Vec3::splat(4.0));
        let bump = Aabb::new(Vec3::splat(-1.0), Vec3::splat(3.0));
        let mut env = Envelope::new(LinearBounds::new(start, end), TimeRange::UNIT);
        env.push(0.0, 0.25, &bump);
        // Uniform shifting alone would lift the upper face to (3, 7).
        let out = env.finish();
        assert!(out.bounds1.max().y() < 4.01, "{out:?}");
        assert!(out.bounds0.max().y() >= 3.0, "{out:?}");
        assert!(out.bounds0.contains(&start, 0.0));
        assert!(out.bounds1.contains(&end, 0.0));
        for u in [0.0f32, 0.125, 0.25] {
            assert!(out.interpolate(u).contains(&bump, 1e-5), "u={u}: {out:?}");
        }
    }

    #[test]
    fn supporting_line_touches_the_hull_over_the_middle() {
        let mut points = [(0.0, 0.0), (1.0, 0.0), (0.25, 2.0), (0.75, 2.0), (0.5, 1.0)];
        assert_eq!(supporting_line(&mut points), Some((2.0, 2.0)));
        let mut tilted = [(0.0, 1.0), (1.0, 3.0)];
        assert_eq!(supporting_line(&mut tilted), Some((1.0, 3.0)));
    }
}
