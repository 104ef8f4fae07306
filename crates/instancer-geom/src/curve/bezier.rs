// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use instancer_math::Vec3;

use super::basis::{BezierBasis, PrecomputedBezierBasis, BEZIER_BASIS0, BEZIER_BASIS1};
use crate::types::aabb::Aabb;

/// Curve control point: a position and a radius.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CurveVertex {
    /// Position.
    pub position: Vec3,
    /// Radius (thickness) at this point.
    pub radius: f32,
}

impl CurveVertex {
    /// Creates a vertex.
    pub const fn new(position: Vec3, radius: f32) -> Self {
        Self { position, radius }
    }

    fn add(&self, other: &Self) -> Self {
        Self::new(self.position.add(&other.position), self.radius + other.radius)
    }

    fn sub(&self, other: &Self) -> Self {
        Self::new(self.position.sub(&other.position), self.radius - other.radius)
    }

    fn scale(&self, s: f32) -> Self {
        Self::new(self.position.scale(s), self.radius * s)
    }

    fn lerp(&self, other: &Self, t: f32) -> Self {
        Self::new(
            self.position.lerp(&other.position, t),
            instancer_math::lerp(self.radius, other.radius, t),
        )
    }
}

/// Cubic Bézier curve over four [`CurveVertex`] control points.
///
/// # Examples
/// ```
/// use instancer_geom::{BezierCurve, CurveVertex};
/// use instancer_math::Vec3;
/// let v = |x: f32| CurveVertex::new(Vec3::new(x, 0.0, 0.0), 0.1);
/// let curve = BezierCurve::new(v(0.0), v(1.0), v(2.0), v(3.0));
/// assert!((curve.eval(0.5).position.x() - 1.5).abs() < 1e-6);
/// ```
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BezierCurve {
    /// First control point (curve start).
    pub v0: CurveVertex,
    /// Second control point.
    pub v1: CurveVertex,
    /// Third control point.
    pub v2: CurveVertex,
    /// Fourth control point (curve end).
    pub v3: CurveVertex,
}

impl BezierCurve {
    /// Creates a curve from its control points.
    pub const fn new(v0: CurveVertex, v1: CurveVertex, v2: CurveVertex, v3: CurveVertex) -> Self {
        Self { v0, v1, v2, v3 }
    }

    /// Start point.
    pub fn begin(&self) -> CurveVertex {
        self.v0
    }

    /// End point.
    pub fn end(&self) -> CurveVertex {
        self.v3
    }

    fn combine(&self, w: [f32; 4]) -> CurveVertex {
        self.v0
            .scale(w[0])
            .add(&self.v1.scale(w[1]))
            .add(&self.v2.scale(w[2]))
            .add(&self.v3.scale(w[3]))
    }

    /// Point at `u`.
    pub fn eval(&self, u: f32) -> CurveVertex {
        self.combine(BezierBasis::eval(u))
    }

    /// First derivative at `u`.
    pub fn eval_du(&self, u: f32) -> CurveVertex {
        self.combine(BezierBasis::derivative(u))
    }

    /// Second derivative at `u`.
    pub fn eval_dudu(&self, u: f32) -> CurveVertex {
        self.combine(BezierBasis::derivative2(u))
    }

    /// Point, first and second derivative at `u`; point and first
    /// derivative come from de Casteljau subdivision.
    pub fn eval_all(&self, u: f32) -> (CurveVertex, CurveVertex, CurveVertex) {
        let p10 = self.v0.lerp(&self.v1, u);
        let p11 = self.v1.lerp(&self.v2, u);
        let p12 = self.v2.lerp(&self.v3, u);
        let p20 = p10.lerp(&p11, u);
        let p21 = p11.lerp(&p12, u);
        let p30 = p20.lerp(&p21, u);
        (p30, p21.sub(&p20).scale(3.0), self.eval_dudu(u))
    }

    /// Point at `u = ofs / size` from the precomputed tables.
    pub fn eval0(&self, ofs: usize, size: usize) -> CurveVertex {
        debug_assert!(size <= PrecomputedBezierBasis::N && ofs <= size);
        self.combine(BEZIER_BASIS0.weights(ofs, size))
    }

    /// Point at `u = (ofs + 1) / size` from the precomputed tables.
    pub fn eval1(&self, ofs: usize, size: usize) -> CurveVertex {
        debug_assert!(size <= PrecomputedBezierBasis::N && ofs <= size);
        self.combine(BEZIER_BASIS1.weights(ofs, size))
    }

    /// First derivative at `u = ofs / size` from the precomputed tables.
    pub fn derivative0(&self, ofs: usize, size: usize) -> CurveVertex {
        debug_assert!(size <= PrecomputedBezierBasis::N && ofs <= size);
        self.combine(BEZIER_BASIS0.derivative_weights(ofs, size))
    }

    /// First derivative at `u = (ofs + 1) / size` from the precomputed
    /// tables.
    pub fn derivative1(&self, ofs: usize, size: usize) -> CurveVertex {
        debug_assert!(size <= PrecomputedBezierBasis::N && ofs <= size);
        self.combine(BEZIER_BASIS1.derivative_weights(ofs, size))
    }

    /// Bounds of the swept tube, from eight samples pushed out along their
    /// tangents and enlarged by the largest radius.
    pub fn accurate_bounds(&self) -> Aabb {
        const N: usize = 7;
        #[allow(clippy::cast_precision_loss)]
        let scale = 1.0 / (3.0 * (N - 1) as f32);
        let mut bounds = Aabb::empty();
        let mut r_min = f32::INFINITY;
        let mut r_max = f32::NEG_INFINITY;
        for i in 0..=N {
            let p = self.eval0(i, N);
            let dp = self.derivative0(i, N);
            let pm = if i == 0 { p } else { p.sub(&dp.scale(scale)) };
            let pp = if i == N { p } else { p.add(&dp.scale(scale)) };
            for v in [p, pm, pp] {
                bounds = bounds.extend_point(&v.position);
                r_min = r_min.min(v.radius);
                r_max = r_max.max(v.radius);
            }
        }
        bounds.inflate(r_min.abs().max(r_max.abs()))
    }

    /// Bounds of the polyline through `n` evenly spaced samples and the end
    /// point, enlarged by the largest radius among them.
    pub fn tessellated_bounds(&self, n: usize) -> Aabb {
        debug_assert!((1..=PrecomputedBezierBasis::N).contains(&n), "unsupported tessellation {n}");
        let mut bounds = Aabb::empty().extend_point(&self.v3.position);
        let mut radius = self.v3.radius.abs();
        for i in 0..n {
            let p = self.eval0(i, n);
            bounds = bounds.extend_point(&p.position);
            radius = radius.max(p.radius.abs());
        }
        bounds.inflate(radius)
    }
}
