// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use instancer_math::Vec3;

use crate::ident::GeomId;
use crate::temporal::time_range::TimeRange;
use crate::types::aabb::Aabb;
use crate::types::linear_bounds::LinearBounds;

/// A primitive's box tagged with its owner.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PrimRef {
    /// World-space bounds.
    pub bounds: Aabb,
    /// Owning geometry.
    pub geom_id: GeomId,
    /// Primitive index within the geometry.
    pub prim_id: u32,
}

impl PrimRef {
    /// Creates a reference.
    pub const fn new(bounds: Aabb, geom_id: GeomId, prim_id: u32) -> Self {
        Self {
            bounds,
            geom_id,
            prim_id,
        }
    }

    /// Twice the box center.
    pub fn center2(&self) -> Vec3 {
        self.bounds.center2()
    }
}

impl Default for PrimRef {
    fn default() -> Self {
        Self::new(Aabb::empty(), GeomId(u32::MAX), 0)
    }
}

/// A primitive's linear envelope over a time range.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PrimRefMB {
    /// Envelope over `time_range`.
    pub lbounds: LinearBounds,
    /// Time segments the primitive is active over.
    pub active_time_segments: usize,
    /// Geometry time range.
    pub time_range: TimeRange,
    /// Total time segments of the geometry.
    pub total_time_segments: usize,
    /// Owning geometry.
    pub geom_id: GeomId,
    /// Primitive index within the geometry.
    pub prim_id: u32,
}

impl PrimRefMB {
    /// Union of the envelope's end boxes.
    pub fn bounds(&self) -> Aabb {
        self.lbounds.bounds()
    }

    /// Twice the center of [`Self::bounds`].
    pub fn center2(&self) -> Vec3 {
        self.bounds().center2()
    }
}

impl Default for PrimRefMB {
    fn default() -> Self {
        Self {
            lbounds: LinearBounds::constant(Aabb::empty()),
            active_time_segments: 0,
            time_range: TimeRange::empty(),
            total_time_segments: 0,
            geom_id: GeomId(u32::MAX),
            prim_id: 0,
        }
    }
}

/// Geometry and centroid bounds plus count of a set of [`PrimRef`]s.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PrimInfo {
    /// Union of primitive boxes.
    pub geom_bounds: Aabb,
    /// Union of doubled centers.
    pub cent_bounds: Aabb,
    /// Number of primitives.
    pub count: usize,
}

impl PrimInfo {
    /// Nothing accumulated.
    pub const fn empty() -> Self {
        Self {
            geom_bounds: Aabb::empty(),
            cent_bounds: Aabb::empty(),
            count: 0,
        }
    }

    /// Accumulates one primitive.
    pub fn add_center2(&mut self, prim: &PrimRef) {
        self.geom_bounds = self.geom_bounds.union(&prim.bounds);
        self.cent_bounds = self.cent_bounds.extend_point(&prim.center2());
        self.count += 1;
    }

    /// Accumulates another info.
    pub fn merge(&mut self, other: &Self) {
        self.geom_bounds = self.geom_bounds.union(&other.geom_bounds);
        self.cent_bounds = self.cent_bounds.union(&other.cent_bounds);
        self.count += other.count;
    }
}

impl Default for PrimInfo {
    fn default() -> Self {
        Self::empty()
    }
}

/// [`PrimInfo`] for motion-blur references, plus time-segment totals.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PrimInfoMB {
    /// Union of primitive boxes.
    pub geom_bounds: Aabb,
    /// Union of doubled centers.
    pub cent_bounds: Aabb,
    /// Number of primitives.
    pub count: usize,
    /// Sum of active time segments.
    pub num_time_segments: usize,
    /// Largest total time-segment count seen.
    pub max_num_time_segments: usize,
    /// Union of geometry time ranges.
    pub max_time_range: TimeRange,
}

impl PrimInfoMB {
    /// Nothing accumulated.
    pub const fn empty() -> Self {
        Self {
            geom_bounds: Aabb::empty(),
            cent_bounds: Aabb::empty(),
            count: 0,
            num_time_segments: 0,
            max_num_time_segments: 0,
            max_time_range: TimeRange::empty(),
        }
    }

    /// Accumulates one primitive.
    pub fn add_primref(&mut self, prim: &PrimRefMB) {
        self.geom_bounds = self.geom_bounds.union(&prim.bounds());
        self.cent_bounds = self.cent_bounds.extend_point(&prim.center2());
        self.count += 1;
        self.num_time_segments += prim.active_time_segments;
        self.max_num_time_segments = self.max_num_time_segments.max(prim.total_time_segments);
        self.max_time_range = self.max_time_range.union(&prim.time_range);
    }

    /// Accumulates another info.
    pub fn merge(&mut self, other: &Self) {
        self.geom_bounds = self.geom_bounds.union(&other.geom_bounds);
        self.cent_bounds = self.cent_bounds.union(&other.cent_bounds);
        self.count += other.count;
        self.num_time_segments += other.num_time_segments;
        self.max_num_time_segments = self.max_num_time_segments.max(other.max_num_time_segments);
        self.max_time_range = self.max_time_range.union(&other.max_time_range);
    }
}

impl Default for PrimInfoMB {
    fn default() -> Self {
        Self::empty()
    }
}
