// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! The instance primitive: a shared instanced object placed in the world by
//! a time-varying transform.
//!
//! Lifecycle:
//! - created detached with a timestep count;
//! - setters mutate the track, mask, time range and object freely;
//! - [`Instance::commit`] resolves the interpolation mode and rebuilds the
//!   keyframes, the inverse at timestep 0 and the per-segment rotation arcs;
//! - reads (transforms, bounds, producers) take `&self` and expect a
//!   committed instance, so they can run concurrently across threads.

use std::sync::Arc;

use instancer_math::{AffineTransform, Mat3};
use tracing::{debug, warn};

use crate::config::BoundsConfig;
use crate::error::GeometryError;
use crate::ident::GeomId;
use crate::object::InstancedObject;
use crate::temporal::time_range::TimeRange;
use crate::types::aabb::Aabb;
use crate::types::transform::{Interpolation, QuaternionDecomposition, TransformRecord};

mod batch;
mod bounds;
mod track;

pub use batch::{LaneQuery, SegmentGroups, DEFAULT_LANE_WIDTH};
pub use track::TransformTrack;

use track::ResolvedMotion;

/// Default geometry mask: visible to every ray.
pub const DEFAULT_MASK: u32 = 0xFFFF_FFFF;

/// Per-kind geometry counts reported to the enclosing builder.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct GeometryCounts {
    /// Instances with a single timestep.
    pub instances: usize,
    /// Instances with motion (two or more timesteps).
    pub mb_instances: usize,
}

impl GeometryCounts {
    /// Total primitive count.
    pub fn total(&self) -> usize {
        self.instances + self.mb_instances
    }
}

/// An instanced object under a per-timestep transform.
///
/// Always contributes exactly one logical primitive, addressed as index 0.
pub struct Instance {
    track: TransformTrack,
    object: Option<Arc<dyn InstancedObject>>,
    mask: u32,
    time_range: TimeRange,
    geom_id: Option<GeomId>,
    config: BoundsConfig,
    motion: ResolvedMotion,
    dirty: bool,
}

impl core::fmt::Debug for Instance {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Instance")
            .field("num_time_steps", &self.track.len())
            .field("has_object", &self.object.is_some())
            .field("mask", &self.mask)
            .field("time_range", &self.time_range)
            .field("geom_id", &self.geom_id)
            .field("interpolation", &self.motion.mode)
            .field("dirty", &self.dirty)
            .finish_non_exhaustive()
    }
}

impl Instance {
    /// A detached, uncommitted instance with `num_time_steps` identity
    /// transforms and no object.
    pub fn new(num_time_steps: usize) -> Result<Self, GeometryError> {
        if num_time_steps == 0 {
            return Err(GeometryError::InvalidTimeStepCount(num_time_steps));
        }
        let track = TransformTrack::new(num_time_steps);
        let motion = ResolvedMotion::resolve(&track);
        Ok(Self {
            track,
            object: None,
            mask: DEFAULT_MASK,
            time_range: TimeRange::UNIT,
            geom_id: None,
            config: BoundsConfig::default(),
            motion,
            dirty: true,
        })
    }

    /// Convenience constructor: sets the object, leaves the instance
    /// uncommitted.
    pub fn with_object(
        num_time_steps: usize,
        object: Arc<dyn InstancedObject>,
    ) -> Result<Self, GeometryError> {
        let mut inst = Self::new(num_time_steps)?;
        inst.set_instanced_object(object);
        Ok(inst)
    }

    // ── configuration ──────────────────────────────────────────────────

    /// Stores a plain transform at `timestep`.
    pub fn set_transform(&mut self, transform: &AffineTransform, timestep: usize) {
        self.track.set(timestep, TransformRecord::Plain(*transform));
        self.dirty = true;
    }

    /// Stores a quaternion-decomposed transform at `timestep`.
    pub fn set_quaternion_decomposition(
        &mut self,
        decomposition: &QuaternionDecomposition,
        timestep: usize,
    ) {
        self.track
            .set(timestep, TransformRecord::Decomposed(*decomposition));
        self.dirty = true;
    }

    /// Stores a packed 16-float decomposition record at `timestep`.
    pub fn set_packed_decomposition(&mut self, packed: &[[f32; 4]; 4], timestep: usize) {
        self.set_quaternion_decomposition(&QuaternionDecomposition::from_packed(packed), timestep);
    }

    /// Resizes the track. Existing slots are kept, new ones are identity.
    pub fn set_num_time_steps(&mut self, num_time_steps: usize) -> Result<(), GeometryError> {
        if num_time_steps == 0 {
            return Err(GeometryError::InvalidTimeStepCount(num_time_steps));
        }
        self.track.resize(num_time_steps);
        self.dirty = true;
        Ok(())
    }

    /// Sets the time range the timesteps are spread over.
    pub fn set_time_range(&mut self, lower: f32, upper: f32) -> Result<(), GeometryError> {
        self.time_range = TimeRange::try_new(lower, upper)?;
        self.dirty = true;
        Ok(())
    }

    /// Sets the geometry mask.
    pub fn set_mask(&mut self, mask: u32) {
        self.mask = mask;
    }

    /// Sets the object to instance. The previous object, if any, is released
    /// without being destroyed for other holders.
    pub fn set_instanced_object(&mut self, object: Arc<dyn InstancedObject>) {
        self.object = Some(object);
        self.dirty = true;
    }

    /// Replaces the interval-bounds refinement tuning.
    pub fn set_bounds_config(&mut self, config: BoundsConfig) -> Result<(), GeometryError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    // ── lifecycle ──────────────────────────────────────────────────────

    /// Records the geometry id assigned by the owning scene.
    pub fn attach(&mut self, geom_id: GeomId) -> Result<(), GeometryError> {
        if let Some(existing) = self.geom_id {
            return Err(GeometryError::AlreadyAttached(existing));
        }
        self.geom_id = Some(geom_id);
        Ok(())
    }

    /// Clears the geometry id and releases this instance's handle on the
    /// object.
    pub fn detach(&mut self) {
        self.geom_id = None;
        self.object = None;
        self.dirty = true;
    }

    /// Resolves the interpolation mode and rebuilds every derived cache.
    ///
    /// Mixed plain/decomposed tracks are accepted and resolve to spherical
    /// interpolation; debug builds log a warning.
    pub fn commit(&mut self) -> Result<(), GeometryError> {
        if self.object.is_none() {
            return Err(GeometryError::MissingObject);
        }
        if cfg!(debug_assertions) && self.track.is_mixed() {
            warn!(
                geom_id = ?self.geom_id,
                "instance mixes plain and quaternion-decomposed transforms; interpolating spherically"
            );
        }
        self.motion = ResolvedMotion::resolve(&self.track);
        self.dirty = false;
        debug!(
            geom_id = ?self.geom_id,
            mode = ?self.motion.mode,
            segments = self.num_time_segments(),
            "instance committed"
        );
        Ok(())
    }

    /// Adds this instance to the per-kind counts.
    pub fn add_elements_to_count(&self, counts: &mut GeometryCounts) {
        if self.track.len() == 1 {
            counts.instances += 1;
        } else {
            counts.mb_instances += 1;
        }
    }

    // ── accessors ──────────────────────────────────────────────────────

    /// The raw transform records.
    pub fn track(&self) -> &TransformTrack {
        &self.track
    }

    /// Number of timesteps.
    pub fn num_time_steps(&self) -> usize {
        self.track.len()
    }

    /// Number of segments (`timesteps - 1`).
    pub fn num_time_segments(&self) -> usize {
        self.track.len().saturating_sub(1)
    }

    /// Time range the timesteps span.
    pub fn time_range(&self) -> TimeRange {
        self.time_range
    }

    /// Geometry mask.
    pub fn mask(&self) -> u32 {
        self.mask
    }

    /// Id assigned on attach.
    pub fn geom_id(&self) -> Option<GeomId> {
        self.geom_id
    }

    /// The instanced object, if set.
    pub fn instanced_object(&self) -> Option<&Arc<dyn InstancedObject>> {
        self.object.as_ref()
    }

    /// Current refinement tuning.
    pub fn bounds_config(&self) -> &BoundsConfig {
        &self.config
    }

    /// Interpolation mode resolved at the last commit.
    pub fn interpolation(&self) -> Interpolation {
        self.motion.mode
    }

    /// Returns `true` when no setter has run since the last commit.
    pub fn is_committed(&self) -> bool {
        !self.dirty
    }

    // ── transform queries ──────────────────────────────────────────────

    /// Segment index and fraction for time `t`.
    pub fn time_segment(&self, t: f32) -> (usize, f32) {
        self.time_range.segment(t, self.num_time_segments())
    }

    /// Time of timestep `itime`.
    pub fn time_of_step(&self, itime: usize) -> f32 {
        self.time_range.time_of_step(itime, self.num_time_segments())
    }

    /// Resolved transform at timestep `itime`.
    pub fn transform_at_timestep(&self, itime: usize) -> AffineTransform {
        self.debug_assert_readable();
        debug_assert!(itime < self.motion.local_to_world.len(), "timestep {itime} out of range");
        self.motion
            .local_to_world
            .get(itime)
            .copied()
            .unwrap_or_else(|| AffineTransform::from_linear(Mat3::zero()))
    }

    /// Resolved transform at timestep 0.
    pub fn local_to_world0(&self) -> AffineTransform {
        self.transform_at_timestep(0)
    }

    /// Local-to-world transform at time `t`.
    ///
    /// Linear mode lerps the bracketing transforms entry-wise; spherical mode
    /// slerps the rotations and lerps the remaining parts.
    pub fn transform_at(&self, t: f32) -> AffineTransform {
        self.debug_assert_readable();
        let (itime, f) = self.time_segment(t);
        self.motion.segment_keys(itime).interpolate(f)
    }

    /// Cached inverse of the timestep-0 transform.
    pub fn world_to_local0(&self) -> AffineTransform {
        self.debug_assert_readable();
        self.motion.world_to_local0
    }

    /// Exact inverse of [`Self::transform_at`], computed per call.
    pub fn world_to_local(&self, t: f32) -> AffineTransform {
        self.transform_at(t).inverse()
    }

    pub(crate) fn object_bounds(&self, itime: usize) -> Aabb {
        debug_assert!(self.object.is_some(), "instance has no instanced object");
        self.object
            .as_ref()
            .map_or_else(Aabb::empty, |o| o.bounds_at_timestep(itime))
    }

    fn debug_assert_readable(&self) {
        debug_assert!(!self.dirty, "instance read before commit");
    }
}
