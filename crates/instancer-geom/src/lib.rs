// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![forbid(unsafe_code)]
#![doc = r"Motion-blurred instance primitive.

This crate provides:
- Axis-aligned boxes (`Aabb`) and linear box envelopes (`LinearBounds`).
- Per-timestep transform records, plain or quaternion-decomposed
  (`TransformRecord`, `QuaternionDecomposition`).
- The instance primitive (`Instance`): transform interpolation, bounds at
  timesteps and instants, conservative interval bounds over time ranges,
  and batched world-to-local inversion for lanes of query times.
- Primitive references for acceleration-structure builders (`PrimRef`,
  `PrimRefMB`) and a minimal registry that produces them (`Scene`).
- Cubic Bézier curves with radius (`BezierCurve`).

Design notes:
- Float32 throughout. Degenerate input never panics: singular transforms
  and missing objects yield non-finite or inverted boxes that validity
  checks filter.
- Reads take `&self` once an instance is committed, so bounds and
  transform queries can run from many threads.
- Rustdoc is treated as part of the contract; public items are documented.
"]

/// Builder-facing primitive records and the instance producers.
pub mod build;
/// Interval-bounds tuning.
pub mod config;
/// Cubic Bézier curves.
pub mod curve;
/// Error types.
pub mod error;
mod ident;
/// The instance primitive.
pub mod instance;
/// The instanced-object seam.
pub mod object;
/// Geometry registry.
pub mod scene;
/// Time ranges and timestep mapping.
pub mod temporal;
/// Foundational geometric types.
pub mod types;

pub use build::primref::{PrimInfo, PrimInfoMB, PrimRef, PrimRefMB};
pub use config::BoundsConfig;
pub use curve::basis::{BezierBasis, PrecomputedBezierBasis, BEZIER_BASIS0, BEZIER_BASIS1};
pub use curve::bezier::{BezierCurve, CurveVertex};
pub use error::{ConfigError, GeometryError};
pub use ident::GeomId;
pub use instance::{
    GeometryCounts, Instance, LaneQuery, SegmentGroups, TransformTrack, DEFAULT_LANE_WIDTH,
    DEFAULT_MASK,
};
pub use object::{InstancedObject, KeyframedBounds};
pub use scene::Scene;
pub use temporal::time_range::TimeRange;
pub use types::aabb::{Aabb, FLT_LARGE};
pub use types::linear_bounds::LinearBounds;
pub use types::transform::{Interpolation, QuaternionDecomposition, TransformRecord};
