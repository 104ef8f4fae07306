// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Recoverable configuration errors.
//!
//! Numeric degeneracy is never an error here: singular transforms surface as
//! non-finite bounds and are filtered by the validity checks.

use thiserror::Error;

use crate::GeomId;

/// Errors raised by instance and scene configuration.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    /// Timestep counts must be at least one.
    #[error("invalid time step count {0}: at least one time step is required")]
    InvalidTimeStepCount(usize),
    /// Time ranges must be finite with `lower <= upper`.
    #[error("invalid time range [{lower}, {upper}]")]
    InvalidTimeRange {
        /// Requested lower bound.
        lower: f32,
        /// Requested upper bound.
        upper: f32,
    },
    /// Commit was requested before an instanced object was set.
    #[error("instance has no instanced object")]
    MissingObject,
    /// The instance is already attached to a scene.
    #[error("instance already attached as geometry {0}")]
    AlreadyAttached(GeomId),
    /// No geometry is registered under the given id.
    #[error("unknown geometry id {0}")]
    UnknownGeometry(GeomId),
    /// The scene ran out of geometry ids.
    #[error("scene geometry id space exhausted")]
    TooManyGeometries,
    /// Rejected bounds configuration.
    #[error("invalid bounds config: {0}")]
    Config(#[from] ConfigError),
}

/// Errors raised by [`crate::BoundsConfig::validate`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    /// Refinement tolerance must be finite and positive.
    #[error("refine_tolerance must be finite and > 0 (got {0})")]
    InvalidTolerance(f32),
    /// Refinement depth outside the supported range.
    #[error("max_refine_depth must be in 0..={max} (got {got})")]
    InvalidDepth {
        /// Requested depth.
        got: u32,
        /// Largest accepted depth.
        max: u32,
    },
}
