// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Core geometry types: boxes, linear box envelopes and transform records.
//!
//! Bounds are never rejected on construction. Singular transforms and
//! missing objects produce non-finite or inverted boxes that
//! [`aabb::Aabb::is_valid`] filters later.

#[doc = "Axis-aligned bounding boxes."]
pub mod aabb;
#[doc = "Pairs of boxes interpolated linearly over a time range."]
pub mod linear_bounds;
#[doc = "Per-timestep transform records (plain or quaternion-decomposed)."]
pub mod transform;
