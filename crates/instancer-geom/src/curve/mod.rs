// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Cubic Bézier curves with per-vertex radius, used by curve primitives that
//! live next to instances in a scene.

#[doc = "Bernstein basis and its process-wide precomputed tables."]
pub mod basis;
#[doc = "Cubic Bézier curve evaluation and bounds."]
pub mod bezier;
