// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use super::aabb::Aabb;

/// Box envelope that varies linearly over a time range: `bounds0` at the
/// start, `bounds1` at the end, corner-wise lerp in between.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinearBounds {
    /// Box at the start of the range.
    pub bounds0: Aabb,
    /// Box at the end of the range.
    pub bounds1: Aabb,
}

impl LinearBounds {
    /// Creates an envelope from its two end boxes.
    pub const fn new(bounds0: Aabb, bounds1: Aabb) -> Self {
        Self { bounds0, bounds1 }
    }

    /// Constant envelope.
    pub const fn constant(bounds: Aabb) -> Self {
        Self::new(bounds, bounds)
    }

    /// The envelope at parameter `u ∈ [0, 1]`.
    pub fn interpolate(&self, u: f32) -> Aabb {
        self.bounds0.lerp(&self.bounds1, u)
    }

    /// Union of both end boxes; contains the envelope at every `u ∈ [0, 1]`.
    pub fn bounds(&self) -> Aabb {
        self.bounds0.union(&self.bounds1)
    }

    /// Returns `true` when both end boxes are valid.
    pub fn is_valid(&self) -> bool {
        self.bounds0.is_valid() && self.bounds1.is_valid()
    }
}

impl From<Aabb> for LinearBounds {
    fn from(value: Aabb) -> Self {
        Self::constant(value)
    }
}
