// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use crate::error::ConfigError;

/// Tuning for the conservative interval-bounds refinement.
///
/// Every refinement step yields a valid enclosure, so these knobs trade
/// tightness for time and never affect conservativeness.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BoundsConfig {
    /// Stop bisecting once an enclosure exceeds the bounds at its ends by at
    /// most this fraction of the piece's extent.
    pub refine_tolerance: f32,
    /// Bisection depth cap per piece between knots. A piece at depth `d`
    /// costs up to `2^d` enclosures on every `interval_bounds` call.
    pub max_refine_depth: u32,
}

impl BoundsConfig {
    /// Largest accepted `max_refine_depth`: at most 65536 enclosures per
    /// piece.
    pub const MAX_DEPTH: u32 = 16;

    /// Checks that the values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.refine_tolerance.is_finite() && self.refine_tolerance > 0.0) {
            return Err(ConfigError::InvalidTolerance(self.refine_tolerance));
        }
        if self.max_refine_depth > Self::MAX_DEPTH {
            return Err(ConfigError::InvalidDepth {
                got: self.max_refine_depth,
                max: Self::MAX_DEPTH,
            });
        }
        Ok(())
    }
}

impl Default for BoundsConfig {
    fn default() -> Self {
        Self {
            refine_tolerance: 0.01,
            max_refine_depth: 8,
        }
    }
}
