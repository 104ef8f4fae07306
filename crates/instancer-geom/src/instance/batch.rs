// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Batched world-to-local transforms for a lane of independent query times.
//!
//! Lanes that fall into the same time segment share one keyframe fetch. The
//! per-lane arithmetic is the scalar path's, so grouping only changes how
//! often keyframes are looked up, never the results.

use instancer_math::AffineTransform;

use super::Instance;

/// Lane width used when callers have no reason to pick another.
pub const DEFAULT_LANE_WIDTH: usize = 8;

/// A batch of `W` time queries; only lanes with `active[i]` are evaluated.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LaneQuery<const W: usize> {
    /// Lane mask.
    pub active: [bool; W],
    /// Query time per lane; ignored for inactive lanes.
    pub times: [f32; W],
}

impl<const W: usize> LaneQuery<W> {
    /// All lanes active.
    pub fn new(times: [f32; W]) -> Self {
        Self {
            active: [true; W],
            times,
        }
    }

    /// Explicit mask and times.
    pub fn with_mask(active: [bool; W], times: [f32; W]) -> Self {
        Self { active, times }
    }

    /// Returns `true` when no lane is active.
    pub fn is_empty(&self) -> bool {
        !self.active.iter().any(|&a| a)
    }
}

/// Partition of active lanes by time segment.
///
/// Iterating repeatedly takes the segment of the first remaining lane and
/// yields it with the mask of every remaining lane in that segment. The set
/// of groups does not depend on lane order.
#[derive(Debug, Clone)]
pub struct SegmentGroups<const W: usize> {
    remaining: [bool; W],
    segments: [usize; W],
}

impl<const W: usize> SegmentGroups<W> {
    /// Groups the lanes in `active` by their entry in `segments`.
    pub fn new(active: [bool; W], segments: [usize; W]) -> Self {
        Self {
            remaining: active,
            segments,
        }
    }
}

impl<const W: usize> Iterator for SegmentGroups<W> {
    type Item = (usize, [bool; W]);

    fn next(&mut self) -> Option<Self::Item> {
        let first = self.remaining.iter().position(|&r| r)?;
        let segment = self.segments[first];
        let mut group = [false; W];
        for lane in first..W {
            if self.remaining[lane] && self.segments[lane] == segment {
                group[lane] = true;
                self.remaining[lane] = false;
            }
        }
        Some((segment, group))
    }
}

impl Instance {
    /// World-to-local transform per active lane; inactive lanes hold the
    /// identity.
    ///
    /// Each active lane equals [`Instance::world_to_local`] at its time.
    pub fn world_to_local_lanes<const W: usize>(
        &self,
        query: &LaneQuery<W>,
    ) -> [AffineTransform; W] {
        self.debug_assert_readable();
        let mut out = [AffineTransform::identity(); W];
        let mut segments = [0usize; W];
        let mut fractions = [0.0f32; W];
        for lane in 0..W {
            if query.active[lane] {
                (segments[lane], fractions[lane]) = self.time_segment(query.times[lane]);
            }
        }

        let Some(first) = query.active.iter().position(|&a| a) else {
            return out;
        };
        let shared = segments[first];
        let uniform = (0..W).all(|lane| !query.active[lane] || segments[lane] == shared);

        if uniform {
            let keys = self.motion.segment_keys(shared);
            for lane in 0..W {
                if query.active[lane] {
                    out[lane] = keys.interpolate(fractions[lane]);
                }
            }
        } else {
            for (segment, group) in SegmentGroups::new(query.active, segments) {
                let keys = self.motion.segment_keys(segment);
                for lane in 0..W {
                    if group[lane] {
                        out[lane] = keys.interpolate(fractions[lane]);
                    }
                }
            }
        }

        for lane in 0..W {
            if query.active[lane] {
                out[lane] = out[lane].inverse();
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_cover_every_active_lane_once() {
        let active = [true, false, true, true, true, false, true, true];
        let segments = [2, 0, 1, 2, 0, 1, 1, 3];
        let groups: Vec<_> = SegmentGroups::new(active, segments).collect();
        let ids: Vec<usize> = groups.iter().map(|(s, _)| *s).collect();
        assert_eq!(ids, vec![2, 1, 0, 3]);
        let mut seen = [false; 8];
        for (segment, mask) in &groups {
            for lane in 0..8 {
                if mask[lane] {
                    assert!(!seen[lane]);
                    assert_eq!(segments[lane], *segment);
                    seen[lane] = true;
                }
            }
        }
        assert_eq!(seen, active);
    }

    #[test]
    fn empty_mask_yields_no_groups() {
        let mut groups = SegmentGroups::new([false; 4], [0; 4]);
        assert!(groups.next().is_none());
    }
}
