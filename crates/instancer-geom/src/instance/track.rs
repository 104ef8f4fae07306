// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Per-timestep transform storage and the keyframes resolved from it.

use instancer_math::{AffineTransform, Quat, Vec3};

use crate::types::transform::{Interpolation, QuaternionDecomposition, TransformRecord};

/// Ordered per-timestep transform records, exactly as the caller wrote them.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformTrack {
    records: Vec<TransformRecord>,
}

impl TransformTrack {
    /// `len` identity plain records.
    pub fn new(len: usize) -> Self {
        Self {
            records: vec![TransformRecord::default(); len],
        }
    }

    /// Number of timesteps.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` when the track holds no timesteps.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in timestep order.
    pub fn records(&self) -> &[TransformRecord] {
        &self.records
    }

    /// Record at `timestep`, if in range.
    pub fn get(&self, timestep: usize) -> Option<&TransformRecord> {
        self.records.get(timestep)
    }

    /// Overwrites the record at `timestep`. Out-of-range writes are a caller
    /// bug: they assert in debug builds and are ignored otherwise.
    pub fn set(&mut self, timestep: usize, record: TransformRecord) {
        debug_assert!(
            timestep < self.records.len(),
            "timestep {timestep} out of range (len {})",
            self.records.len()
        );
        if let Some(slot) = self.records.get_mut(timestep) {
            *slot = record;
        }
    }

    /// Resizes the track; new slots are identity plain records.
    pub fn resize(&mut self, len: usize) {
        self.records.resize(len, TransformRecord::default());
    }

    /// Whole-track interpolation mode: spherical as soon as any slot is
    /// decomposed.
    pub fn interpolation(&self) -> Interpolation {
        if self.records.iter().any(TransformRecord::is_decomposed) {
            Interpolation::Spherical
        } else {
            Interpolation::Linear
        }
    }

    /// Returns `true` when plain and decomposed slots are mixed.
    pub fn is_mixed(&self) -> bool {
        let decomposed = self
            .records
            .iter()
            .filter(|r| r.is_decomposed())
            .count();
        decomposed != 0 && decomposed != self.records.len()
    }
}

/// Rotation swept over one segment: `R(f) = R(q0) · Rot(axis, φ(f))` with
/// `φ` increasing from `0` to `angle`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct RotationArc {
    /// Unit axis in the frame of the segment's first rotation (zero when
    /// both ends coincide).
    pub(crate) axis: Vec3,
    /// Total angle in radians, in `[0, π]`.
    pub(crate) angle: f32,
}

impl RotationArc {
    /// Arc from `q0` to `q1` along the path [`Quat::slerp`] takes; both
    /// inputs unit length.
    pub(crate) fn between(q0: &Quat, q1: &Quat) -> Self {
        let target = if q0.dot(q1) < 0.0 { q1.scale(-1.0) } else { *q1 };
        let rel = q0.conjugate().multiply(&target);
        let v = rel.vector();
        let len = v.length();
        let axis = if len > 0.0 { v.scale(1.0 / len) } else { Vec3::ZERO };
        Self {
            axis,
            angle: 2.0 * len.atan2(rel.w()),
        }
    }
}

/// The two keyframes bracketing one segment.
#[derive(Debug, Copy, Clone)]
pub(crate) enum SegmentKeys<'a> {
    Linear(&'a AffineTransform, &'a AffineTransform),
    Spherical(&'a QuaternionDecomposition, &'a QuaternionDecomposition),
}

impl SegmentKeys<'_> {
    /// The transform at fraction `f` of the segment. Every transform query
    /// (scalar, batched, bounds) goes through here.
    pub(crate) fn interpolate(&self, f: f32) -> AffineTransform {
        match self {
            Self::Linear(a, b) => a.lerp(b, f),
            Self::Spherical(a, b) => a.interpolate(b, f).to_affine(),
        }
    }
}

/// Keyframes and caches derived from a track at commit.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedMotion {
    pub(crate) mode: Interpolation,
    /// Effective transform per timestep.
    pub(crate) local_to_world: Vec<AffineTransform>,
    /// Normalised decompositions per timestep; empty in linear mode.
    pub(crate) decomposed: Vec<QuaternionDecomposition>,
    /// Rotation arc per segment; empty in linear mode.
    pub(crate) arcs: Vec<RotationArc>,
    pub(crate) world_to_local0: AffineTransform,
}

impl ResolvedMotion {
    pub(crate) fn resolve(track: &TransformTrack) -> Self {
        let mode = track.interpolation();
        let (local_to_world, decomposed, arcs) = match mode {
            Interpolation::Linear => (
                track.records().iter().map(TransformRecord::to_affine).collect::<Vec<_>>(),
                Vec::new(),
                Vec::new(),
            ),
            Interpolation::Spherical => {
                let decomposed: Vec<_> = track
                    .records()
                    .iter()
                    .map(|r| r.to_decomposition().normalized())
                    .collect();
                let arcs: Vec<_> = decomposed
                    .windows(2)
                    .map(|w| RotationArc::between(&w[0].rotation, &w[1].rotation))
                    .collect();
                let l2w: Vec<_> = decomposed
                    .iter()
                    .map(QuaternionDecomposition::to_affine)
                    .collect();
                (l2w, decomposed, arcs)
            }
        };
        let world_to_local0 = local_to_world
            .first()
            .map_or_else(AffineTransform::identity, AffineTransform::inverse);
        Self {
            mode,
            local_to_world,
            decomposed,
            arcs,
            world_to_local0,
        }
    }

    /// Keyframes bracketing segment `itime`; a single-timestep motion uses
    /// its only keyframe at both ends.
    pub(crate) fn segment_keys(&self, itime: usize) -> SegmentKeys<'_> {
        let last = self.local_to_world.len().saturating_sub(1);
        let i0 = itime.min(last);
        let i1 = (itime + 1).min(last);
        match self.mode {
            Interpolation::Linear => {
                SegmentKeys::Linear(&self.local_to_world[i0], &self.local_to_world[i1])
            }
            Interpolation::Spherical => {
                SegmentKeys::Spherical(&self.decomposed[i0], &self.decomposed[i1])
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f32::consts::FRAC_PI_2;

    #[test]
    fn mode_follows_any_decomposed_slot() {
        let mut track = TransformTrack::new(3);
        assert_eq!(track.interpolation(), Interpolation::Linear);
        assert!(!track.is_mixed());
        track.set(
            1,
            TransformRecord::Decomposed(QuaternionDecomposition::identity()),
        );
        assert_eq!(track.interpolation(), Interpolation::Spherical);
        assert!(track.is_mixed());
    }

    #[test]
    fn resolve_caches_first_inverse_in_both_modes() {
        let offset = Vec3::new(1.0, 2.0, 3.0);
        let mut linear = TransformTrack::new(2);
        linear.set(0, TransformRecord::Plain(AffineTransform::from_translation(offset)));
        let mut spherical = TransformTrack::new(2);
        spherical.set(
            0,
            TransformRecord::Decomposed(QuaternionDecomposition::identity().with_translation(offset)),
        );
        for track in [linear, spherical] {
            let motion = ResolvedMotion::resolve(&track);
            assert_eq!(motion.local_to_world.len(), 2);
            let back = motion.world_to_local0.transform_point(&offset);
            assert!(back.length() < 1e-6, "{:?}: {back:?}", motion.mode);
        }
    }

    #[test]
    fn arc_takes_shortest_path() {
        let q0 = Quat::identity();
        let q1 = Quat::from_axis_angle(Vec3::UNIT_Z, FRAC_PI_2).scale(-1.0);
        let arc = RotationArc::between(&q0, &q1);
        assert!((arc.angle - FRAC_PI_2).abs() < 1e-6);
        assert!((arc.axis.z() - 1.0).abs() < 1e-6);
    }
}
