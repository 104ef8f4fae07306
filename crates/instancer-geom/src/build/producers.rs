// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! The three record shapes an instance contributes to a build.
//!
//! Each producer validates first and emits at most one record (primitive
//! index 0) at `prims[*k]`, advancing `k`. Invalid instances emit nothing and
//! return an empty info.

use core::ops::Range;

use tracing::debug;

use super::primref::{PrimInfo, PrimInfoMB, PrimRef, PrimRefMB};
use crate::ident::GeomId;
use crate::instance::Instance;
use crate::temporal::time_range::TimeRange;
use crate::types::transform::Interpolation;

fn debug_assert_single_prim(range: &Range<usize>) {
    debug_assert!(
        range.start == 0 && range.end == 1,
        "instances hold exactly one primitive, got range {range:?}"
    );
}

fn emit<T>(prims: &mut [T], k: &mut usize, prim: T) -> bool {
    debug_assert!(*k < prims.len(), "primitive cursor {} past buffer of {}", *k, prims.len());
    match prims.get_mut(*k) {
        Some(slot) => {
            *slot = prim;
            *k += 1;
            true
        }
        None => false,
    }
}

impl Instance {
    /// Static producer: one reference bounding timestep 0.
    pub fn create_prim_ref_array(
        &self,
        prims: &mut [PrimRef],
        range: Range<usize>,
        k: &mut usize,
        geom_id: GeomId,
    ) -> PrimInfo {
        debug_assert_single_prim(&range);
        let mut info = PrimInfo::empty();
        if !self.timestep_is_valid(0) {
            debug!(%geom_id, "instance filtered: invalid at timestep 0");
            return info;
        }
        let prim = PrimRef::new(self.bounds_at(0), geom_id, 0);
        if emit(prims, k, prim) {
            info.add_center2(&prim);
        }
        info
    }

    /// Per-segment producer: one reference bounding segment `itime`.
    ///
    /// Linear motion over a constant object box uses the segment's end boxes.
    /// Spherical motion, or an object box that changes across the segment,
    /// uses the conservative interval bounds over the segment's time range.
    pub fn create_prim_ref_array_mb(
        &self,
        prims: &mut [PrimRef],
        itime: usize,
        range: Range<usize>,
        k: &mut usize,
        geom_id: GeomId,
    ) -> PrimInfo {
        debug_assert_single_prim(&range);
        let mut info = PrimInfo::empty();
        let last = (itime + 1).min(self.num_time_segments());
        if !self.is_valid(itime..=last) {
            debug!(%geom_id, itime, "instance filtered: invalid over segment");
            return info;
        }
        let swept = match self.interpolation() {
            Interpolation::Linear => self.object_bounds_vary(itime),
            Interpolation::Spherical => true,
        };
        let bounds = if swept {
            let span = TimeRange::new(self.time_of_step(itime), self.time_of_step(last));
            self.interval_bounds(&span).bounds()
        } else {
            self.segment_bounds(itime).bounds()
        };
        let prim = PrimRef::new(bounds, geom_id, 0);
        if emit(prims, k, prim) {
            info.add_center2(&prim);
        }
        info
    }

    /// Time-range producer: one envelope over `t0t1`.
    pub fn create_prim_ref_mb_array(
        &self,
        prims: &mut [PrimRefMB],
        t0t1: &TimeRange,
        range: Range<usize>,
        k: &mut usize,
        geom_id: GeomId,
    ) -> PrimInfoMB {
        debug_assert_single_prim(&range);
        let mut info = PrimInfoMB::empty();
        let (first, last) = self.time_segment_range(t0t1);
        if !self.is_valid(first..=last) {
            debug!(%geom_id, first, last, "instance filtered: invalid over time range");
            return info;
        }
        let prim = PrimRefMB {
            lbounds: self.interval_bounds(t0t1),
            active_time_segments: self.num_time_segments(),
            time_range: self.time_range(),
            total_time_segments: self.num_time_segments(),
            geom_id,
            prim_id: 0,
        };
        if emit(prims, k, prim) {
            info.add_primref(&prim);
        }
        info
    }
}
