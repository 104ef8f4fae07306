// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Minimal geometry registry: owns attached instances by id and runs the
//! producers over all of them.

use tracing::{info, warn};

use crate::build::primref::{PrimInfo, PrimInfoMB, PrimRef, PrimRefMB};
use crate::error::GeometryError;
use crate::ident::GeomId;
use crate::instance::{GeometryCounts, Instance};
use crate::temporal::time_range::TimeRange;

/// Attached instances, addressed by [`GeomId`]. Detached ids are reused.
#[derive(Debug, Default)]
pub struct Scene {
    slots: Vec<Option<Instance>>,
}

impl Scene {
    /// An empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes ownership of `instance` and assigns it the lowest free id.
    pub fn attach(&mut self, mut instance: Instance) -> Result<GeomId, GeometryError> {
        if let Some(existing) = instance.geom_id() {
            return Err(GeometryError::AlreadyAttached(existing));
        }
        let index = self
            .slots
            .iter()
            .position(Option::is_none)
            .unwrap_or(self.slots.len());
        let id = GeomId(u32::try_from(index).map_err(|_| GeometryError::TooManyGeometries)?);
        instance.attach(id)?;
        if index == self.slots.len() {
            self.slots.push(Some(instance));
        } else {
            self.slots[index] = Some(instance);
        }
        Ok(id)
    }

    /// Removes the instance; it comes back detached and without its object
    /// handle.
    pub fn detach(&mut self, id: GeomId) -> Result<Instance, GeometryError> {
        let mut instance = self
            .slots
            .get_mut(id.0 as usize)
            .and_then(Option::take)
            .ok_or(GeometryError::UnknownGeometry(id))?;
        instance.detach();
        Ok(instance)
    }

    /// Instance attached under `id`.
    pub fn get(&self, id: GeomId) -> Option<&Instance> {
        self.slots.get(id.0 as usize).and_then(Option::as_ref)
    }

    /// Mutable instance attached under `id`.
    pub fn get_mut(&mut self, id: GeomId) -> Option<&mut Instance> {
        self.slots.get_mut(id.0 as usize).and_then(Option::as_mut)
    }

    /// Attached instances in id order.
    pub fn iter(&self) -> impl Iterator<Item = (GeomId, &Instance)> + '_ {
        self.slots.iter().filter_map(|slot| {
            let inst = slot.as_ref()?;
            Some((inst.geom_id()?, inst))
        })
    }

    /// Number of attached instances.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Returns `true` when nothing is attached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Commits every attached instance. Nothing is committed when any
    /// instance has no object.
    pub fn commit(&mut self) -> Result<(), GeometryError> {
        if let Some((id, _)) = self.iter().find(|(_, inst)| inst.instanced_object().is_none()) {
            warn!(%id, "scene commit rejected: instance has no object");
            return Err(GeometryError::MissingObject);
        }
        for instance in self.slots.iter_mut().flatten() {
            instance.commit()?;
        }
        let counts = self.counts();
        info!(
            instances = counts.instances,
            mb_instances = counts.mb_instances,
            "scene committed"
        );
        Ok(())
    }

    /// Aggregate geometry counts.
    pub fn counts(&self) -> GeometryCounts {
        let mut counts = GeometryCounts::default();
        for (_, instance) in self.iter() {
            instance.add_elements_to_count(&mut counts);
        }
        counts
    }

    /// Static references for every valid instance.
    pub fn create_prim_ref_array(&self) -> (Vec<PrimRef>, PrimInfo) {
        let mut prims = vec![PrimRef::default(); self.len()];
        let mut k = 0;
        let mut info = PrimInfo::empty();
        for (id, instance) in self.iter() {
            info.merge(&instance.create_prim_ref_array(&mut prims, 0..1, &mut k, id));
        }
        prims.truncate(k);
        (prims, info)
    }

    /// Per-segment references for segment `itime` of every valid instance
    /// that has such a segment.
    pub fn create_prim_ref_array_mb(&self, itime: usize) -> (Vec<PrimRef>, PrimInfo) {
        let mut prims = vec![PrimRef::default(); self.len()];
        let mut k = 0;
        let mut info = PrimInfo::empty();
        for (id, instance) in self.iter() {
            if itime < instance.num_time_segments() {
                info.merge(&instance.create_prim_ref_array_mb(&mut prims, itime, 0..1, &mut k, id));
            }
        }
        prims.truncate(k);
        (prims, info)
    }

    /// Time-range references over `t0t1` for every valid instance.
    pub fn create_prim_ref_mb_array(&self, t0t1: &TimeRange) -> (Vec<PrimRefMB>, PrimInfoMB) {
        let mut prims = vec![PrimRefMB::default(); self.len()];
        let mut k = 0;
        let mut info = PrimInfoMB::empty();
        for (id, instance) in self.iter() {
            info.merge(&instance.create_prim_ref_mb_array(&mut prims, t0t1, 0..1, &mut k, id));
        }
        prims.truncate(k);
        (prims, info)
    }
}
