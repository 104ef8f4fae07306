// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! The instanced object as seen from an instance: a source of per-timestep
//! bounds in its local space.

use crate::types::aabb::Aabb;

/// An already-built acceleration structure that instances reference.
///
/// Only its bounds are consulted here; intersection lives elsewhere.
/// Instances hold it through an `Arc` and never destroy it.
pub trait InstancedObject: Send + Sync {
    /// Local-space bounds at timestep `itime`.
    fn bounds_at_timestep(&self, itime: usize) -> Aabb;
}

/// A static object: the same bounds at every timestep.
impl InstancedObject for Aabb {
    fn bounds_at_timestep(&self, _itime: usize) -> Aabb {
        *self
    }
}

/// Object described by one box per timestep.
///
/// Queries past the last box return the last box; an empty list yields
/// [`Aabb::empty`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct KeyframedBounds {
    frames: Vec<Aabb>,
}

impl KeyframedBounds {
    /// Wraps per-timestep boxes.
    pub fn new(frames: Vec<Aabb>) -> Self {
        Self { frames }
    }

    /// The stored boxes.
    pub fn frames(&self) -> &[Aabb] {
        &self.frames
    }
}

impl InstancedObject for KeyframedBounds {
    fn bounds_at_timestep(&self, itime: usize) -> Aabb {
        self.frames
            .get(itime)
            .or_else(|| self.frames.last())
            .copied()
            .unwrap_or_else(Aabb::empty)
    }
}
