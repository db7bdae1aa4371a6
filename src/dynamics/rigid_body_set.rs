use crate::dynamics::{RigidBody, RigidBodyHandle};
use slab::Slab;
use std::ops::{Index, IndexMut};

/// A set of rigid bodies, addressed by handle.
///
/// Handles of removed bodies are recycled by later insertions.
#[derive(Clone, Debug, Default)]
pub struct RigidBodySet {
    bodies: Slab<RigidBody>,
}

impl RigidBodySet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of bodies in this set.
    #[inline]
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// Is this set empty?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Adds a body to this set.
    pub fn insert(&mut self, body: RigidBody) -> RigidBodyHandle {
        RigidBodyHandle(self.bodies.insert(body) as u32)
    }

    /// Removes a body from this set.
    pub fn remove(&mut self, handle: RigidBodyHandle) -> Option<RigidBody> {
        self.bodies.try_remove(handle.0 as usize)
    }

    /// Does this set contain a body with the given handle?
    #[inline]
    pub fn contains(&self, handle: RigidBodyHandle) -> bool {
        self.bodies.contains(handle.0 as usize)
    }

    /// The body with the given handle.
    #[inline]
    pub fn get(&self, handle: RigidBodyHandle) -> Option<&RigidBody> {
        self.bodies.get(handle.0 as usize)
    }

    /// The body with the given handle.
    #[inline]
    pub fn get_mut(&mut self, handle: RigidBodyHandle) -> Option<&mut RigidBody> {
        self.bodies.get_mut(handle.0 as usize)
    }

    /// Two distinct bodies, borrowed mutably at the same time.
    ///
    /// Returns `None` if any of them does not exist, or if both handles are equal.
    #[inline]
    pub fn get_pair_mut(
        &mut self,
        handle1: RigidBodyHandle,
        handle2: RigidBodyHandle,
    ) -> Option<(&mut RigidBody, &mut RigidBody)> {
        self.bodies.get2_mut(handle1.0 as usize, handle2.0 as usize)
    }

    /// Iterates through all the bodies of this set.
    pub fn iter(&self) -> impl Iterator<Item = (RigidBodyHandle, &RigidBody)> {
        self.bodies
            .iter()
            .map(|(i, body)| (RigidBodyHandle(i as u32), body))
    }

    /// Iterates mutably through all the bodies of this set.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (RigidBodyHandle, &mut RigidBody)> {
        self.bodies
            .iter_mut()
            .map(|(i, body)| (RigidBodyHandle(i as u32), body))
    }

    /// Iterates through the bodies of this set that are neither fixed nor sleeping.
    pub fn iter_active(&self) -> impl Iterator<Item = (RigidBodyHandle, &RigidBody)> {
        self.iter()
            .filter(|(_, body)| !body.is_fixed() && !body.is_sleeping())
    }
}

impl Index<RigidBodyHandle> for RigidBodySet {
    type Output = RigidBody;

    fn index(&self, handle: RigidBodyHandle) -> &RigidBody {
        &self.bodies[handle.0 as usize]
    }
}

impl IndexMut<RigidBodyHandle> for RigidBodySet {
    fn index_mut(&mut self, handle: RigidBodyHandle) -> &mut RigidBody {
        &mut self.bodies[handle.0 as usize]
    }
}
