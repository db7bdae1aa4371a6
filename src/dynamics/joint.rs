use crate::dynamics::RigidBodyHandle;
use crate::math::{Point, Real};
use crate::utils::hashmap::HashMap;
use crate::utils::SortedPair;
use slab::Slab;

/// The handle of a joint inserted into a [`JointSet`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct JointHandle(pub u32);

/// A joint attaching a point of one body to a point of another body, leaving their relative
/// rotation free.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct BallSocketJoint {
    /// The first attached body.
    pub body1: RigidBodyHandle,
    /// The second attached body.
    pub body2: RigidBodyHandle,
    /// The attachment point, in the local frame of the first body.
    pub anchor1: Point<Real>,
    /// The attachment point, in the local frame of the second body.
    pub anchor2: Point<Real>,
    /// Can the two attached bodies collide with each other?
    pub collide_connected: bool,
}

impl BallSocketJoint {
    /// A joint between `body1` and `body2`. Collisions between them are disabled.
    pub fn new(
        body1: RigidBodyHandle,
        body2: RigidBodyHandle,
        anchor1: Point<Real>,
        anchor2: Point<Real>,
    ) -> Self {
        Self {
            body1,
            body2,
            anchor1,
            anchor2,
            collide_connected: false,
        }
    }

    /// Enables or disables the collisions between the two attached bodies.
    #[must_use]
    pub fn collide_connected(mut self, enabled: bool) -> Self {
        self.collide_connected = enabled;
        self
    }
}

/// A set of joints.
#[derive(Clone, Debug, Default)]
pub struct JointSet {
    joints: Slab<BallSocketJoint>,
    /// For each pair of bodies, the number of joints between them disabling their collisions.
    non_colliding: HashMap<u64, u32>,
}

impl JointSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    fn pair_key(body1: RigidBodyHandle, body2: RigidBodyHandle) -> u64 {
        SortedPair::new(body1.0, body2.0).packed()
    }

    /// Adds a joint to this set.
    pub fn insert(&mut self, joint: BallSocketJoint) -> JointHandle {
        if !joint.collide_connected {
            *self
                .non_colliding
                .entry(Self::pair_key(joint.body1, joint.body2))
                .or_insert(0) += 1;
        }

        JointHandle(self.joints.insert(joint) as u32)
    }

    /// Removes a joint from this set.
    pub fn remove(&mut self, handle: JointHandle) -> Option<BallSocketJoint> {
        let joint = self.joints.try_remove(handle.0 as usize)?;

        if !joint.collide_connected {
            let key = Self::pair_key(joint.body1, joint.body2);
            if let Some(count) = self.non_colliding.get_mut(&key) {
                *count -= 1;
                if *count == 0 {
                    let _ = self.non_colliding.remove(&key);
                }
            }
        }

        Some(joint)
    }

    /// Removes every joint attached to `body`, returning how many were removed.
    pub fn remove_attached(&mut self, body: RigidBodyHandle) -> usize {
        let attached: Vec<_> = self
            .joints
            .iter()
            .filter(|(_, j)| j.body1 == body || j.body2 == body)
            .map(|(i, _)| JointHandle(i as u32))
            .collect();

        for handle in &attached {
            let _ = self.remove(*handle);
        }

        attached.len()
    }

    /// The joint with the given handle.
    #[inline]
    pub fn get(&self, handle: JointHandle) -> Option<&BallSocketJoint> {
        self.joints.get(handle.0 as usize)
    }

    /// The number of joints in this set.
    #[inline]
    pub fn len(&self) -> usize {
        self.joints.len()
    }

    /// Is this set empty?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    /// Iterates through all the joints of this set.
    pub fn iter(&self) -> impl Iterator<Item = (JointHandle, &BallSocketJoint)> {
        self.joints
            .iter()
            .map(|(i, joint)| (JointHandle(i as u32), joint))
    }

    /// Is there a joint between `body1` and `body2` disabling their collisions?
    #[inline]
    pub fn prevents_collision(&self, body1: RigidBodyHandle, body2: RigidBodyHandle) -> bool {
        self.non_colliding
            .contains_key(&Self::pair_key(body1, body2))
    }
}
