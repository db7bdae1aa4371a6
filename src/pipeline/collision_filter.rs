use crate::dynamics::{JointSet, RigidBody, RigidBodyHandle};

#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[repr(C)]
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
/// A set of collision groups, as a bit mask.
pub struct Group(u32);

bitflags::bitflags! {
    impl Group: u32 {
        /// The group n°1.
        const GROUP_1 = 1 << 0;
        /// The group n°2.
        const GROUP_2 = 1 << 1;
        /// The group n°3.
        const GROUP_3 = 1 << 2;
        /// The group n°4.
        const GROUP_4 = 1 << 3;
        /// The group n°5.
        const GROUP_5 = 1 << 4;
        /// The group n°6.
        const GROUP_6 = 1 << 5;
        /// The group n°7.
        const GROUP_7 = 1 << 6;
        /// The group n°8.
        const GROUP_8 = 1 << 7;
        /// All the groups.
        const ALL = u32::MAX;
        /// None of the groups.
        const NONE = 0;
    }
}

impl Default for Group {
    fn default() -> Self {
        Group::ALL
    }
}

/// The category and mask bit masks of a rigid body.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct CollisionGroups {
    /// The groups this body is part of.
    pub memberships: Group,
    /// The groups this body accepts collisions with.
    pub filter: Group,
}

impl CollisionGroups {
    /// Creates collision groups from their memberships and filter.
    pub const fn new(memberships: Group, filter: Group) -> Self {
        Self {
            memberships,
            filter,
        }
    }

    /// Does any of the two bodies accept a collision with the other?
    ///
    /// Collisions are rejected only if both directions fail.
    #[inline]
    pub fn test(self, other: Self) -> bool {
        self.memberships.intersects(other.filter) || other.memberships.intersects(self.filter)
    }
}

/// Decides if two rigid bodies may collide.
///
/// It is queried once for each new pair of bodies with overlapping AABBs, before any contact
/// storage is allocated for them.
pub trait CollisionFilter: Send + Sync {
    /// Can the bodies `body1` and `body2` collide?
    fn can_collide(
        &self,
        handle1: RigidBodyHandle,
        body1: &RigidBody,
        handle2: RigidBodyHandle,
        body2: &RigidBody,
        joints: &JointSet,
    ) -> bool;
}

/// The collision filter used unless another one is set.
///
/// Rejects a pair if it involves the same body twice, if both bodies have a zero inverse mass,
/// if their collision groups reject each other, or if they are attached by a joint that
/// disables their collisions.
#[derive(Copy, Clone, Debug, Default)]
pub struct DefaultCollisionFilter;

impl CollisionFilter for DefaultCollisionFilter {
    fn can_collide(
        &self,
        handle1: RigidBodyHandle,
        body1: &RigidBody,
        handle2: RigidBodyHandle,
        body2: &RigidBody,
        joints: &JointSet,
    ) -> bool {
        handle1 != handle2
            && (body1.inv_mass() != 0.0 || body2.inv_mass() != 0.0)
            && body1.collision_groups().test(body2.collision_groups())
            && !joints.prevents_collision(handle1, handle2)
    }
}

#[cfg(test)]
mod test {
    use super::{CollisionFilter, CollisionGroups, DefaultCollisionFilter, Group};
    use crate::dynamics::{BallSocketJoint, JointSet, RigidBody, RigidBodyHandle};
    use crate::math::Point;
    use crate::shape::Ball;
    use std::sync::Arc;

    #[test]
    fn groups_reject_only_if_both_directions_fail() {
        let a = CollisionGroups::new(Group::GROUP_1, Group::GROUP_2);
        let b = CollisionGroups::new(Group::GROUP_2, Group::GROUP_3);
        let c = CollisionGroups::new(Group::GROUP_3, Group::GROUP_3);

        assert!(a.test(b));
        assert!(b.test(a));
        assert!(!a.test(c));
        assert!(CollisionGroups::default().test(a));
    }

    #[test]
    fn default_filter() {
        let ball = Arc::new(Ball::new(0.5));
        let dynamic = RigidBody::dynamic(ball.clone(), 1.0);
        let fixed = RigidBody::fixed(ball);
        let (h1, h2, h3) = (RigidBodyHandle(0), RigidBodyHandle(1), RigidBodyHandle(2));
        let mut joints = JointSet::new();
        let filter = DefaultCollisionFilter;

        assert!(!filter.can_collide(h1, &dynamic, h1, &dynamic, &joints));
        assert!(!filter.can_collide(h1, &fixed, h2, &fixed, &joints));
        assert!(filter.can_collide(h1, &dynamic, h2, &fixed, &joints));
        assert!(filter.can_collide(h1, &dynamic, h3, &dynamic, &joints));

        let _ = joints.insert(BallSocketJoint::new(h1, h3, Point::origin(), Point::origin()));
        assert!(!filter.can_collide(h3, &dynamic, h1, &dynamic, &joints));

        let _ = joints.insert(
            BallSocketJoint::new(h1, h2, Point::origin(), Point::origin()).collide_connected(true),
        );
        assert!(filter.can_collide(h1, &dynamic, h2, &fixed, &joints));
    }
}
