use crate::dynamics::{JointSet, RigidBodyHandle, RigidBodySet};
use crate::math::Real;
use crate::pipeline::CollisionFilter;
use crate::query::ContactManifold;
use crate::shape::TriangleRef;
use crate::utils::hashmap::HashMap;
use crate::utils::SortedPair;

/// Two bodies with overlapping broad-phase AABBs, and their contact points.
#[derive(Clone, Debug)]
pub struct ContactPair {
    /// The body with the smallest handle.
    pub body1: RigidBodyHandle,
    /// The body with the largest handle.
    pub body2: RigidBodyHandle,
    /// The contact points between both bodies, with a normal pointing from `body1` to `body2`.
    pub manifold: ContactManifold,
    /// The combined friction coefficient of both bodies.
    pub friction: Real,
}

impl ContactPair {
    /// The symmetric 64-bit identifier of this pair.
    #[inline]
    pub fn id(&self) -> u64 {
        pair_id(self.body1, self.body2)
    }
}

/// The contact points between a body and a static triangle.
#[derive(Clone, Debug)]
pub struct MeshContact {
    /// The body touching the triangle.
    pub body: RigidBodyHandle,
    /// The triangle touched.
    pub triangle: TriangleRef,
    /// The contact points, with a normal pointing from the body to the triangle.
    pub manifold: ContactManifold,
    /// The combined friction coefficient of the body and the static mesh.
    pub friction: Real,
}

/// The identifier of the pair formed by two bodies, regardless of their order.
#[inline]
pub fn pair_id(body1: RigidBodyHandle, body2: RigidBodyHandle) -> u64 {
    SortedPair::new(body1.0, body2.0).packed()
}

/// The friction of a contact between two materials.
#[inline]
pub fn combine_friction(friction1: Real, friction2: Real) -> Real {
    (friction1 + friction2) * 0.5
}

/// The set of body pairs reported by the broad-phase.
///
/// Pairs are stored contiguously so the solver can borrow them as a slice. Removed pairs give
/// their manifold back to a pool keyed by manifold capacity, so that pairs created later reuse
/// its storage.
#[derive(Clone, Debug, Default)]
pub struct PairManager {
    pairs: Vec<ContactPair>,
    index: HashMap<u64, usize>,
    pool: HashMap<usize, Vec<ContactManifold>>,
    num_created: usize,
    num_removed: usize,
}

impl PairManager {
    /// An empty set of pairs.
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of pairs.
    #[inline]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Is this set empty?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// All the pairs.
    #[inline]
    pub fn pairs(&self) -> &[ContactPair] {
        &self.pairs
    }

    /// All the pairs, mutably.
    #[inline]
    pub fn pairs_mut(&mut self) -> &mut [ContactPair] {
        &mut self.pairs
    }

    /// The pair formed by two bodies, in any order.
    pub fn get(&self, body1: RigidBodyHandle, body2: RigidBodyHandle) -> Option<&ContactPair> {
        self.index
            .get(&pair_id(body1, body2))
            .map(|i| &self.pairs[*i])
    }

    /// Does a pair exist between the two bodies?
    #[inline]
    pub fn contains(&self, body1: RigidBodyHandle, body2: RigidBodyHandle) -> bool {
        self.index.contains_key(&pair_id(body1, body2))
    }

    /// The number of idle manifolds of the given capacity waiting in the pool.
    pub fn pooled_manifolds(&self, capacity: usize) -> usize {
        self.pool.get(&capacity).map(Vec::len).unwrap_or(0)
    }

    /// Returns and resets the number of pairs created and removed since the last call.
    pub fn take_counters(&mut self) -> (usize, usize) {
        let counters = (self.num_created, self.num_removed);
        self.num_created = 0;
        self.num_removed = 0;
        counters
    }

    /// Creates the pair formed by two bodies, if `filter` lets them collide.
    ///
    /// Returns `true` if a pair was created. Nothing happens if the pair already exists.
    pub fn add_pair(
        &mut self,
        body1: RigidBodyHandle,
        body2: RigidBodyHandle,
        bodies: &mut RigidBodySet,
        filter: &dyn CollisionFilter,
        joints: &JointSet,
    ) -> bool {
        let id = pair_id(body1, body2);

        if self.index.contains_key(&id) {
            return false;
        }

        let (Some(rb1), Some(rb2)) = (bodies.get(body1), bodies.get(body2)) else {
            return false;
        };

        if !filter.can_collide(body1, rb1, body2, rb2, joints) {
            return false;
        }

        let capacity = rb1.shape().max_contacts().max(rb2.shape().max_contacts());
        let friction = combine_friction(rb1.friction(), rb2.friction());
        let manifold = self
            .pool
            .get_mut(&capacity)
            .and_then(Vec::pop)
            .unwrap_or_else(|| ContactManifold::with_capacity(capacity));
        let (body1, body2) = if body1 < body2 {
            (body1, body2)
        } else {
            (body2, body1)
        };

        let _ = self.index.insert(id, self.pairs.len());
        self.pairs.push(ContactPair {
            body1,
            body2,
            manifold,
            friction,
        });

        bodies[body1].active_collisions += 1;
        bodies[body2].active_collisions += 1;
        self.num_created += 1;
        true
    }

    /// Removes the pair with the given identifier, returning its manifold to the pool.
    ///
    /// Returns `true` if the pair existed.
    pub fn remove_pair(&mut self, id: u64, bodies: &mut RigidBodySet) -> bool {
        let Some(i) = self.index.remove(&id) else {
            return false;
        };

        let mut pair = self.pairs.swap_remove(i);
        if let Some(moved) = self.pairs.get(i) {
            let _ = self.index.insert(moved.id(), i);
        }

        for handle in [pair.body1, pair.body2] {
            if let Some(body) = bodies.get_mut(handle) {
                body.active_collisions = body.active_collisions.saturating_sub(1);
            }
        }

        pair.manifold.clear();
        self.pool
            .entry(pair.manifold.capacity())
            .or_default()
            .push(pair.manifold);
        self.num_removed += 1;
        true
    }

    /// Removes every pair involving `body`, returning the number of pairs removed.
    pub fn remove_pairs_of(&mut self, body: RigidBodyHandle, bodies: &mut RigidBodySet) -> usize {
        let ids: Vec<_> = self
            .pairs
            .iter()
            .filter(|p| p.body1 == body || p.body2 == body)
            .map(ContactPair::id)
            .collect();

        for id in &ids {
            let _ = self.remove_pair(*id, bodies);
        }

        ids.len()
    }

    /// Removes every pair for which `keep` returns `false`, returning the number of pairs
    /// removed.
    pub fn retain(
        &mut self,
        bodies: &mut RigidBodySet,
        mut keep: impl FnMut(&ContactPair) -> bool,
    ) -> usize {
        let ids: Vec<_> = self
            .pairs
            .iter()
            .filter(|p| !keep(p))
            .map(ContactPair::id)
            .collect();

        for id in &ids {
            let _ = self.remove_pair(*id, bodies);
        }

        ids.len()
    }
}

#[cfg(test)]
mod test {
    use super::{pair_id, PairManager};
    use crate::dynamics::{BallSocketJoint, JointSet, RigidBody, RigidBodyHandle, RigidBodySet};
    use crate::math::{Point, Vector};
    use crate::pipeline::DefaultCollisionFilter;
    use crate::shape::{Ball, Cuboid};
    use std::sync::Arc;

    fn bodies() -> (RigidBodySet, [RigidBodyHandle; 3]) {
        let mut bodies = RigidBodySet::new();
        let ball = Arc::new(Ball::new(0.5));
        let cube = Arc::new(Cuboid::new(Vector::repeat(0.5)));
        let h0 = bodies.insert(RigidBody::dynamic(ball.clone(), 1.0));
        let h1 = bodies.insert(RigidBody::dynamic(ball, 1.0));
        let h2 = bodies.insert(RigidBody::dynamic(cube, 1.0));
        (bodies, [h0, h1, h2])
    }

    #[test]
    fn pair_ids_are_symmetric() {
        let a = RigidBodyHandle(3);
        let b = RigidBodyHandle(11);
        assert_eq!(pair_id(a, b), pair_id(b, a));
        assert_ne!(pair_id(a, b), pair_id(a, RigidBodyHandle(12)));
    }

    #[test]
    fn add_and_remove_pairs() {
        let (mut bodies, [h0, h1, h2]) = bodies();
        let joints = JointSet::new();
        let mut pairs = PairManager::new();

        assert!(pairs.add_pair(h1, h0, &mut bodies, &DefaultCollisionFilter, &joints));
        assert!(!pairs.add_pair(h0, h1, &mut bodies, &DefaultCollisionFilter, &joints));
        assert!(pairs.add_pair(h2, h0, &mut bodies, &DefaultCollisionFilter, &joints));
        assert_eq!(pairs.len(), 2);
        assert_eq!(bodies[h0].active_collisions(), 2);
        assert_eq!(bodies[h1].active_collisions(), 1);

        let pair = pairs.get(h1, h0).unwrap();
        assert_eq!((pair.body1, pair.body2), (h0, h1));
        assert_eq!(pair.manifold.capacity(), 1);
        assert_eq!(pairs.get(h0, h2).unwrap().manifold.capacity(), 4);

        assert!(pairs.remove_pair(pair_id(h0, h1), &mut bodies));
        assert!(!pairs.remove_pair(pair_id(h0, h1), &mut bodies));
        assert_eq!(bodies[h0].active_collisions(), 1);
        assert_eq!(bodies[h1].active_collisions(), 0);
        assert!(pairs.contains(h2, h0));
        assert_eq!(pairs.take_counters(), (2, 1));
        assert_eq!(pairs.take_counters(), (0, 0));
    }

    #[test]
    fn manifolds_are_pooled_by_capacity() {
        let (mut bodies, [h0, h1, h2]) = bodies();
        let joints = JointSet::new();
        let mut pairs = PairManager::new();

        let _ = pairs.add_pair(h0, h1, &mut bodies, &DefaultCollisionFilter, &joints);
        let _ = pairs.add_pair(h0, h2, &mut bodies, &DefaultCollisionFilter, &joints);
        assert_eq!(pairs.remove_pairs_of(h0, &mut bodies), 2);
        assert!(pairs.is_empty());
        assert_eq!(pairs.pooled_manifolds(1), 1);
        assert_eq!(pairs.pooled_manifolds(4), 1);

        let _ = pairs.add_pair(h1, h2, &mut bodies, &DefaultCollisionFilter, &joints);
        assert_eq!(pairs.pooled_manifolds(4), 0);
        assert_eq!(pairs.pooled_manifolds(1), 1);
    }

    #[test]
    fn filtered_pairs_are_not_created() {
        let (mut bodies, [h0, h1, _]) = bodies();
        let mut joints = JointSet::new();
        let _ = joints.insert(BallSocketJoint::new(
            h0,
            h1,
            Point::origin(),
            Point::origin(),
        ));
        let mut pairs = PairManager::new();

        assert!(!pairs.add_pair(h0, h1, &mut bodies, &DefaultCollisionFilter, &joints));
        assert!(!pairs.add_pair(h0, h0, &mut bodies, &DefaultCollisionFilter, &joints));
        assert_eq!(bodies[h0].active_collisions(), 0);
    }

    #[test]
    fn swap_removal_keeps_the_index_consistent() {
        let (mut bodies, [h0, h1, h2]) = bodies();
        let joints = JointSet::new();
        let mut pairs = PairManager::new();

        let _ = pairs.add_pair(h0, h1, &mut bodies, &DefaultCollisionFilter, &joints);
        let _ = pairs.add_pair(h0, h2, &mut bodies, &DefaultCollisionFilter, &joints);
        let _ = pairs.add_pair(h1, h2, &mut bodies, &DefaultCollisionFilter, &joints);

        assert_eq!(pairs.retain(&mut bodies, |p| p.body1 != h0 || p.body2 != h1), 1);
        for pair in pairs.pairs() {
            assert_eq!(pairs.get(pair.body1, pair.body2).unwrap().id(), pair.id());
        }
        assert_eq!(pairs.len(), 2);
    }
}
