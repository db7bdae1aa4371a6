use crate::bounding_volume::{Aabb, BoundingVolume};
use crate::dynamics::{RigidBody, RigidBodyHandle, RigidBodySet};
use crate::math::Real;
use crate::parallel::{WorkerPool, WorkerPoolError};
use crate::partitioning::{Bvh, LeafUpdatePredicate, NO_NODE};
use crate::pipeline::pair_id;
use crate::query::{Ray, RayIntersection};
use crate::utils::hashmap::{HashMap, HashSet};
use std::sync::Arc;

/// The broad-phase: a dynamic BVH of the enlarged AABBs of every rigid body.
///
/// Each leaf holds the AABB of its body enlarged by a margin, so that a body moving by less
/// than this margin doesn’t need its leaf updated.
#[derive(Clone, Debug)]
pub struct BroadPhase {
    tree: Bvh<RigidBodyHandle>,
    margin: Real,
    cutoff_depth: usize,
}

/// The AABB of a leaf whose body has the AABB `tight`, or `None` if `current` is still
/// large enough.
#[inline]
fn refit_leaf(tight: &Aabb, current: &Aabb, margin: Real) -> Option<Aabb> {
    if current.contains(tight) {
        None
    } else {
        Some(tight.loosened(margin))
    }
}

impl BroadPhase {
    /// An empty broad-phase enlarging AABBs by `margin`, split at `cutoff_depth` for its
    /// parallel refit.
    pub fn new(margin: Real, cutoff_depth: usize) -> Self {
        Self {
            tree: Bvh::new(),
            margin,
            cutoff_depth,
        }
    }

    /// The underlying tree.
    #[inline]
    pub fn tree(&self) -> &Bvh<RigidBodyHandle> {
        &self.tree
    }

    /// Adds a leaf for `body`.
    pub fn insert(&mut self, handle: RigidBodyHandle, body: &mut RigidBody) {
        assert_eq!(body.proxy, NO_NODE, "This body is already in the broad-phase.");
        body.proxy = self.tree.insert(body.aabb().loosened(self.margin), handle);
    }

    /// Removes the leaf of `body`, if it has one.
    pub fn remove(&mut self, body: &mut RigidBody) {
        if body.proxy != NO_NODE {
            let _ = self.tree.remove(body.proxy);
            body.proxy = NO_NODE;
        }
    }

    /// Updates the leaves of the bodies that moved out of their enlarged AABB.
    ///
    /// If a worker pool is given, the tree is refitted in parallel. Returns the number of
    /// updated leaves.
    pub fn update(
        &mut self,
        bodies: &RigidBodySet,
        pool: Option<&mut WorkerPool>,
    ) -> Result<usize, WorkerPoolError> {
        let margin = self.margin;

        match pool {
            Some(pool) => {
                let tight: HashMap<RigidBodyHandle, Aabb> = bodies
                    .iter()
                    .map(|(handle, body)| (handle, *body.aabb()))
                    .collect();
                let tight = Arc::new(tight);
                let moved: LeafUpdatePredicate<RigidBodyHandle> =
                    Arc::new(move |handle: &RigidBodyHandle, current: &Aabb| {
                        tight
                            .get(handle)
                            .and_then(|aabb| refit_leaf(aabb, current, margin))
                    });
                self.tree
                    .par_update_leaves(pool, self.cutoff_depth, moved)
            }
            None => Ok(self.tree.update_leaves(|handle, current| {
                bodies
                    .get(*handle)
                    .and_then(|body| refit_leaf(body.aabb(), current, margin))
            })),
        }
    }

    /// Do the leaves of two bodies overlap?
    pub fn overlaps(&self, body1: &RigidBody, body2: &RigidBody) -> bool {
        body1.proxy != NO_NODE
            && body2.proxy != NO_NODE
            && self
                .tree
                .node_aabb(body1.proxy)
                .intersects(self.tree.node_aabb(body2.proxy))
    }

    /// Collects every pair of bodies with overlapping leaves where at least one body is
    /// awake and not fixed.
    ///
    /// Each pair is reported once, in a deterministic order.
    pub fn find_pairs(
        &self,
        bodies: &RigidBodySet,
        out: &mut Vec<(RigidBodyHandle, RigidBodyHandle)>,
    ) {
        let mut seen = HashSet::default();

        for (handle, body) in bodies.iter_active() {
            if body.proxy == NO_NODE {
                continue;
            }

            self.tree
                .box_query(self.tree.node_aabb(body.proxy), |_, other| {
                    if *other != handle && seen.insert(pair_id(handle, *other)) {
                        out.push((handle, *other));
                    }
                });
        }
    }

    /// Casts a ray on the shapes of the bodies, returning the closest one hit.
    pub fn cast_ray(
        &self,
        bodies: &RigidBodySet,
        ray: &Ray,
        max_toi: Real,
    ) -> Option<(RigidBodyHandle, RayIntersection)> {
        let mut best = None;

        let _ = self.tree.cast_ray(ray, max_toi, |_, handle, best_toi| {
            let body = bodies.get(*handle)?;
            let hit = body
                .shape()
                .cast_ray(body.position(), ray, best_toi, true)?;
            best = Some((*handle, hit));
            Some(hit.time_of_impact)
        });

        best
    }
}
