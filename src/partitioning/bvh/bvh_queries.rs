use super::bvh_tree::{BvhNodeId, BvhNodeKind};
use crate::bounding_volume::{Aabb, BoundingVolume};
use crate::math::Real;
use crate::partitioning::Bvh;
use crate::query::Ray;
use crate::utils::CostEntry;
use smallvec::SmallVec;
use std::collections::BinaryHeap;

impl<T> Bvh<T> {
    /// Calls `f` on every leaf whose AABB intersects `aabb`.
    ///
    /// Subtrees whose AABB does not intersect `aabb` are pruned.
    pub fn box_query(&self, aabb: &Aabb, mut f: impl FnMut(BvhNodeId, &T)) {
        let Some(root) = self.root() else {
            return;
        };

        let mut stack: SmallVec<[BvhNodeId; 32]> = SmallVec::new();
        stack.push(root);

        while let Some(id) = stack.pop() {
            let node = &self.nodes[id as usize];

            if !node.aabb.intersects(aabb) {
                continue;
            }

            match &node.kind {
                BvhNodeKind::Leaf(data) => f(id, data),
                BvhNodeKind::Interior(children) => stack.extend_from_slice(children),
                BvhNodeKind::Free => unreachable!("Free BVH node {} reachable from the root.", id),
            }
        }
    }

    /// Collects the data of every leaf whose AABB intersects `aabb` into `out`.
    pub fn intersect_aabb(&self, aabb: &Aabb, out: &mut Vec<T>)
    where
        T: Copy,
    {
        self.box_query(aabb, |_, data| out.push(*data));
    }

    /// Casts a ray on this tree, returning the closest leaf accepted by `leaf_test`.
    ///
    /// Nodes are visited in increasing order of the time of impact of the ray with their AABB,
    /// and the traversal stops as soon as no remaining node can contain a closer hit.
    /// `leaf_test` is given a leaf and the current best time of impact, and returns the time
    /// of impact of the ray with the leaf's actual geometry, if any.
    pub fn cast_ray(
        &self,
        ray: &Ray,
        max_toi: Real,
        mut leaf_test: impl FnMut(BvhNodeId, &T, Real) -> Option<Real>,
    ) -> Option<(BvhNodeId, Real)> {
        let root = self.root()?;
        let mut best = None;
        let mut best_toi = max_toi;
        let mut queue = BinaryHeap::new();

        if let Some(toi) = self.nodes[root as usize].aabb.cast_local_ray(ray, best_toi) {
            queue.push(CostEntry::new(root, toi));
        }

        while let Some(entry) = queue.pop() {
            if entry.cost > best_toi {
                break;
            }

            let id = entry.item;

            match &self.nodes[id as usize].kind {
                BvhNodeKind::Leaf(data) => {
                    if let Some(toi) = leaf_test(id, data, best_toi) {
                        if toi <= best_toi {
                            best_toi = toi;
                            best = Some((id, toi));
                        }
                    }
                }
                BvhNodeKind::Interior(children) => {
                    for child in children {
                        if let Some(toi) =
                            self.nodes[*child as usize].aabb.cast_local_ray(ray, best_toi)
                        {
                            queue.push(CostEntry::new(*child, toi));
                        }
                    }
                }
                BvhNodeKind::Free => unreachable!("Free BVH node {} reachable from the root.", id),
            }
        }

        best
    }
}
