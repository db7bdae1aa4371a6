use super::bvh_tree::{BvhNode, BvhNodeId, BvhNodeKind, NO_NODE};
use crate::bounding_volume::{Aabb, BoundingVolume};
use crate::partitioning::Bvh;
use crate::utils::CostEntry;
use std::collections::BinaryHeap;

impl<T: Copy> Bvh<T> {
    /// Inserts a new leaf bounded by `aabb` and carrying `data`.
    ///
    /// Returns the id of the new leaf, valid until it is removed.
    pub fn insert(&mut self, aabb: Aabb, data: T) -> BvhNodeId {
        let leaf = self.allocate(BvhNode {
            aabb,
            parent: NO_NODE,
            kind: BvhNodeKind::Leaf(data),
        });
        self.leaf_count += 1;
        let root = self.root;
        self.link_leaf(leaf, root);
        self.debug_assert_well_formed();
        leaf
    }

    /// Links the detached leaf `leaf` into the tree, searching for its sibling in the subtree
    /// rooted at `start`.
    pub(super) fn link_leaf(&mut self, leaf: BvhNodeId, start: BvhNodeId) {
        if self.root == NO_NODE {
            self.root = leaf;
            self.nodes[leaf as usize].parent = NO_NODE;
            return;
        }

        let leaf_aabb = self.nodes[leaf as usize].aabb;
        let sibling = self.pick_best_sibling(&leaf_aabb, start);
        let old_parent = self.nodes[sibling as usize].parent;
        let new_parent_aabb = self.nodes[sibling as usize].aabb.merged(&leaf_aabb);
        let new_parent = self.allocate(BvhNode {
            aabb: new_parent_aabb,
            parent: old_parent,
            kind: BvhNodeKind::Interior([sibling, leaf]),
        });

        self.replace_child(old_parent, sibling, new_parent);
        self.nodes[sibling as usize].parent = new_parent;
        self.nodes[leaf as usize].parent = new_parent;
        self.refit_parents(leaf);
    }

    /// Finds the node of the subtree rooted at `start` that, once paired with a new leaf
    /// bounded by `leaf_aabb`, increases the least the total surface area of the tree.
    ///
    /// This is a best-first branch-and-bound search: the cost of choosing a node as sibling is
    /// the area of its union with the new leaf plus the area growth it induces on its
    /// ancestors. The children of a node are only explored if the lowest cost they could
    /// possibly achieve is smaller than the best cost found so far.
    pub(super) fn pick_best_sibling(&self, leaf_aabb: &Aabb, start: BvhNodeId) -> BvhNodeId {
        let leaf_area = leaf_aabb.surface_area();
        let mut best = start;
        let mut best_cost = self.nodes[start as usize]
            .aabb
            .merged(leaf_aabb)
            .surface_area();
        let mut queue = BinaryHeap::new();
        queue.push(CostEntry::new((start, 0.0), 0.0));

        while let Some(entry) = queue.pop() {
            let (id, inherited_cost) = entry.item;

            // The queue is ordered by lower bound: nothing left can improve the best cost.
            if entry.cost >= best_cost {
                break;
            }

            let node = &self.nodes[id as usize];
            let direct_cost = node.aabb.merged(leaf_aabb).surface_area();
            let cost = direct_cost + inherited_cost;

            if cost < best_cost {
                best_cost = cost;
                best = id;
            }

            if let Some(children) = node.children() {
                let child_inherited_cost = inherited_cost + direct_cost - node.aabb.surface_area();
                let lower_bound = leaf_area + child_inherited_cost;

                if lower_bound < best_cost {
                    for child in children {
                        queue.push(CostEntry::new(
                            (child, child_inherited_cost),
                            lower_bound,
                        ));
                    }
                }
            }
        }

        best
    }
}
