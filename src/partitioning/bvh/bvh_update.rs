use super::bvh_tree::{BvhNodeId, BvhNodeKind, NO_NODE};
use crate::bounding_volume::{Aabb, BoundingVolume};
use crate::partitioning::Bvh;

impl<T: Copy> Bvh<T> {
    /// Removes the leaf `leaf` from this tree, returning its data.
    ///
    /// The sibling of the leaf takes the place of their common parent, which is freed.
    ///
    /// Panics if `leaf` is not a leaf of this tree.
    pub fn remove(&mut self, leaf: BvhNodeId) -> T {
        let data = self.expect_leaf(leaf);
        self.unlink_leaf(leaf);
        let _ = self.deallocate(leaf);
        self.leaf_count -= 1;
        self.debug_assert_well_formed();
        data
    }

    /// Sets the AABB of the leaf `leaf` to `aabb`, restructuring the tree if needed.
    ///
    /// If `aabb` is still contained by the parent of the leaf, only the leaf is modified.
    /// Otherwise the leaf is re-inserted, starting the sibling search from the closest ancestor
    /// containing `aabb` (or from the root if no ancestor contains it). The leaf id is preserved.
    ///
    /// Panics if `leaf` is not a leaf of this tree.
    pub fn update(&mut self, leaf: BvhNodeId, aabb: Aabb) {
        self.relink_moved_leaf(leaf, aabb);
        self.debug_assert_well_formed();
    }

    fn relink_moved_leaf(&mut self, leaf: BvhNodeId, aabb: Aabb) {
        let _ = self.expect_leaf(leaf);
        self.nodes[leaf as usize].aabb = aabb;

        let parent = self.nodes[leaf as usize].parent;
        if parent == NO_NODE || self.nodes[parent as usize].aabb.contains(&aabb) {
            return;
        }

        if !self.nodes[self.root as usize].aabb.contains(&aabb) {
            self.unlink_leaf(leaf);
            let root = self.root;
            self.link_leaf(leaf, root);
            return;
        }

        // The root contains `aabb` so this loop always ends on a valid node.
        let mut ancestor = self.nodes[parent as usize].parent;
        while !self.nodes[ancestor as usize].aabb.contains(&aabb) {
            ancestor = self.nodes[ancestor as usize].parent;
        }

        self.unlink_leaf(leaf);
        self.link_leaf(leaf, ancestor);
    }

    /// Detaches the leaf `leaf` from the tree without freeing it.
    ///
    /// Its parent is freed and replaced by its sibling.
    pub(super) fn unlink_leaf(&mut self, leaf: BvhNodeId) {
        let parent = self.nodes[leaf as usize].parent;

        if parent == NO_NODE {
            assert_eq!(
                self.root, leaf,
                "BVH node {} has no parent but isn’t the root.",
                leaf
            );
            self.root = NO_NODE;
            return;
        }

        let grand_parent = self.nodes[parent as usize].parent;
        let sibling = match self.nodes[parent as usize].kind {
            BvhNodeKind::Interior([a, b]) => {
                if a == leaf {
                    b
                } else {
                    a
                }
            }
            _ => panic!("The parent of the BVH node {} is not an interior node.", leaf),
        };

        self.replace_child(grand_parent, parent, sibling);
        let _ = self.deallocate(parent);
        self.nodes[leaf as usize].parent = NO_NODE;
        self.refit_parents(sibling);
    }

    fn expect_leaf(&self, id: BvhNodeId) -> T {
        match self.nodes.get(id as usize).map(|node| &node.kind) {
            Some(BvhNodeKind::Leaf(data)) => *data,
            _ => panic!("Attempted to modify the BVH node {} which is not a leaf.", id),
        }
    }
}
