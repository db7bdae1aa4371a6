use super::bvh_tree::{BvhNodeId, BvhNodeKind, NO_NODE};
use crate::bounding_volume::BoundingVolume;
use crate::partitioning::Bvh;

impl<T> Bvh<T> {
    /// Runs [`Bvh::assert_well_formed`] in debug test builds, after structural mutations.
    #[inline]
    pub(super) fn debug_assert_well_formed(&self) {
        #[cfg(all(test, debug_assertions))]
        self.assert_well_formed();
    }

    /// Panics if the tree isn’t well-formed.
    ///
    /// The tree is well-formed if it is topologically correct (every reachable interior node
    /// has exactly two children pointing back to it, no node is reachable twice, and every slot
    /// is either reachable or in the free-list) and geometrically correct (the AABB of every
    /// interior node contains the AABBs of both its children).
    pub fn assert_well_formed(&self) {
        let mut visited = vec![false; self.nodes.len()];

        for free in &self.free_list {
            assert!(
                matches!(self.nodes[*free as usize].kind, BvhNodeKind::Free),
                "Slot {} is in the free-list but is in use.",
                free
            );
            assert!(
                !std::mem::replace(&mut visited[*free as usize], true),
                "Slot {} is in the free-list twice.",
                free
            );
        }

        if self.root == NO_NODE {
            assert_eq!(self.leaf_count, 0);
            assert!(visited.iter().all(|v| *v), "Empty tree with leaked slots.");
            return;
        }

        assert_eq!(self.nodes[self.root as usize].parent, NO_NODE);

        let mut leaf_count = 0;
        let mut stack = vec![self.root];

        while let Some(id) = stack.pop() {
            assert!(
                !std::mem::replace(&mut visited[id as usize], true),
                "Detected loop. Node {} visited twice.",
                id
            );

            let node = &self.nodes[id as usize];

            match node.kind {
                BvhNodeKind::Leaf(_) => leaf_count += 1,
                BvhNodeKind::Interior(children) => {
                    assert_ne!(children[0], children[1]);

                    for child in children {
                        let child_node = &self.nodes[child as usize];
                        assert_eq!(
                            child_node.parent, id,
                            "Node {} is a child of {} but its parent is {}.",
                            child, id, child_node.parent
                        );
                        assert!(
                            node.aabb.contains(&child_node.aabb),
                            "Node {} does not contain its child {}.",
                            id,
                            child
                        );
                        stack.push(child);
                    }
                }
                BvhNodeKind::Free => panic!("Free node {} is reachable from the root.", id),
            }
        }

        assert_eq!(leaf_count, self.leaf_count);
        assert!(
            visited.iter().all(|v| *v),
            "Some slots are neither reachable nor free."
        );
    }

    /// Counts the number of leaves that can be reached from the node `id`.
    ///
    /// This is mostly a utility for debugging.
    pub fn reachable_leaf_count(&self, id: BvhNodeId) -> usize {
        match self.nodes[id as usize].kind {
            BvhNodeKind::Leaf(_) => 1,
            BvhNodeKind::Interior([a, b]) => {
                self.reachable_leaf_count(a) + self.reachable_leaf_count(b)
            }
            BvhNodeKind::Free => 0,
        }
    }
}
