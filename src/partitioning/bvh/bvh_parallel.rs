use super::bvh_tree::{BvhNode, BvhNodeId, BvhNodeKind, NO_NODE};
use crate::bounding_volume::Aabb;
use crate::parallel::{Task, WorkerContext, WorkerPool, WorkerPoolError, MAX_OUTSTANDING_ROUNDS};
use crate::partitioning::Bvh;
use crate::utils::hashmap::HashMap;
use std::sync::mpsc;
use std::sync::Arc;

/// A predicate deciding if a leaf must be updated.
///
/// Given the data and current AABB of a leaf, returns its new AABB if it moved. It may be
/// called concurrently from several worker threads, on disjoint leaves.
pub type LeafUpdatePredicate<T> = Arc<dyn Fn(&T, &Aabb) -> Option<Aabb> + Send + Sync>;

/// A subtree moved out of a [`Bvh`].
///
/// The detached nodes are owned by this value: the tree they come from keeps their slots
/// reserved but does not reference their content until [`Bvh::reattach_subtree`] is called.
#[derive(Clone, Debug)]
pub struct DetachedSubtree<T> {
    tree: Bvh<T>,
    local_to_global: Vec<BvhNodeId>,
    global_root: BvhNodeId,
    global_parent: BvhNodeId,
}

impl<T> DetachedSubtree<T> {
    /// The subtree, as a standalone tree.
    pub fn tree(&self) -> &Bvh<T> {
        &self.tree
    }

    /// The subtree, as a standalone tree.
    ///
    /// Leaves must not be inserted nor removed from it.
    pub fn tree_mut(&mut self) -> &mut Bvh<T> {
        &mut self.tree
    }
}

impl<T: Copy> Bvh<T> {
    /// Splits this tree into the nodes at depth `cutoff_depth` (the root being at depth 0),
    /// and the leaves located above that depth.
    pub fn partition(&self, cutoff_depth: usize) -> (Vec<BvhNodeId>, Vec<BvhNodeId>) {
        let mut subtree_roots = vec![];
        let mut shallow_leaves = vec![];

        let Some(root) = self.root() else {
            return (subtree_roots, shallow_leaves);
        };

        let mut stack = vec![(root, 0)];

        while let Some((id, depth)) = stack.pop() {
            if depth == cutoff_depth {
                subtree_roots.push(id);
                continue;
            }

            match self.nodes[id as usize].kind {
                BvhNodeKind::Leaf(_) => shallow_leaves.push(id),
                BvhNodeKind::Interior([a, b]) => {
                    stack.push((b, depth + 1));
                    stack.push((a, depth + 1));
                }
                BvhNodeKind::Free => unreachable!("Free BVH node {} reachable from the root.", id),
            }
        }

        (subtree_roots, shallow_leaves)
    }

    /// Moves the subtree rooted at `root` out of this tree.
    ///
    /// Until the subtree is reattached, this tree must not be modified nor queried.
    pub fn detach_subtree(&mut self, root: BvhNodeId) -> DetachedSubtree<T> {
        let global_parent = self.nodes[root as usize].parent;
        let mut local_to_global = vec![];
        let mut global_to_local = HashMap::default();
        let mut stack = vec![root];

        while let Some(id) = stack.pop() {
            let _ = global_to_local.insert(id, local_to_global.len() as BvhNodeId);
            local_to_global.push(id);

            if let Some(children) = self.nodes[id as usize].children() {
                stack.extend_from_slice(&children);
            }
        }

        let to_local = |id: BvhNodeId| global_to_local.get(&id).copied().unwrap_or(NO_NODE);

        let mut tree = Bvh::new();
        tree.root = 0;

        for global in &local_to_global {
            let node = core::mem::replace(&mut self.nodes[*global as usize], BvhNode::free());
            let kind = match node.kind {
                BvhNodeKind::Interior([a, b]) => BvhNodeKind::Interior([to_local(a), to_local(b)]),
                other => other,
            };

            if matches!(kind, BvhNodeKind::Leaf(_)) {
                tree.leaf_count += 1;
            }

            tree.nodes.push(BvhNode {
                aabb: node.aabb,
                parent: if *global == root {
                    NO_NODE
                } else {
                    to_local(node.parent)
                },
                kind,
            });
        }

        self.leaf_count -= tree.leaf_count;

        DetachedSubtree {
            global_parent,
            tree,
            local_to_global,
            global_root: root,
        }
    }

    /// Moves a subtree previously detached from this tree back into it.
    ///
    /// The subtree root may have changed while detached. The ancestors of the subtree are not
    /// refitted. Returns the new id of the subtree root.
    pub fn reattach_subtree(&mut self, subtree: DetachedSubtree<T>) -> BvhNodeId {
        let DetachedSubtree {
            tree,
            mut local_to_global,
            global_root,
            global_parent,
        } = subtree;

        assert_ne!(tree.root, NO_NODE, "Cannot reattach an empty subtree.");

        // Slots allocated while detached need a home in this tree.
        while local_to_global.len() < tree.nodes.len() {
            local_to_global.push(self.allocate(BvhNode::free()));
        }

        let to_global = |id: BvhNodeId| local_to_global[id as usize];

        for (local, node) in tree.nodes.iter().enumerate() {
            let global = to_global(local as BvhNodeId);

            let kind = match node.kind {
                BvhNodeKind::Interior([a, b]) => {
                    BvhNodeKind::Interior([to_global(a), to_global(b)])
                }
                BvhNodeKind::Free => {
                    self.free_list.push(global);
                    BvhNodeKind::Free
                }
                leaf => leaf,
            };

            self.nodes[global as usize] = BvhNode {
                aabb: node.aabb,
                parent: if node.parent == NO_NODE {
                    global_parent
                } else {
                    to_global(node.parent)
                },
                kind,
            };
        }

        let new_root = to_global(tree.root);
        self.leaf_count += tree.leaf_count;

        if global_parent == NO_NODE {
            self.root = new_root;
            self.nodes[new_root as usize].parent = NO_NODE;
        } else {
            self.replace_child(global_parent, global_root, new_root);
        }

        new_root
    }

    /// Updates the AABB of every leaf for which `moved` returns a new AABB.
    ///
    /// Returns the number of updated leaves.
    pub fn update_leaves(&mut self, mut moved: impl FnMut(&T, &Aabb) -> Option<Aabb>) -> usize {
        let leaves: Vec<_> = self.leaves().map(|(id, data)| (id, *data)).collect();
        let mut num_updated = 0;

        for (id, data) in leaves {
            if let Some(aabb) = moved(&data, &self.nodes[id as usize].aabb) {
                self.update(id, aabb);
                num_updated += 1;
            }
        }

        num_updated
    }

    /// Updates the AABB of every leaf for which `moved` returns a new AABB, spreading the work
    /// over the threads of `pool`.
    ///
    /// The subtrees rooted at depth `cutoff_depth` are detached and handed round-robin to the
    /// workers, each updating its subtrees independently. The subtrees are then reattached and
    /// their ancestors refitted, and the leaves above the cutoff depth are updated sequentially.
    ///
    /// Returns the number of updated leaves. If a worker thread stopped running, an error is
    /// returned and this tree must be discarded.
    pub fn par_update_leaves(
        &mut self,
        pool: &mut WorkerPool,
        cutoff_depth: usize,
        moved: LeafUpdatePredicate<T>,
    ) -> Result<usize, WorkerPoolError>
    where
        T: Send + 'static,
    {
        if pool.outstanding_rounds() >= MAX_OUTSTANDING_ROUNDS {
            return Err(WorkerPoolError::QueueFull);
        }

        let (subtree_roots, shallow_leaves) = self.partition(cutoff_depth);

        if subtree_roots.is_empty() {
            return Ok(self.update_leaves(|data, aabb| moved(data, aabb)));
        }

        let thread_count = pool.thread_count();
        let mut assignments: Vec<Vec<DetachedSubtree<T>>> =
            (0..thread_count).map(|_| vec![]).collect();

        for (k, root) in subtree_roots.into_iter().enumerate() {
            assignments[k % thread_count].push(self.detach_subtree(root));
        }

        let (sender, receiver) = mpsc::channel();
        let tasks = assignments
            .into_iter()
            .map(|mut assigned| {
                let sender = sender.clone();
                let moved = moved.clone();
                Box::new(move |_: &WorkerContext| {
                    let num_updated: usize = assigned
                        .iter_mut()
                        .map(|subtree| subtree.tree.update_leaves(|data, aabb| moved(data, aabb)))
                        .sum();
                    let _ = sender.send((assigned, num_updated));
                }) as Task
            })
            .collect();
        drop(sender);

        pool.schedule_work(tasks)?;
        pool.wait_for_task_termination();

        let mut num_updated = 0;
        let mut reattached = vec![];

        for (subtrees, count) in receiver.try_iter() {
            num_updated += count;

            for subtree in subtrees {
                reattached.push(self.reattach_subtree(subtree));
            }
        }

        for root in reattached {
            self.refit_parents(root);
        }

        for leaf in shallow_leaves {
            let data = *self.leaf_data(leaf);
            if let Some(aabb) = moved(&data, &self.nodes[leaf as usize].aabb) {
                self.update(leaf, aabb);
                num_updated += 1;
            }
        }

        self.debug_assert_well_formed();

        log::trace!(
            "Parallel BVH update: {} leaves updated over {} threads.",
            num_updated,
            thread_count
        );

        Ok(num_updated)
    }
}
