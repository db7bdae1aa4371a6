use crate::bounding_volume::{Aabb, BoundingVolume};
use crate::math::Real;

/// Index of a node inside of the node arena of a [`Bvh`].
pub type BvhNodeId = u32;

/// Sentinel index used for the absent parent of the root, and for the root of an empty tree.
pub const NO_NODE: BvhNodeId = u32::MAX;

/// The content of a BVH node.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum BvhNodeKind<T> {
    /// A leaf holding the handle of a moving object.
    Leaf(T),
    /// An interior node with exactly two children.
    Interior([BvhNodeId; 2]),
    /// A reclaimed arena slot, listed in the free-list.
    Free,
}

/// A node of a [`Bvh`].
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct BvhNode<T> {
    /// The AABB of this node. For interior nodes, it contains the AABBs of both children.
    pub aabb: Aabb,
    /// The parent of this node, or [`NO_NODE`] for the root.
    pub parent: BvhNodeId,
    /// Whether this node is a leaf or an interior node.
    pub kind: BvhNodeKind<T>,
}

impl<T> BvhNode<T> {
    pub(super) fn free() -> Self {
        Self {
            aabb: Aabb::new_invalid(),
            parent: NO_NODE,
            kind: BvhNodeKind::Free,
        }
    }

    /// Is this node a leaf?
    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, BvhNodeKind::Leaf(_))
    }

    /// The two children of this node, if it is an interior node.
    #[inline]
    pub fn children(&self) -> Option<[BvhNodeId; 2]> {
        match self.kind {
            BvhNodeKind::Interior(children) => Some(children),
            _ => None,
        }
    }

    /// The data attached to this node, if it is a leaf.
    #[inline]
    pub fn leaf_data(&self) -> Option<&T> {
        match &self.kind {
            BvhNodeKind::Leaf(data) => Some(data),
            _ => None,
        }
    }
}

/// A dynamic bounding volume hierarchy.
///
/// The tree is a strict full binary tree stored in an arena of nodes addressed by
/// [`BvhNodeId`]. Slots of removed nodes are recycled through a free-list. Leaves carry
/// a cheap copyable handle `T` identifying the object they bound.
///
/// Leaf ids returned by [`Bvh::insert`] remain valid until the leaf is removed, even when the
/// leaf is moved around the tree by [`Bvh::update`] or by tree rotations.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Bvh<T> {
    pub(super) nodes: Vec<BvhNode<T>>,
    pub(super) free_list: Vec<BvhNodeId>,
    pub(super) root: BvhNodeId,
    pub(super) leaf_count: usize,
}

impl<T> Default for Bvh<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Bvh<T> {
    /// An empty BVH.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            free_list: Vec::new(),
            root: NO_NODE,
            leaf_count: 0,
        }
    }

    /// Is this tree empty?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root == NO_NODE
    }

    /// The root of this tree, or `None` if it is empty.
    #[inline]
    pub fn root(&self) -> Option<BvhNodeId> {
        (self.root != NO_NODE).then_some(self.root)
    }

    /// The AABB of the root of this tree.
    #[inline]
    pub fn root_aabb(&self) -> Option<&Aabb> {
        self.root().map(|root| &self.nodes[root as usize].aabb)
    }

    /// The number of leaves of this tree.
    #[inline]
    pub fn leaf_count(&self) -> usize {
        self.leaf_count
    }

    /// The total number of slots of the node arena, including the free ones.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.nodes.len()
    }

    /// The number of slots currently in the free-list.
    #[inline]
    pub fn free_slot_count(&self) -> usize {
        self.free_list.len()
    }

    /// The node with the given index.
    #[inline]
    pub fn node(&self, id: BvhNodeId) -> &BvhNode<T> {
        &self.nodes[id as usize]
    }

    /// The data attached to the leaf `id`.
    ///
    /// Panics if `id` isn’t a leaf.
    #[inline]
    pub fn leaf_data(&self, id: BvhNodeId) -> &T {
        self.nodes[id as usize]
            .leaf_data()
            .unwrap_or_else(|| panic!("BVH node {} is not a leaf.", id))
    }

    /// The AABB stored by the node `id`.
    #[inline]
    pub fn node_aabb(&self, id: BvhNodeId) -> &Aabb {
        &self.nodes[id as usize].aabb
    }

    /// Iterates through all the leaves of this tree, in arena order.
    pub fn leaves(&self) -> impl Iterator<Item = (BvhNodeId, &T)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(id, node)| node.leaf_data().map(|data| (id as BvhNodeId, data)))
    }

    /// The depth of this tree, i.e., the number of nodes on its longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        if self.is_empty() {
            return 0;
        }

        let mut max_depth = 0;
        let mut stack = vec![(self.root, 1)];

        while let Some((id, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);

            if let Some(children) = self.nodes[id as usize].children() {
                stack.push((children[0], depth + 1));
                stack.push((children[1], depth + 1));
            }
        }

        max_depth
    }

    /// The sum of the surface areas of all the interior nodes of this tree.
    ///
    /// This is the cost minimized by the surface area heuristic.
    pub fn total_interior_area(&self) -> Real {
        self.nodes
            .iter()
            .filter(|node| matches!(node.kind, BvhNodeKind::Interior(_)))
            .map(|node| node.aabb.surface_area())
            .sum()
    }

    pub(super) fn allocate(&mut self, node: BvhNode<T>) -> BvhNodeId {
        if let Some(id) = self.free_list.pop() {
            self.nodes[id as usize] = node;
            id
        } else {
            self.nodes.push(node);
            (self.nodes.len() - 1) as BvhNodeId
        }
    }

    pub(super) fn deallocate(&mut self, id: BvhNodeId) -> BvhNode<T> {
        self.free_list.push(id);
        core::mem::replace(&mut self.nodes[id as usize], BvhNode::free())
    }

    /// Replaces `old_child` by `new_child` among the children of `parent`, or makes
    /// `new_child` the root if `parent` is [`NO_NODE`].
    pub(super) fn replace_child(
        &mut self,
        parent: BvhNodeId,
        old_child: BvhNodeId,
        new_child: BvhNodeId,
    ) {
        if parent == NO_NODE {
            self.root = new_child;
        } else {
            match &mut self.nodes[parent as usize].kind {
                BvhNodeKind::Interior(children) => {
                    let slot = if children[0] == old_child { 0 } else { 1 };
                    assert_eq!(
                        children[slot], old_child,
                        "BVH node {} is not a child of {}.",
                        old_child, parent
                    );
                    children[slot] = new_child;
                }
                _ => panic!("BVH node {} is not an interior node.", parent),
            }
        }

        self.nodes[new_child as usize].parent = parent;
    }

    /// Recomputes the AABB of the interior node `id` from its children.
    pub(super) fn recompute_aabb(&mut self, id: BvhNodeId) {
        if let Some([a, b]) = self.nodes[id as usize].children() {
            let aabb = self.nodes[a as usize]
                .aabb
                .merged(&self.nodes[b as usize].aabb);
            self.nodes[id as usize].aabb = aabb;
        }
    }
}
