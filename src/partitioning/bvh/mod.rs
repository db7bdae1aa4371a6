pub use bvh_parallel::{DetachedSubtree, LeafUpdatePredicate};
pub use bvh_tree::{Bvh, BvhNode, BvhNodeId, BvhNodeKind, NO_NODE};

mod bvh_insert;
mod bvh_optimize;
mod bvh_parallel;
mod bvh_queries;
mod bvh_tree;
mod bvh_update;
mod bvh_validation;

#[cfg(test)]
mod bvh_tests;
