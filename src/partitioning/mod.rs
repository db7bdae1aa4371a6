//! Spatial partitioning tools.
//!
//! Moving objects are culled by the dynamic [`Bvh`], while static triangle meshes are indexed
//! by the [`StaticGeometry`] grid of octrees.

pub use self::bvh::{
    Bvh, BvhNode, BvhNodeId, BvhNodeKind, DetachedSubtree, LeafUpdatePredicate, NO_NODE,
};
pub use self::grid_coord::GridCoord;
pub use self::octree_cell::OctreeCell;
pub use self::static_geometry::{RayHit, StaticGeometry};

mod bvh;
mod grid_coord;
mod octree_cell;
mod static_geometry;
