use super::bvh_tree::{BvhNodeId, NO_NODE};
use crate::bounding_volume::BoundingVolume;
use crate::math::Real;
use crate::partitioning::Bvh;

/// A candidate tree rotation: `uncle`, child of the rotated node, is swapped with `nephew`,
/// child of the other child `sibling`.
#[derive(Copy, Clone, Debug)]
struct Rotation {
    uncle: BvhNodeId,
    sibling: BvhNodeId,
    nephew: BvhNodeId,
    area_delta: Real,
}

impl<T: Copy> Bvh<T> {
    /// Walks from the parent of `id` up to the root, recomputing each interior AABB as the union
    /// of its children and attempting a rotation at each level.
    pub(super) fn refit_parents(&mut self, id: BvhNodeId) {
        let mut curr = self.nodes[id as usize].parent;

        while curr != NO_NODE {
            self.recompute_aabb(curr);
            self.rotate(curr);
            curr = self.nodes[curr as usize].parent;
        }
    }

    /// Applies, at the interior node `id`, the rotation reducing the most the surface area of
    /// its children.
    ///
    /// A rotation swaps one child of `id` with a grandchild under the other child. Only
    /// rotations with a strictly negative area change are applied, and at most one per call.
    pub(super) fn rotate(&mut self, id: BvhNodeId) {
        let Some([left, right]) = self.nodes[id as usize].children() else {
            return;
        };

        let best = [
            self.rotation_candidates(right, left),
            self.rotation_candidates(left, right),
        ]
        .into_iter()
        .flatten()
        .flatten()
        .min_by(|a, b| a.area_delta.total_cmp(&b.area_delta));

        if let Some(rotation) = best {
            if rotation.area_delta < 0.0 {
                self.apply_rotation(id, rotation);
            }
        }
    }

    /// The two rotations swapping `uncle` with one of the children of `sibling`.
    fn rotation_candidates(
        &self,
        uncle: BvhNodeId,
        sibling: BvhNodeId,
    ) -> Option<[Rotation; 2]> {
        let [n0, n1] = self.nodes[sibling as usize].children()?;
        let sibling_area = self.nodes[sibling as usize].aabb.surface_area();
        let uncle_aabb = &self.nodes[uncle as usize].aabb;

        // Once `uncle` and `nephew` are swapped, `sibling` bounds `uncle` and the other nephew.
        let delta = |kept: BvhNodeId| {
            uncle_aabb.merged(&self.nodes[kept as usize].aabb).surface_area() - sibling_area
        };

        Some([
            Rotation {
                uncle,
                sibling,
                nephew: n0,
                area_delta: delta(n1),
            },
            Rotation {
                uncle,
                sibling,
                nephew: n1,
                area_delta: delta(n0),
            },
        ])
    }

    fn apply_rotation(&mut self, id: BvhNodeId, rotation: Rotation) {
        self.replace_child(id, rotation.uncle, rotation.nephew);
        self.replace_child(rotation.sibling, rotation.nephew, rotation.uncle);
        self.recompute_aabb(rotation.sibling);
    }
}
