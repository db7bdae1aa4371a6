use crate::bounding_volume::Aabb;
use crate::math::{Point, Real, Vector};
use crate::query::{intersection_test_triangle_aabb, Ray, RayIntersection};
use crate::shape::{Triangle, TriangleRef};
use arrayvec::ArrayVec;

/// Hits found slightly past the exit of a leaf are still accepted, relative to the leaf size.
const LEAF_EXIT_TOLERANCE: Real = 1.0e-4;

/// A cell of an octree indexing static triangles.
///
/// A cell at depth `0` is a leaf storing references to every triangle intersecting it. A cell at
/// a greater depth is split into 8 children the first time a triangle is inserted into it. Cells
/// never merge back.
#[derive(Clone, Debug)]
pub struct OctreeCell {
    center: Point<Real>,
    half_size: Real,
    depth: u32,
    children: Option<Box<[OctreeCell; 8]>>,
    triangles: Vec<TriangleRef>,
}

impl OctreeCell {
    /// Creates an empty cell centered at `center`, with `depth` levels of subdivision below it.
    pub fn new(center: Point<Real>, half_size: Real, depth: u32) -> Self {
        Self {
            center,
            half_size,
            depth,
            children: None,
            triangles: vec![],
        }
    }

    /// The center of this cell.
    #[inline]
    pub fn center(&self) -> &Point<Real> {
        &self.center
    }

    /// Half the side length of this cell.
    #[inline]
    pub fn half_size(&self) -> Real {
        self.half_size
    }

    /// The number of subdivision levels below this cell.
    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// The bounds of this cell.
    #[inline]
    pub fn aabb(&self) -> Aabb {
        Aabb::from_half_extents(self.center, Vector::repeat(self.half_size))
    }

    /// Is this a leaf cell?
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.depth == 0
    }

    /// The 8 children of this cell, if it was subdivided.
    ///
    /// The child `i` covers the upper half of the cell along the axis `k` if the bit `k` of `i`
    /// is set.
    #[inline]
    pub fn children(&self) -> Option<&[OctreeCell; 8]> {
        self.children.as_deref()
    }

    /// The triangles stored by this cell. Always empty if this isn’t a leaf.
    #[inline]
    pub fn triangles(&self) -> &[TriangleRef] {
        &self.triangles
    }

    /// Is there no triangle stored in this cell or in any of its descendants?
    pub fn is_empty(&self) -> bool {
        match &self.children {
            Some(children) => children.iter().all(|c| c.is_empty()),
            None => self.triangles.is_empty(),
        }
    }

    fn subdivide(&self) -> [OctreeCell; 8] {
        let quarter = self.half_size * 0.5;
        core::array::from_fn(|i| {
            let shift = Vector::new(
                if i & 1 != 0 { quarter } else { -quarter },
                if i & 2 != 0 { quarter } else { -quarter },
                if i & 4 != 0 { quarter } else { -quarter },
            );
            OctreeCell::new(self.center + shift, quarter, self.depth - 1)
        })
    }

    /// The index of the child containing `pt`.
    #[inline]
    fn child_index(&self, pt: &Point<Real>) -> usize {
        (pt.x >= self.center.x) as usize
            | ((pt.y >= self.center.y) as usize) << 1
            | ((pt.z >= self.center.z) as usize) << 2
    }

    /// Inserts `tri` in every leaf of this cell intersecting `triangle`.
    ///
    /// Returns `false` if `triangle` does not intersect this cell at all. A triangle straddling
    /// several leaves is referenced by each of them.
    pub fn insert(&mut self, tri: TriangleRef, triangle: &Triangle) -> bool {
        if !intersection_test_triangle_aabb(triangle, &self.aabb()) {
            return false;
        }

        if self.is_leaf() {
            self.triangles.push(tri);
            return true;
        }

        if self.children.is_none() {
            self.children = Some(Box::new(self.subdivide()));
        }

        let mut inserted = false;

        if let Some(children) = &mut self.children {
            for child in children.iter_mut() {
                inserted |= child.insert(tri, triangle);
            }
        }

        inserted
    }

    /// Removes `tri` from every leaf of this cell intersecting `triangle`.
    ///
    /// One occurrence is removed from each leaf. Returns the number of leaves it was removed
    /// from. Cells are never merged back, even if they become empty.
    pub fn remove(&mut self, tri: TriangleRef, triangle: &Triangle) -> usize {
        if !intersection_test_triangle_aabb(triangle, &self.aabb()) {
            return 0;
        }

        if self.is_leaf() {
            return match self.triangles.iter().position(|t| *t == tri) {
                Some(i) => {
                    let _ = self.triangles.swap_remove(i);
                    1
                }
                None => 0,
            };
        }

        self.children
            .as_mut()
            .map(|children| children.iter_mut().map(|c| c.remove(tri, triangle)).sum())
            .unwrap_or(0)
    }

    /// Appends to `out` the triangles of every leaf that may intersect `aabb`.
    ///
    /// Children are selected by comparing `aabb` with the center planes of each cell, which
    /// may visit leaves `aabb` does not actually touch. The same triangle may be reported
    /// several times.
    pub fn box_query(&self, aabb: &Aabb, out: &mut Vec<TriangleRef>) {
        if self.is_leaf() {
            out.extend_from_slice(&self.triangles);
            return;
        }

        let Some(children) = &self.children else {
            return;
        };

        // Bit `k` of `lower` (resp. `upper`) is set if `aabb` reaches the lower (resp. upper)
        // half of this cell along the axis `k`.
        let mut lower = 0;
        let mut upper = 0;

        for k in 0..3 {
            if aabb.mins[k] < self.center[k] {
                lower |= 1 << k;
            }
            if aabb.maxs[k] >= self.center[k] {
                upper |= 1 << k;
            }
        }

        for (i, child) in children.iter().enumerate() {
            let selected = (0..3).all(|k| {
                if i & (1 << k) != 0 {
                    upper & (1 << k) != 0
                } else {
                    lower & (1 << k) != 0
                }
            });

            if selected {
                child.box_query(aabb, out);
            }
        }
    }

    /// Casts a ray on the triangles stored in this cell.
    ///
    /// Leaves are visited in the order the ray crosses them, and the traversal stops at the
    /// first leaf where `leaf_test` reports a hit. `leaf_test` is given a triangle and the
    /// largest time of impact of interest, and returns the intersection of the ray with it.
    pub fn cast_ray(
        &self,
        ray: &Ray,
        max_toi: Real,
        leaf_test: &mut impl FnMut(&TriangleRef, Real) -> Option<RayIntersection>,
    ) -> Option<(TriangleRef, RayIntersection)> {
        let (t0, t1) = self.aabb().clip_ray(ray, max_toi)?;
        self.cast_ray_in(ray, t0, t1, max_toi, leaf_test)
    }

    /// Casts a ray on the part of this cell crossed between the times `t0` and `t1`.
    fn cast_ray_in(
        &self,
        ray: &Ray,
        t0: Real,
        t1: Real,
        max_toi: Real,
        leaf_test: &mut impl FnMut(&TriangleRef, Real) -> Option<RayIntersection>,
    ) -> Option<(TriangleRef, RayIntersection)> {
        if self.is_leaf() {
            let dir_norm = ray.dir.norm();
            let tolerance = if dir_norm > 0.0 {
                LEAF_EXIT_TOLERANCE * self.half_size / dir_norm
            } else {
                0.0
            };
            let accepted_toi = (t1 + tolerance).min(max_toi);
            let mut best: Option<(TriangleRef, RayIntersection)> = None;

            for tri in &self.triangles {
                let best_toi = best.map(|b| b.1.time_of_impact).unwrap_or(accepted_toi);
                if let Some(hit) = leaf_test(tri, best_toi) {
                    if hit.time_of_impact <= best_toi {
                        best = Some((*tri, hit));
                    }
                }
            }

            return best;
        }

        let children = self.children.as_ref()?;

        // Times at which the ray crosses the three center planes, sorted.
        let mut crossings: ArrayVec<Real, 5> = ArrayVec::new();
        crossings.push(t0);
        for k in 0..3 {
            if ray.dir[k] != 0.0 {
                let t = (self.center[k] - ray.origin[k]) / ray.dir[k];
                if t > t0 && t < t1 {
                    crossings.push(t);
                }
            }
        }
        crossings[1..].sort_unstable_by(|a, b| a.total_cmp(b));
        crossings.push(t1);

        for segment in crossings.windows(2) {
            let (start, end) = (segment[0], segment[1]);

            if end <= start && crossings.len() > 2 {
                continue;
            }

            let child = &children[self.child_index(&ray.point_at((start + end) * 0.5))];
            if let Some(hit) = child.cast_ray_in(ray, start, end, max_toi, leaf_test) {
                return Some(hit);
            }
        }

        None
    }

    /// Calls `f` on this cell and all its descendants, depth-first, parents before children.
    pub fn explore(&self, f: &mut impl FnMut(&OctreeCell)) {
        f(self);

        if let Some(children) = &self.children {
            for child in children.iter() {
                child.explore(f);
            }
        }
    }
}
