use crate::bounding_volume::{Aabb, BoundingVolume};
use crate::math::{Real, Vector};
use crate::partitioning::{GridCoord, OctreeCell};
use crate::query::Ray;
use crate::shape::{StaticMesh, StaticMeshHandle, Triangle, TriangleRef};
use crate::utils::hashmap::HashMap;
use slab::Slab;

/// Fraction of a cell the DDA moves past a cell boundary to find the next cell.
const BOUNDARY_NUDGE: Real = 1.0e-4;

/// The result of a ray cast on the static geometry.
///
/// A miss is reported with a time of impact equal to the maximum time of impact of the cast.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RayHit {
    /// The time of impact of the ray, or the maximum time of impact if nothing was hit.
    pub time_of_impact: Real,
    /// The normal of the hit triangle, pointing toward the ray origin. Zero on a miss.
    pub normal: Vector<Real>,
    /// The triangle hit, if any.
    pub triangle: Option<TriangleRef>,
}

impl RayHit {
    /// A ray cast result reporting that nothing was hit before `max_toi`.
    #[inline]
    pub fn miss(max_toi: Real) -> Self {
        Self {
            time_of_impact: max_toi,
            normal: Vector::zeros(),
            triangle: None,
        }
    }

    /// Did the ray hit a triangle?
    #[inline]
    pub fn is_hit(&self) -> bool {
        self.triangle.is_some()
    }
}

/// A spatial index of immovable triangle meshes.
///
/// Space is split into cubic cells of size `cell_size`, each cell owning an octree of depth
/// `octree_depth`. Cells are created the first time a mesh overlaps them and are never
/// removed, even once emptied.
#[derive(Clone, Debug)]
pub struct StaticGeometry {
    cell_size: Real,
    octree_depth: u32,
    cells: HashMap<GridCoord, OctreeCell>,
    meshes: Slab<StaticMesh>,
    /// Union of the bounds of every cell, used to bound ray traversals.
    occupied: Aabb,
}

impl StaticGeometry {
    /// An empty grid with cells of size `cell_size`, each subdivided `octree_depth` times.
    pub fn new(cell_size: Real, octree_depth: u32) -> Self {
        assert!(cell_size > 0.0, "The grid cell size must be positive.");

        Self {
            cell_size,
            octree_depth,
            cells: HashMap::default(),
            meshes: Slab::new(),
            occupied: Aabb::new_invalid(),
        }
    }

    /// The size of the cells of this grid.
    #[inline]
    pub fn cell_size(&self) -> Real {
        self.cell_size
    }

    /// The number of subdivision levels of the octree of each cell.
    #[inline]
    pub fn octree_depth(&self) -> u32 {
        self.octree_depth
    }

    /// The number of cells created so far.
    #[inline]
    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }

    /// The octree of the given cell, if it exists.
    #[inline]
    pub fn cell(&self, coord: &GridCoord) -> Option<&OctreeCell> {
        self.cells.get(coord)
    }

    /// The mesh with the given handle.
    #[inline]
    pub fn mesh(&self, handle: StaticMeshHandle) -> Option<&StaticMesh> {
        self.meshes.get(handle.0 as usize)
    }

    /// Iterates through all the meshes of this grid.
    pub fn meshes(&self) -> impl Iterator<Item = (StaticMeshHandle, &StaticMesh)> {
        self.meshes
            .iter()
            .map(|(i, mesh)| (StaticMeshHandle(i as u32), mesh))
    }

    /// The triangle referenced by `tri`.
    ///
    /// Panics if the mesh of `tri` was removed.
    #[inline]
    pub fn triangle(&self, tri: TriangleRef) -> &Triangle {
        self.meshes[tri.mesh.0 as usize].triangle(tri.index)
    }

    /// Adds a mesh to this grid, inserting each of its triangles into every cell it overlaps.
    pub fn insert_mesh(&mut self, mesh: StaticMesh) -> StaticMeshHandle {
        let handle = StaticMeshHandle(self.meshes.vacant_key() as u32);
        let mut num_cells = 0;

        for coord in GridCoord::cells_intersecting(mesh.aabb(), self.cell_size) {
            let cell_size = self.cell_size;
            let depth = self.octree_depth;
            let occupied = &mut self.occupied;
            let cell = self.cells.entry(coord).or_insert_with(|| {
                let cell_aabb = coord.cell_aabb(cell_size);
                occupied.merge(&cell_aabb);
                OctreeCell::new(coord.cell_center(cell_size), cell_size * 0.5, depth)
            });

            let mut touched = false;
            for (i, triangle) in mesh.triangles().iter().enumerate() {
                let tri = TriangleRef {
                    mesh: handle,
                    index: i as u32,
                };
                touched |= cell.insert(tri, triangle);
            }

            num_cells += touched as usize;
        }

        log::debug!(
            "Static mesh {} with {} triangles inserted into {} grid cells.",
            handle.0,
            mesh.triangles().len(),
            num_cells
        );

        let _ = self.meshes.insert(mesh);
        handle
    }

    /// Removes a mesh from this grid, returning it.
    ///
    /// The cells it overlapped are kept, even if they no longer contain any triangle.
    pub fn remove_mesh(&mut self, handle: StaticMeshHandle) -> Option<StaticMesh> {
        let mesh = self.meshes.try_remove(handle.0 as usize)?;

        for coord in GridCoord::cells_intersecting(mesh.aabb(), self.cell_size) {
            if let Some(cell) = self.cells.get_mut(&coord) {
                for (i, triangle) in mesh.triangles().iter().enumerate() {
                    let tri = TriangleRef {
                        mesh: handle,
                        index: i as u32,
                    };
                    let _ = cell.remove(tri, triangle);
                }
            }
        }

        log::debug!("Static mesh {} removed.", handle.0);
        Some(mesh)
    }

    /// Collects into `out` the triangles of every octree leaf that may intersect `aabb`.
    ///
    /// The result has no duplicates, and may contain triangles that don’t intersect `aabb`.
    pub fn box_query(&self, aabb: &Aabb, out: &mut Vec<TriangleRef>) {
        let start = out.len();

        for coord in GridCoord::cells_intersecting(aabb, self.cell_size) {
            if let Some(cell) = self.cells.get(&coord) {
                cell.box_query(aabb, out);
            }
        }

        out[start..].sort_unstable();
        let mut unique: Vec<_> = out.drain(start..).collect();
        unique.dedup();
        out.append(&mut unique);
    }

    /// Casts a ray on the triangles of this grid.
    ///
    /// Cells are visited in the order the ray crosses them, and the traversal stops at the
    /// first cell containing a hit. With `backface_culling`, triangles are ignored if the ray
    /// reaches them from behind. If nothing is hit, the returned time of impact is `max_toi`.
    pub fn cast_ray(&self, ray: &Ray, max_toi: Real, backface_culling: bool) -> RayHit {
        let miss = RayHit::miss(max_toi);

        if self.cells.is_empty() || ray.dir == Vector::zeros() {
            return miss;
        }

        let Some((t_enter, t_exit)) = self.occupied.clip_ray(ray, max_toi) else {
            return miss;
        };

        let cell_size = self.cell_size;
        let nudge = BOUNDARY_NUDGE * cell_size / ray.dir.norm();
        let mut coord = GridCoord::from_point(&ray.point_at(t_enter + nudge), cell_size);

        let mut step = [0i32; 3];
        let mut t_next = [Real::MAX; 3];
        let mut t_delta = [Real::MAX; 3];
        let coords = |c: &GridCoord, k: usize| [c.x, c.y, c.z][k];

        for k in 0..3 {
            if ray.dir[k] != 0.0 {
                step[k] = if ray.dir[k] > 0.0 { 1 } else { -1 };
                let boundary = (coords(&coord, k) as Real + 0.5 * step[k] as Real) * cell_size;
                t_next[k] = (boundary - ray.origin[k]) / ray.dir[k];
                t_delta[k] = cell_size / ray.dir[k].abs();
            }
        }

        let mut leaf_test = |tri: &TriangleRef, best_toi: Real| {
            self.triangle(*tri)
                .cast_local_ray(ray, best_toi, backface_culling)
        };

        loop {
            if let Some(cell) = self.cells.get(&coord) {
                if let Some((tri, hit)) = cell.cast_ray(ray, max_toi, &mut leaf_test) {
                    return RayHit {
                        time_of_impact: hit.time_of_impact,
                        normal: hit.normal,
                        triangle: Some(tri),
                    };
                }
            }

            let k = (0..3)
                .min_by(|a, b| t_next[*a].total_cmp(&t_next[*b]))
                .unwrap_or(0);

            if t_next[k] > t_exit {
                return miss;
            }

            coord = match k {
                0 => coord.offset(step[0], 0, 0),
                1 => coord.offset(0, step[1], 0),
                _ => coord.offset(0, 0, step[2]),
            };
            t_next[k] += t_delta[k];
        }
    }

    /// Calls `f` on every cell of every octree of this grid, depth-first.
    pub fn explore(&self, mut f: impl FnMut(&GridCoord, &OctreeCell)) {
        for (coord, root) in &self.cells {
            root.explore(&mut |cell| f(coord, cell));
        }
    }
}
