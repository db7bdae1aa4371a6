use crate::bounding_volume::Aabb;
use crate::math::{Isometry, Point, Real};
use crate::shape::{Triangle, TriangleError};

/// Errors raised while building a [`StaticMesh`].
#[derive(thiserror::Error, Copy, Clone, Debug, PartialEq)]
pub enum StaticMeshError {
    /// A static mesh must contain at least one triangle.
    #[error("a static mesh must contain at least one triangle")]
    EmptyIndices,
    /// A triangle references a vertex that does not exist.
    #[error("the triangle {triangle} uses the vertex {index} but only {num_vertices} exist")]
    IndexOutOfBounds {
        /// The offending triangle.
        triangle: u32,
        /// The out-of-bounds vertex index.
        index: u32,
        /// The number of vertices of the mesh.
        num_vertices: usize,
    },
    /// A triangle is degenerate.
    #[error("the triangle {triangle} is invalid: {source}")]
    BadTriangle {
        /// The offending triangle.
        triangle: u32,
        /// The reason the triangle was rejected.
        #[source]
        source: TriangleError,
    },
}

/// The handle of a static mesh registered in the static geometry grid.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct StaticMeshHandle(pub u32);

/// A weak reference to a triangle of a static mesh.
///
/// Octree leaves store these instead of owning triangles, so that a triangle straddling several
/// cells is shared rather than duplicated.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct TriangleRef {
    /// The mesh owning the triangle.
    pub mesh: StaticMeshHandle,
    /// The index of the triangle inside of its mesh.
    pub index: u32,
}

/// An immovable triangle mesh.
///
/// The placement given at construction is baked into the triangles: all the geometry
/// stored here is expressed in world-space.
#[derive(Clone, Debug)]
pub struct StaticMesh {
    triangles: Vec<Triangle>,
    aabb: Aabb,
}

impl StaticMesh {
    /// Builds a static mesh from an indexed triangle soup placed at `position`.
    pub fn new(
        vertices: &[Point<Real>],
        indices: &[[u32; 3]],
        position: &Isometry<Real>,
    ) -> Result<StaticMesh, StaticMeshError> {
        if indices.is_empty() {
            return Err(StaticMeshError::EmptyIndices);
        }

        let world_vertices: Vec<_> = vertices.iter().map(|v| position * v).collect();
        let mut triangles = Vec::with_capacity(indices.len());

        for (tri_id, idx) in indices.iter().enumerate() {
            let tri_id = tri_id as u32;

            if let Some(&index) = idx.iter().find(|i| **i as usize >= world_vertices.len()) {
                return Err(StaticMeshError::IndexOutOfBounds {
                    triangle: tri_id,
                    index,
                    num_vertices: world_vertices.len(),
                });
            }

            let triangle = Triangle::new(
                world_vertices[idx[0] as usize],
                world_vertices[idx[1] as usize],
                world_vertices[idx[2] as usize],
            )
            .map_err(|source| StaticMeshError::BadTriangle {
                triangle: tri_id,
                source,
            })?;
            triangles.push(triangle);
        }

        let aabb = Aabb::from_points(&world_vertices);

        Ok(StaticMesh { triangles, aabb })
    }

    /// The world-space triangles of this mesh.
    #[inline]
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// The triangle with the given index.
    #[inline]
    pub fn triangle(&self, i: u32) -> &Triangle {
        &self.triangles[i as usize]
    }

    /// The world-space AABB of this mesh.
    #[inline]
    pub fn aabb(&self) -> &Aabb {
        &self.aabb
    }
}

#[cfg(test)]
mod test {
    use super::{StaticMesh, StaticMeshError};
    use crate::math::{Isometry, Point, Vector};

    #[test]
    fn mesh_construction_errors() {
        let vtx = [
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 0.0, 0.0),
            Point::new(0.0, 0.0, 1.0),
        ];
        let id = Isometry::identity();

        assert_eq!(
            StaticMesh::new(&vtx, &[], &id).unwrap_err(),
            StaticMeshError::EmptyIndices
        );
        assert!(matches!(
            StaticMesh::new(&vtx, &[[0, 1, 3]], &id),
            Err(StaticMeshError::IndexOutOfBounds { index: 3, .. })
        ));
        assert!(matches!(
            StaticMesh::new(&vtx, &[[0, 1, 1]], &id),
            Err(StaticMeshError::BadTriangle { triangle: 0, .. })
        ));
    }

    #[test]
    fn placement_is_baked() {
        let vtx = [
            Point::new(0.0, 0.0, 0.0),
            Point::new(0.0, 0.0, 1.0),
            Point::new(1.0, 0.0, 0.0),
        ];
        let pos = Isometry::translation(0.0, 2.0, 0.0);
        let mesh = StaticMesh::new(&vtx, &[[0, 1, 2]], &pos).unwrap();

        assert_relative_eq!(mesh.triangle(0).offset(), 2.0);
        assert_relative_eq!(mesh.aabb().mins, Point::new(0.0, 2.0, 0.0));
        assert_relative_eq!(mesh.triangle(0).normal().into_inner(), Vector::y());
    }
}
