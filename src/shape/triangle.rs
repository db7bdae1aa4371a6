//! Definition of the triangle shape.

use crate::bounding_volume::Aabb;
use crate::math::{Isometry, Point, Real, UnitVector, Vector};
use na::Unit;

/// Triangles whose doubled area falls below this threshold are rejected.
const DEGENERACY_THRESHOLD: Real = 1.0e-7;

/// Error returned when building a triangle from invalid vertices.
#[derive(thiserror::Error, Copy, Clone, Debug, PartialEq)]
pub enum TriangleError {
    /// The three vertices are (almost) collinear so the triangle has no well-defined normal.
    #[error("the triangle vertices are collinear or coincident (doubled area: {0})")]
    Degenerate(Real),
}

/// A triangle shape with a precomputed supporting plane.
///
/// A triangle is immutable once built: its normal is `(b - a) × (c - a)` normalized,
/// and `offset` is the signed distance of its plane to the origin along that normal.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(PartialEq, Debug, Copy, Clone)]
pub struct Triangle {
    a: Point<Real>,
    b: Point<Real>,
    c: Point<Real>,
    normal: UnitVector<Real>,
    offset: Real,
}

impl Triangle {
    /// Creates a triangle from three vertices, failing if it is degenerate.
    pub fn new(a: Point<Real>, b: Point<Real>, c: Point<Real>) -> Result<Triangle, TriangleError> {
        let scaled_normal = (b - a).cross(&(c - a));
        let normal = Unit::try_new(scaled_normal, DEGENERACY_THRESHOLD)
            .ok_or(TriangleError::Degenerate(scaled_normal.norm()))?;
        let offset = normal.dot(&a.coords);

        Ok(Triangle {
            a,
            b,
            c,
            normal,
            offset,
        })
    }

    /// The first vertex.
    #[inline]
    pub fn a(&self) -> &Point<Real> {
        &self.a
    }

    /// The second vertex.
    #[inline]
    pub fn b(&self) -> &Point<Real> {
        &self.b
    }

    /// The third vertex.
    #[inline]
    pub fn c(&self) -> &Point<Real> {
        &self.c
    }

    /// The three vertices of this triangle.
    #[inline]
    pub fn vertices(&self) -> [Point<Real>; 3] {
        [self.a, self.b, self.c]
    }

    /// The unit normal of this triangle, following a counter-clockwise winding.
    #[inline]
    pub fn normal(&self) -> &UnitVector<Real> {
        &self.normal
    }

    /// The distance from the origin to the plane of this triangle, along its normal.
    #[inline]
    pub fn offset(&self) -> Real {
        self.offset
    }

    /// The three edge vectors `b - a`, `c - b`, `a - c`.
    #[inline]
    pub fn edges(&self) -> [Vector<Real>; 3] {
        [self.b - self.a, self.c - self.b, self.a - self.c]
    }

    /// The barycenter of this triangle.
    #[inline]
    pub fn center(&self) -> Point<Real> {
        Point::from((self.a.coords + self.b.coords + self.c.coords) / 3.0)
    }

    /// The signed distance of `pt` to the plane of this triangle.
    #[inline]
    pub fn signed_distance_to_plane(&self, pt: &Point<Real>) -> Real {
        self.normal.dot(&pt.coords) - self.offset
    }

    /// The AABB of this triangle in its local frame.
    #[inline]
    pub fn local_aabb(&self) -> Aabb {
        Aabb::from_points(&[self.a, self.b, self.c])
    }

    /// Returns this triangle transformed by `m`.
    ///
    /// Isometries preserve the area so this never fails.
    pub fn transformed(&self, m: &Isometry<Real>) -> Triangle {
        let a = m * self.a;
        let normal = m.rotation * self.normal;

        Triangle {
            a,
            b: m * self.b,
            c: m * self.c,
            normal,
            offset: normal.dot(&a.coords),
        }
    }

    /// Computes the point of this triangle closest to `pt`.
    pub fn project_local_point(&self, pt: &Point<Real>) -> Point<Real> {
        let ab = self.b - self.a;
        let ac = self.c - self.a;
        let ap = pt - self.a;

        let d1 = ab.dot(&ap);
        let d2 = ac.dot(&ap);
        if d1 <= 0.0 && d2 <= 0.0 {
            return self.a;
        }

        let bp = pt - self.b;
        let d3 = ab.dot(&bp);
        let d4 = ac.dot(&bp);
        if d3 >= 0.0 && d4 <= d3 {
            return self.b;
        }

        let vc = d1 * d4 - d3 * d2;
        if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
            let v = d1 / (d1 - d3);
            return self.a + ab * v;
        }

        let cp = pt - self.c;
        let d5 = ab.dot(&cp);
        let d6 = ac.dot(&cp);
        if d6 >= 0.0 && d5 <= d6 {
            return self.c;
        }

        let vb = d5 * d2 - d1 * d6;
        if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
            let w = d2 / (d2 - d6);
            return self.a + ac * w;
        }

        let va = d3 * d6 - d5 * d4;
        if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
            let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
            return self.b + (self.c - self.b) * w;
        }

        let denom = 1.0 / (va + vb + vc);
        let v = vb * denom;
        let w = vc * denom;
        self.a + ab * v + ac * w
    }
}

#[cfg(test)]
mod test {
    use super::{Triangle, TriangleError};
    use crate::math::{Isometry, Point, Vector};

    #[test]
    fn degenerate_triangle_is_rejected() {
        let res = Triangle::new(
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 1.0, 1.0),
            Point::new(2.0, 2.0, 2.0),
        );
        assert!(matches!(res, Err(TriangleError::Degenerate(_))));
    }

    #[test]
    fn normal_and_offset() {
        let tri = Triangle::new(
            Point::new(0.0, 2.0, 0.0),
            Point::new(0.0, 2.0, 1.0),
            Point::new(1.0, 2.0, 0.0),
        )
        .unwrap();
        assert_relative_eq!(tri.normal().into_inner(), Vector::y());
        assert_relative_eq!(tri.offset(), 2.0);
        assert_relative_eq!(tri.signed_distance_to_plane(&Point::new(5.0, 3.0, 5.0)), 1.0);
    }

    #[test]
    fn closest_point_regions() {
        let tri = Triangle::new(
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 0.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
        )
        .unwrap();

        // Face region.
        assert_relative_eq!(
            tri.project_local_point(&Point::new(0.2, 0.2, 3.0)),
            Point::new(0.2, 0.2, 0.0)
        );
        // Vertex region.
        assert_relative_eq!(
            tri.project_local_point(&Point::new(-1.0, -1.0, 0.0)),
            Point::new(0.0, 0.0, 0.0)
        );
        // Edge region.
        assert_relative_eq!(
            tri.project_local_point(&Point::new(0.5, -2.0, 1.0)),
            Point::new(0.5, 0.0, 0.0)
        );
    }

    #[test]
    fn transformed_triangle_keeps_its_plane() {
        let tri = Triangle::new(
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 0.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
        )
        .unwrap();
        let pos = Isometry::new(Vector::new(1.0, -2.0, 3.0), Vector::new(0.1, 0.2, 0.3));
        let moved = tri.transformed(&pos);

        for v in moved.vertices() {
            assert_relative_eq!(moved.signed_distance_to_plane(&v), 0.0, epsilon = 1.0e-5);
        }
    }
}
