use crate::bounding_volume::{Aabb, BoundingVolume};
use crate::math::{Real, Vector};
use crate::shape::Triangle;

/// Computes the separation of a triangle and an AABB along `axis`.
///
/// Returns `max(projected triangle interval lower bound - box radius, -box radius - projected
/// triangle interval upper bound)`: a strictly positive value means `axis` separates both shapes.
/// The triangle vertices must be expressed relative to the box center.
#[inline]
fn separation_along_axis(
    verts: &[Vector<Real>; 3],
    half_extents: &Vector<Real>,
    axis: &Vector<Real>,
) -> Real {
    let p0 = verts[0].dot(axis);
    let p1 = verts[1].dot(axis);
    let p2 = verts[2].dot(axis);
    let min = p0.min(p1).min(p2);
    let max = p0.max(p1).max(p2);
    let radius = half_extents.abs().dot(&axis.abs());

    (min - radius).max(-radius - max)
}

/// Finds the largest separation between a triangle and an AABB among the 13 candidate axes:
/// the three box face normals, the triangle normal, and the nine cross products of the box axes
/// with the triangle edges.
///
/// A strictly positive result means the shapes are disjoint.
pub fn triangle_aabb_separation(triangle: &Triangle, aabb: &Aabb) -> Real {
    let center = aabb.center();
    let half_extents = aabb.half_extents();
    let verts = [
        triangle.a() - center,
        triangle.b() - center,
        triangle.c() - center,
    ];

    let mut max_separation = -Real::MAX;

    for i in 0..3 {
        let axis = Vector::ith(i, 1.0);
        max_separation = max_separation.max(separation_along_axis(&verts, &half_extents, &axis));
    }

    max_separation = max_separation.max(separation_along_axis(
        &verts,
        &half_extents,
        triangle.normal(),
    ));

    for edge in triangle.edges() {
        for i in 0..3 {
            let axis = Vector::<Real>::ith(i, 1.0).cross(&edge);

            // Parallel edge and box axis: the cross product gives no information.
            if axis.norm_squared() > Real::EPSILON {
                max_separation =
                    max_separation.max(separation_along_axis(&verts, &half_extents, &axis));
            }
        }
    }

    max_separation
}

/// Tests if a triangle intersects an AABB.
///
/// Only a strict separation along one of the tested axes rejects the pair: a triangle touching
/// the boundary of the box is reported as intersecting it.
pub fn intersection_test_triangle_aabb(triangle: &Triangle, aabb: &Aabb) -> bool {
    triangle_aabb_separation(triangle, aabb) <= 0.0
}
