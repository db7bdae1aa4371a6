use crate::math::{Isometry, Real, Vector};
use crate::query::contact::{ContactCandidates, TrackedContact};
use crate::shape::{Cuboid, Triangle};

/// Contact between a cuboid (first shape) and a world-space triangle (second shape).
///
/// Each vertex of the cuboid is tested against the face of the triangle: a vertex generates a
/// contact if its projection on the triangle plane lies inside the triangle and its signed
/// distance to the plane is smaller than `prediction`. Vertices further behind the plane than
/// the cuboid diagonal are ignored, as they belong to the back side of the geometry.
pub fn contact_cuboid_triangle(
    pos1: &Isometry<Real>,
    cuboid1: &Cuboid,
    triangle2: &Triangle,
    prediction: Real,
) -> Option<(Vector<Real>, ContactCandidates)> {
    let face_normal = triangle2.normal().into_inner();
    let max_depth = cuboid1.half_extents.norm() * 2.0;
    let mut candidates = ContactCandidates::new();

    for (i, vtx) in cuboid1.vertices().iter().enumerate() {
        let world_vtx = pos1 * vtx;
        let dist = triangle2.signed_distance_to_plane(&world_vtx);

        if dist > prediction || dist < -max_depth {
            continue;
        }

        let on_plane = world_vtx - face_normal * dist;
        let proj = triangle2.project_local_point(&on_plane);

        if (proj - on_plane).norm_squared() <= Real::EPSILON {
            candidates.push(TrackedContact::new(world_vtx, proj, dist, i as u32));
        }
    }

    if candidates.is_empty() {
        None
    } else {
        Some((-face_normal, candidates))
    }
}

#[cfg(test)]
mod test {
    use super::contact_cuboid_triangle;
    use crate::math::{Isometry, Point, Vector};
    use crate::shape::{Cuboid, Triangle};

    #[test]
    fn cuboid_resting_on_triangle() {
        let ground = Triangle::new(
            Point::new(-10.0, 0.0, -10.0),
            Point::new(-10.0, 0.0, 10.0),
            Point::new(10.0, 0.0, -10.0),
        )
        .unwrap();
        let cuboid = Cuboid::new(Vector::new(0.5, 0.5, 0.5));
        let pos = Isometry::translation(-2.0, 0.48, -2.0);

        let (normal, pts) = contact_cuboid_triangle(&pos, &cuboid, &ground, 0.0).unwrap();
        assert_relative_eq!(normal, -Vector::y());
        assert_eq!(pts.len(), 4);
        for pt in &pts {
            assert_relative_eq!(pt.dist, -0.02, epsilon = 1.0e-5);
        }
    }
}
