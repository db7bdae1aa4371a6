use crate::math::{Isometry, Point, Real, Vector};
use crate::query::contact::{ContactCandidates, TrackedContact};
use crate::shape::{Ball, Triangle};

/// Contact between a ball (first shape) and a world-space triangle (second shape).
///
/// A ball whose center lies behind the face of the triangle is pushed back toward the front
/// side, so that a ball sinking through a ground mesh is recovered instead of falling through.
pub fn contact_ball_triangle(
    pos1: &Isometry<Real>,
    ball1: &Ball,
    triangle2: &Triangle,
    prediction: Real,
) -> Option<(Vector<Real>, ContactCandidates)> {
    let center = Point::from(pos1.translation.vector);
    let proj = triangle2.project_local_point(&center);
    let delta = center - proj;
    let distance = delta.norm();
    let face_normal = triangle2.normal().into_inner();

    let (normal_to_ball, center_dist) = if distance <= Real::EPSILON {
        (face_normal, 0.0)
    } else if triangle2.signed_distance_to_plane(&center) < 0.0
        && delta.dot(&face_normal) <= -distance * 0.999
    {
        (face_normal, -distance)
    } else {
        (delta / distance, distance)
    };

    let dist = center_dist - ball1.radius;

    if dist > prediction {
        return None;
    }

    let normal = -normal_to_ball;
    let point1 = center + normal * ball1.radius;
    let mut candidates = ContactCandidates::new();
    candidates.push(TrackedContact::new(point1, proj, dist, 0));
    Some((normal, candidates))
}
