use crate::math::{Isometry, Real, Vector};
use crate::query::contact::{ContactCandidates, TrackedContact};
use crate::shape::Ball;

/// Contact between balls.
///
/// The normal points from the first ball toward the second one. Two balls with coincident
/// centers are separated along the `+Y` axis.
#[inline]
pub fn contact_ball_ball(
    pos1: &Isometry<Real>,
    b1: &Ball,
    pos2: &Isometry<Real>,
    b2: &Ball,
    prediction: Real,
) -> Option<(Vector<Real>, ContactCandidates)> {
    let center1 = pos1.translation.vector;
    let center2 = pos2.translation.vector;
    let delta = center2 - center1;
    let distance_squared = delta.norm_squared();
    let sum_radius = b1.radius + b2.radius;
    let sum_radius_with_error = sum_radius + prediction;

    if distance_squared < sum_radius_with_error * sum_radius_with_error {
        let distance = distance_squared.sqrt();
        let normal = if distance != 0.0 {
            delta / distance
        } else {
            Vector::y()
        };

        let point1 = (center1 + normal * b1.radius).into();
        let point2 = (center2 - normal * b2.radius).into();
        let mut candidates = ContactCandidates::new();
        candidates.push(TrackedContact::new(point1, point2, distance - sum_radius, 0));
        Some((normal, candidates))
    } else {
        None
    }
}

#[cfg(test)]
mod test {
    use super::contact_ball_ball;
    use crate::math::{Isometry, Vector};
    use crate::shape::Ball;

    #[test]
    fn penetrating_balls() {
        let pos1 = Isometry::translation(0.0, 0.0, 0.0);
        let pos2 = Isometry::translation(1.5, 0.0, 0.0);
        let (normal, pts) =
            contact_ball_ball(&pos1, &Ball::new(1.0), &pos2, &Ball::new(1.0), 0.0).unwrap();

        assert_relative_eq!(normal, Vector::x());
        assert_eq!(pts.len(), 1);
        assert_relative_eq!(pts[0].dist, -0.5);
    }

    #[test]
    fn prediction_distance() {
        let pos1 = Isometry::translation(0.0, 0.0, 0.0);
        let pos2 = Isometry::translation(0.0, 2.1, 0.0);
        let b = Ball::new(1.0);

        assert!(contact_ball_ball(&pos1, &b, &pos2, &b, 0.05).is_none());
        let (_, pts) = contact_ball_ball(&pos1, &b, &pos2, &b, 0.2).unwrap();
        assert_relative_eq!(pts[0].dist, 0.1, epsilon = 1.0e-5);
    }
}
