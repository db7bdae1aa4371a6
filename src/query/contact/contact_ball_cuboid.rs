use crate::math::{Isometry, Point, Real, Vector};
use crate::query::contact::{ContactCandidates, TrackedContact};
use crate::shape::{Ball, Cuboid};

/// Contact between a cuboid (first shape) and a ball (second shape).
pub fn contact_cuboid_ball(
    pos1: &Isometry<Real>,
    cuboid1: &Cuboid,
    pos2: &Isometry<Real>,
    ball2: &Ball,
    prediction: Real,
) -> Option<(Vector<Real>, ContactCandidates)> {
    let local_center = pos1.inverse_transform_point(&Point::from(pos2.translation.vector));
    let (proj, local_normal, dist_to_center) = cuboid1.project_local_point(&local_center);
    let dist = dist_to_center - ball2.radius;

    if dist > prediction {
        return None;
    }

    let normal = pos1 * local_normal;
    let point1 = pos1 * proj;
    let point2 = Point::from(pos2.translation.vector) - normal * ball2.radius;
    let mut candidates = ContactCandidates::new();
    candidates.push(TrackedContact::new(point1, point2, dist, 0));
    Some((normal, candidates))
}

/// Contact between a ball (first shape) and a cuboid (second shape).
pub fn contact_ball_cuboid(
    pos1: &Isometry<Real>,
    ball1: &Ball,
    pos2: &Isometry<Real>,
    cuboid2: &Cuboid,
    prediction: Real,
) -> Option<(Vector<Real>, ContactCandidates)> {
    contact_cuboid_ball(pos2, cuboid2, pos1, ball1, prediction).map(|(normal, candidates)| {
        (-normal, candidates.into_iter().map(|c| c.flipped()).collect())
    })
}

#[cfg(test)]
mod test {
    use super::{contact_ball_cuboid, contact_cuboid_ball};
    use crate::math::{Isometry, Vector};
    use crate::shape::{Ball, Cuboid};

    #[test]
    fn ball_resting_on_cuboid() {
        let cuboid = Cuboid::new(Vector::new(2.0, 0.5, 2.0));
        let ball = Ball::new(0.5);
        let pos_cuboid = Isometry::identity();
        let pos_ball = Isometry::translation(0.3, 0.95, -0.2);

        let (normal, pts) =
            contact_cuboid_ball(&pos_cuboid, &cuboid, &pos_ball, &ball, 0.0).unwrap();
        assert_relative_eq!(normal, Vector::y());
        assert_relative_eq!(pts[0].dist, -0.05, epsilon = 1.0e-5);

        let (normal, pts) =
            contact_ball_cuboid(&pos_ball, &ball, &pos_cuboid, &cuboid, 0.0).unwrap();
        assert_relative_eq!(normal, -Vector::y());
        assert_relative_eq!(pts[0].point2.y, 0.5, epsilon = 1.0e-5);
    }

    #[test]
    fn ball_center_inside_cuboid() {
        let cuboid = Cuboid::new(Vector::new(1.0, 1.0, 1.0));
        let ball = Ball::new(0.25);
        let pos_ball = Isometry::translation(0.9, 0.0, 0.0);

        let (normal, pts) =
            contact_cuboid_ball(&Isometry::identity(), &cuboid, &pos_ball, &ball, 0.0).unwrap();
        assert_relative_eq!(normal, Vector::x());
        assert_relative_eq!(pts[0].dist, -0.35, epsilon = 1.0e-5);
    }
}
