use na::ComplexField;

use crate::math::{Point, Real, Vector};
use crate::query::{Ray, RayIntersection};
use crate::shape::Ball;
use num::Zero;

impl Ball {
    /// Computes the intersection of a ray with this ball, centered at the origin.
    ///
    /// If `solid` is `true` and the ray starts inside of the ball, the time of impact is zero
    /// and so is the normal. Otherwise the ray exits through the ball surface and the normal
    /// points inward.
    #[inline]
    pub fn cast_local_ray(&self, ray: &Ray, max_toi: Real, solid: bool) -> Option<RayIntersection> {
        let (inside, toi) = ray_toi_with_ball(&Point::origin(), self.radius, ray, solid);
        let toi = toi.filter(|toi| *toi <= max_toi)?;

        let normal = if inside && solid {
            Vector::zeros()
        } else {
            let normal = ray.point_at(toi).coords.normalize();
            if inside {
                -normal
            } else {
                normal
            }
        };

        Some(RayIntersection::new(toi, normal))
    }
}

/// Computes the time of impact of a ray on a ball.
///
/// The first result element is `true` if the ray started inside of the ball.
#[inline]
pub fn ray_toi_with_ball(
    center: &Point<Real>,
    radius: Real,
    ray: &Ray,
    solid: bool,
) -> (bool, Option<Real>) {
    let dcenter = ray.origin - *center;

    let a = ray.dir.norm_squared();
    let b = dcenter.dot(&ray.dir);
    let c = dcenter.norm_squared() - radius * radius;

    // Special case for when the dir is zero.
    if a.is_zero() {
        if c > 0.0 {
            return (false, None);
        } else {
            return (true, Some(0.0));
        }
    }

    if c > 0.0 && b > 0.0 {
        (false, None)
    } else {
        let delta = b * b - a * c;

        if delta < 0.0 {
            // no solution
            (false, None)
        } else {
            let t = (-b - ComplexField::sqrt(delta)) / a;

            if t <= 0.0 {
                // origin inside of the ball
                if solid {
                    (true, Some(0.0))
                } else {
                    (true, Some((-b + delta.sqrt()) / a))
                }
            } else {
                (false, Some(t))
            }
        }
    }
}

#[cfg(test)]
mod test {
    use crate::math::{Point, Vector};
    use crate::query::Ray;
    use crate::shape::Ball;

    #[test]
    fn ray_ball_outside_and_inside() {
        let ball = Ball::new(1.0);
        let ray = Ray::new(Point::new(-3.0, 0.0, 0.0), Vector::x());
        let hit = ball.cast_local_ray(&ray, 10.0, true).unwrap();
        assert_relative_eq!(hit.time_of_impact, 2.0);
        assert_relative_eq!(hit.normal, -Vector::x());
        assert!(ball.cast_local_ray(&ray, 1.0, true).is_none());

        let inner = Ray::new(Point::origin(), Vector::y());
        assert_relative_eq!(ball.cast_local_ray(&inner, 10.0, true).unwrap().time_of_impact, 0.0);
        let exit = ball.cast_local_ray(&inner, 10.0, false).unwrap();
        assert_relative_eq!(exit.time_of_impact, 1.0);
        assert_relative_eq!(exit.normal, -Vector::y());
    }

    #[test]
    fn ray_toi_with_offset_ball() {
        use crate::query::ray_toi_with_ball;

        let center = Point::new(5.0, 1.0, 0.0);
        let ray = Ray::new(Point::new(0.0, 1.0, 0.0), Vector::x() * 2.0);
        let (inside, toi) = ray_toi_with_ball(&center, 1.0, &ray, true);
        assert!(!inside);
        assert_relative_eq!(toi.unwrap(), 2.0);

        let away = Ray::new(Point::new(0.0, 1.0, 0.0), -Vector::x());
        assert_eq!(ray_toi_with_ball(&center, 1.0, &away, true), (false, None));
    }
}
