use crate::math::Real;
use crate::query::{Ray, RayIntersection};
use crate::shape::Triangle;

impl Triangle {
    /// Computes the intersection between this triangle and a ray.
    ///
    /// With `backface_culling` enabled, rays reaching the triangle from the side opposite to
    /// its normal are ignored. The returned normal always points toward the ray origin.
    pub fn cast_local_ray(
        &self,
        ray: &Ray,
        max_toi: Real,
        backface_culling: bool,
    ) -> Option<RayIntersection> {
        let ab = self.b() - self.a();
        let ac = self.c() - self.a();

        let n = ab.cross(&ac);
        let d = n.dot(&ray.dir);

        // The normal and the ray direction are orthogonal.
        if d == 0.0 || (backface_culling && d > 0.0) {
            return None;
        }

        let ap = ray.origin - self.a();
        let t = ap.dot(&n);

        // The ray does not intersect the halfspace defined by the triangle.
        if (t < 0.0 && d < 0.0) || (t > 0.0 && d > 0.0) {
            return None;
        }

        let d_abs = d.abs();
        let e = -ray.dir.cross(&ap);

        let (v, w) = if t < 0.0 {
            (-ac.dot(&e), ab.dot(&e))
        } else {
            (ac.dot(&e), -ab.dot(&e))
        };

        if v < 0.0 || v > d_abs || w < 0.0 || v + w > d_abs {
            return None;
        }

        let toi = t.abs() / d_abs;

        if toi > max_toi {
            return None;
        }

        let normal = if d < 0.0 {
            self.normal().into_inner()
        } else {
            -self.normal().into_inner()
        };

        Some(RayIntersection::new(toi, normal))
    }
}

#[cfg(test)]
mod test {
    use crate::math::{Point, Vector};
    use crate::query::Ray;
    use crate::shape::Triangle;

    fn ground() -> Triangle {
        Triangle::new(
            Point::new(-1.0, 0.0, -1.0),
            Point::new(-1.0, 0.0, 3.0),
            Point::new(3.0, 0.0, -1.0),
        )
        .unwrap()
    }

    #[test]
    fn ray_hits_front_face() {
        let ray = Ray::new(Point::new(0.0, 2.0, 0.0), -Vector::y());
        let hit = ground().cast_local_ray(&ray, 10.0, true).unwrap();
        assert_relative_eq!(hit.time_of_impact, 2.0);
        assert_relative_eq!(hit.normal, Vector::y());
    }

    #[test]
    fn backface_culling() {
        let ray = Ray::new(Point::new(0.0, -2.0, 0.0), Vector::y());
        assert!(ground().cast_local_ray(&ray, 10.0, true).is_none());

        let hit = ground().cast_local_ray(&ray, 10.0, false).unwrap();
        assert_relative_eq!(hit.time_of_impact, 2.0);
        assert_relative_eq!(hit.normal, -Vector::y());
    }

    #[test]
    fn ray_misses() {
        let outside = Ray::new(Point::new(5.0, 2.0, 5.0), -Vector::y());
        let too_short = Ray::new(Point::new(0.0, 2.0, 0.0), -Vector::y());
        assert!(ground().cast_local_ray(&outside, 10.0, true).is_none());
        assert!(ground().cast_local_ray(&too_short, 1.0, true).is_none());
    }
}
