use crate::math::{Real, Vector};
use crate::query::{Ray, RayIntersection};
use crate::shape::Cuboid;

impl Cuboid {
    /// Computes the intersection of a ray with this cuboid, centered at the origin.
    ///
    /// If `solid` is `true` and the ray starts inside of the cuboid, the time of impact is zero
    /// and so is the normal. Otherwise the ray exits through a face and the normal points
    /// inward.
    pub fn cast_local_ray(&self, ray: &Ray, max_toi: Real, solid: bool) -> Option<RayIntersection> {
        let aabb = self.local_aabb();
        let (t0, t1) = aabb.clip_ray(ray, max_toi)?;
        let inside = aabb.contains_local_point(&ray.origin);

        if inside && solid {
            return Some(RayIntersection::new(0.0, Vector::zeros()));
        }

        let toi = if inside { t1 } else { t0 };
        let pt = ray.point_at(toi);

        // The face hit is the one closest to the impact point.
        let mut best_axis = 0;
        let mut best_gap = Real::MAX;
        for i in 0..3 {
            let gap = self.half_extents[i] - pt[i].abs();
            if gap < best_gap {
                best_gap = gap;
                best_axis = i;
            }
        }

        let mut normal = Vector::zeros();
        normal[best_axis] = pt[best_axis].signum();

        if inside {
            normal = -normal;
        }

        Some(RayIntersection::new(toi, normal))
    }
}

#[cfg(test)]
mod test {
    use crate::math::{Point, Vector};
    use crate::query::Ray;
    use crate::shape::Cuboid;

    #[test]
    fn ray_cuboid_faces() {
        let cuboid = Cuboid::new(Vector::new(1.0, 2.0, 3.0));
        let ray = Ray::new(Point::new(0.5, 10.0, 0.0), -Vector::y());
        let hit = cuboid.cast_local_ray(&ray, 100.0, true).unwrap();
        assert_relative_eq!(hit.time_of_impact, 8.0);
        assert_relative_eq!(hit.normal, Vector::y());

        let inner = Ray::new(Point::origin(), Vector::z());
        assert_eq!(cuboid.cast_local_ray(&inner, 100.0, true).unwrap().time_of_impact, 0.0);
        let exit = cuboid.cast_local_ray(&inner, 100.0, false).unwrap();
        assert_relative_eq!(exit.time_of_impact, 3.0);
        assert_relative_eq!(exit.normal, -Vector::z());

        let miss = Ray::new(Point::new(5.0, 10.0, 0.0), -Vector::y());
        assert!(cuboid.cast_local_ray(&miss, 100.0, true).is_none());
    }
}
