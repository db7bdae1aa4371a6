use core::mem;

use crate::bounding_volume::Aabb;
use crate::math::Real;
use crate::query::Ray;
use num::Zero;

impl Aabb {
    /// Clips the segment `[0, max_toi]` of `ray` against this box.
    ///
    /// Returns the parameters at which the ray enters and exits the box, both clamped to
    /// `[0, max_toi]`, or `None` if the ray misses it.
    pub fn clip_ray(&self, ray: &Ray, max_toi: Real) -> Option<(Real, Real)> {
        let mut tmin: Real = 0.0;
        let mut tmax: Real = max_toi;

        for i in 0usize..3 {
            if ray.dir[i].is_zero() {
                if ray.origin[i] < self.mins[i] || ray.origin[i] > self.maxs[i] {
                    return None;
                }
            } else {
                let denom = 1.0 / ray.dir[i];
                let mut inter_with_near_halfspace = (self.mins[i] - ray.origin[i]) * denom;
                let mut inter_with_far_halfspace = (self.maxs[i] - ray.origin[i]) * denom;

                if inter_with_near_halfspace > inter_with_far_halfspace {
                    mem::swap(
                        &mut inter_with_near_halfspace,
                        &mut inter_with_far_halfspace,
                    )
                }

                tmin = tmin.max(inter_with_near_halfspace);
                tmax = tmax.min(inter_with_far_halfspace);

                if tmin > tmax {
                    // This covers the case where tmax is negative because tmin is
                    // initialized at zero.
                    return None;
                }
            }
        }

        Some((tmin, tmax))
    }

    /// Computes the time of impact of `ray` with this box, considered solid.
    #[inline]
    pub fn cast_local_ray(&self, ray: &Ray, max_toi: Real) -> Option<Real> {
        self.clip_ray(ray, max_toi).map(|(tmin, _)| tmin)
    }
}
