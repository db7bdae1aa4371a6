use crate::math::{Isometry, Point, Real, Vector};

/// A half-line `origin + dir * t`, `t ≥ 0`.
///
/// `dir` may have any nonzero length. Times of impact are expressed in multiples of
/// `dir`, so a unit direction makes them distances.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Ray {
    /// Where the ray starts.
    pub origin: Point<Real>,
    /// Where the ray heads to.
    pub dir: Vector<Real>,
}

impl Ray {
    /// A ray leaving `origin` along `dir`.
    pub fn new(origin: Point<Real>, dir: Vector<Real>) -> Ray {
        Ray { origin, dir }
    }

    /// The point reached at parameter `t`.
    #[inline]
    pub fn point_at(&self, t: Real) -> Point<Real> {
        self.origin + self.dir * t
    }

    /// Expresses this ray in the local frame of an object placed at `m`.
    #[inline]
    pub fn inverse_transform_by(&self, m: &Isometry<Real>) -> Self {
        Ray {
            origin: m.inverse_transform_point(&self.origin),
            dir: m.inverse_transform_vector(&self.dir),
        }
    }
}

/// Where and how a ray hit something.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct RayIntersection {
    /// The hit parameter: the hit point is `ray.point_at(time_of_impact)`.
    pub time_of_impact: Real,
    /// Surface normal at the hit point, facing the ray origin.
    ///
    /// Zero when the ray starts inside of a solid.
    pub normal: Vector<Real>,
}

impl RayIntersection {
    /// Bundles a hit parameter with its normal.
    #[inline]
    pub fn new(time_of_impact: Real, normal: Vector<Real>) -> RayIntersection {
        RayIntersection {
            time_of_impact,
            normal,
        }
    }
}
