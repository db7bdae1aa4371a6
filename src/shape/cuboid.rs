//! Cuboid shape.

use crate::bounding_volume::Aabb;
use crate::math::{Isometry, Point, Real, Vector};

/// Shape of a box.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(PartialEq, Debug, Copy, Clone)]
#[repr(C)]
pub struct Cuboid {
    /// The half-extents of the cuboid.
    pub half_extents: Vector<Real>,
}

impl Cuboid {
    /// Creates a new box from its half-extents. Half-extents are the box half-width along each
    /// axis. Each half-extent must be positive.
    #[inline]
    pub fn new(half_extents: Vector<Real>) -> Cuboid {
        Cuboid { half_extents }
    }

    /// Computes the world-space AABB of this cuboid transformed by `pos`.
    #[inline]
    pub fn aabb(&self, pos: &Isometry<Real>) -> Aabb {
        self.local_aabb().transform_by(pos)
    }

    /// Computes the local-space AABB of this cuboid.
    #[inline]
    pub fn local_aabb(&self) -> Aabb {
        Aabb::from_half_extents(Point::origin(), self.half_extents)
    }

    /// The eight vertices of this cuboid, in its local frame.
    pub fn vertices(&self) -> [Point<Real>; 8] {
        self.local_aabb().vertices()
    }

    /// Projects a local point on the boundary of this cuboid.
    ///
    /// Returns the projection, the outward unit normal at the projection, and the signed
    /// distance from the boundary to the point (negative if the point is inside).
    pub fn project_local_point(&self, pt: &Point<Real>) -> (Point<Real>, Vector<Real>, Real) {
        let clamped = pt.coords.sup(&-self.half_extents).inf(&self.half_extents);

        if clamped != pt.coords {
            let delta = pt.coords - clamped;
            let dist = delta.norm();
            return (Point::from(clamped), delta / dist, dist);
        }

        // The point is inside: push it out through the closest face.
        let depths = self.half_extents - pt.coords.abs();
        let axis = depths.imin();
        let sign = if pt[axis] < 0.0 { -1.0 } else { 1.0 };
        let mut normal = Vector::zeros();
        normal[axis] = sign;
        let mut proj = *pt;
        proj[axis] = self.half_extents[axis] * sign;

        (proj, normal, -depths[axis])
    }
}
