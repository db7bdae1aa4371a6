use crate::bounding_volume::Aabb;
use crate::math::{Isometry, Point, Real, Vector};

/// A sphere centered at the origin of its local frame.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(PartialEq, Debug, Copy, Clone)]
pub struct Ball {
    /// The sphere radius.
    pub radius: Real,
}

impl Ball {
    /// A ball of the given radius.
    #[inline]
    pub fn new(radius: Real) -> Ball {
        Ball { radius }
    }

    /// The world-space AABB of this ball placed at `pos`.
    ///
    /// Rotations leave a sphere unchanged so only the translation matters.
    #[inline]
    pub fn aabb(&self, pos: &Isometry<Real>) -> Aabb {
        let center = Point::from(pos.translation.vector);
        Aabb::from_half_extents(center, Vector::repeat(self.radius))
    }
}
