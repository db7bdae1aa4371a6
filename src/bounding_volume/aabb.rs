//! Axis Aligned Bounding Box.

use crate::bounding_volume::BoundingVolume;
use crate::math::{Isometry, Point, Real, Vector};

/// An Axis Aligned Bounding Box.
///
/// The box is described by its two extremal corners. Once initialized with
/// real data, `mins` is componentwise smaller than or equal to `maxs`.
///
/// Intersection is an open-interval test: two boxes sharing only a face, an edge
/// or a corner are not considered intersecting. Containment is closed, so every
/// box contains itself.
#[derive(Debug, PartialEq, Copy, Clone)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[repr(C)]
pub struct Aabb {
    /// The point with the smallest coordinates on each axis.
    pub mins: Point<Real>,
    /// The point with the largest coordinates on each axis.
    pub maxs: Point<Real>,
}

impl Aabb {
    /// Creates a new AABB from its minimum and maximum corners.
    #[inline]
    pub fn new(mins: Point<Real>, maxs: Point<Real>) -> Aabb {
        Aabb { mins, maxs }
    }

    /// Creates an invalid AABB with `mins` components set to `Real::MAX`
    /// and `maxs` components set to `-Real::MAX`.
    ///
    /// This is the identity of [`BoundingVolume::merge`].
    #[inline]
    pub fn new_invalid() -> Self {
        Self::new(
            Vector::repeat(Real::MAX).into(),
            Vector::repeat(-Real::MAX).into(),
        )
    }

    /// Creates a new AABB from its center and its half-extents.
    #[inline]
    pub fn from_half_extents(center: Point<Real>, half_extents: Vector<Real>) -> Self {
        Self::new(center - half_extents, center + half_extents)
    }

    /// Computes the smallest AABB enclosing the given points.
    pub fn from_points<'a, I>(pts: I) -> Self
    where
        I: IntoIterator<Item = &'a Point<Real>>,
    {
        let mut result = Self::new_invalid();

        for pt in pts {
            result.take_point(*pt);
        }

        result
    }

    /// The half-extents of this AABB.
    #[inline]
    pub fn half_extents(&self) -> Vector<Real> {
        (self.maxs - self.mins) * 0.5
    }

    /// The extents of this AABB.
    #[inline]
    pub fn extents(&self) -> Vector<Real> {
        self.maxs - self.mins
    }

    /// The volume of this AABB.
    #[inline]
    pub fn volume(&self) -> Real {
        let extents = self.extents();
        extents.x * extents.y * extents.z
    }

    /// The total area of the six faces of this AABB.
    ///
    /// This is the cost metric used by the surface area heuristic of the
    /// [`Bvh`](crate::partitioning::Bvh).
    #[inline]
    pub fn surface_area(&self) -> Real {
        let extents = self.extents();
        2.0 * (extents.x * extents.y + extents.y * extents.z + extents.z * extents.x)
    }

    /// Enlarges this AABB so it also contains the point `pt`.
    #[inline]
    pub fn take_point(&mut self, pt: Point<Real>) {
        self.mins = self.mins.inf(&pt);
        self.maxs = self.maxs.sup(&pt);
    }

    /// Does this AABB contain the given point? Points on the boundary are contained.
    #[inline]
    pub fn contains_local_point(&self, point: &Point<Real>) -> bool {
        (0..3).all(|i| point[i] >= self.mins[i] && point[i] <= self.maxs[i])
    }

    /// Computes the AABB bounding `self` transformed by `m`.
    #[inline]
    pub fn transform_by(&self, m: &Isometry<Real>) -> Self {
        let center = m * self.center();
        let ws_half_extents = m
            .rotation
            .to_rotation_matrix()
            .matrix()
            .abs()
            * self.half_extents();

        Aabb::from_half_extents(center, ws_half_extents)
    }

    /// Computes the AABB translated by `translation`.
    #[inline]
    pub fn translated(mut self, translation: &Vector<Real>) -> Self {
        self.mins += translation;
        self.maxs += translation;
        self
    }

    /// The eight corners of this AABB.
    pub fn vertices(&self) -> [Point<Real>; 8] {
        [
            Point::new(self.mins.x, self.mins.y, self.mins.z),
            Point::new(self.maxs.x, self.mins.y, self.mins.z),
            Point::new(self.maxs.x, self.maxs.y, self.mins.z),
            Point::new(self.mins.x, self.maxs.y, self.mins.z),
            Point::new(self.mins.x, self.mins.y, self.maxs.z),
            Point::new(self.maxs.x, self.mins.y, self.maxs.z),
            Point::new(self.maxs.x, self.maxs.y, self.maxs.z),
            Point::new(self.mins.x, self.maxs.y, self.maxs.z),
        ]
    }
}

impl BoundingVolume for Aabb {
    #[inline]
    fn center(&self) -> Point<Real> {
        na::center(&self.mins, &self.maxs)
    }

    #[inline]
    fn intersects(&self, other: &Aabb) -> bool {
        (0..3).all(|i| self.mins[i] < other.maxs[i] && other.mins[i] < self.maxs[i])
    }

    #[inline]
    fn contains(&self, other: &Aabb) -> bool {
        (0..3).all(|i| self.mins[i] <= other.mins[i] && self.maxs[i] >= other.maxs[i])
    }

    #[inline]
    fn merge(&mut self, other: &Aabb) {
        self.mins = self.mins.inf(&other.mins);
        self.maxs = self.maxs.sup(&other.maxs);
    }

    #[inline]
    fn merged(&self, other: &Aabb) -> Aabb {
        Aabb {
            mins: self.mins.inf(&other.mins),
            maxs: self.maxs.sup(&other.maxs),
        }
    }

    #[inline]
    fn loosen(&mut self, amount: Real) {
        assert!(amount >= 0.0, "The loosening margin must be positive.");
        self.mins += Vector::repeat(-amount);
        self.maxs += Vector::repeat(amount);
    }

    #[inline]
    fn loosened(&self, amount: Real) -> Aabb {
        assert!(amount >= 0.0, "The loosening margin must be positive.");
        Aabb {
            mins: self.mins + Vector::repeat(-amount),
            maxs: self.maxs + Vector::repeat(amount),
        }
    }
}
