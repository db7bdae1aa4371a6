use crate::math::{Isometry, Point, Real, Vector};
use crate::query::Unsupported;
use crate::shape::{Shape, TypedShape};
use smallvec::SmallVec;

/// Contact points produced by a single contact generator, before reduction.
pub type ContactCandidates = SmallVec<[TrackedContact; 8]>;

/// A single contact point between two shapes.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct TrackedContact {
    /// The contact point on the first shape, in world-space.
    pub point1: Point<Real>,
    /// The contact point on the second shape, in world-space.
    pub point2: Point<Real>,
    /// The signed distance between both points along the manifold normal.
    ///
    /// Negative if the shapes are penetrating.
    pub dist: Real,
    /// Identifies the feature pair that generated this contact across frames.
    pub fid: u32,
    /// The impulse applied along the normal at this contact during the last solve.
    pub normal_impulse: Real,
    /// The impulses applied along the two tangents at this contact during the last solve.
    pub tangent_impulses: [Real; 2],
}

impl TrackedContact {
    /// Creates a new contact point with zero accumulated impulses.
    pub fn new(point1: Point<Real>, point2: Point<Real>, dist: Real, fid: u32) -> Self {
        Self {
            point1,
            point2,
            dist,
            fid,
            normal_impulse: 0.0,
            tangent_impulses: [0.0; 2],
        }
    }

    /// Swaps the roles of the two shapes.
    #[must_use]
    pub fn flipped(mut self) -> Self {
        core::mem::swap(&mut self.point1, &mut self.point2);
        self
    }
}

/// A set of contact points sharing the same normal.
///
/// The storage size is fixed at creation by `capacity`: manifolds are recycled by the
/// pair bookkeeping in pools keyed by that capacity.
#[derive(Clone, Debug)]
pub struct ContactManifold {
    /// The contact normal, pointing from the first shape toward the second one.
    pub normal: Vector<Real>,
    /// The contact points. Never longer than the manifold capacity.
    pub points: Vec<TrackedContact>,
    capacity: usize,
}

impl ContactManifold {
    /// Creates an empty manifold able to hold up to `capacity` points.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            normal: Vector::zeros(),
            points: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// The maximum number of points this manifold can hold.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Does this manifold contain any contact point?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Removes all the contact points, keeping the allocated storage.
    pub fn clear(&mut self) {
        self.normal = Vector::zeros();
        self.points.clear();
    }

    /// The smallest signed distance among the contact points.
    pub fn min_dist(&self) -> Option<Real> {
        self.points.iter().map(|pt| pt.dist).reduce(Real::min)
    }

    /// Replaces the points of this manifold with the deepest `capacity` candidates.
    ///
    /// Accumulated impulses are transferred from old points to new points with the same
    /// feature id so they can be used for warm-starting.
    pub fn update(&mut self, normal: Vector<Real>, mut candidates: ContactCandidates) {
        candidates.sort_by(|a, b| a.dist.total_cmp(&b.dist));
        candidates.truncate(self.capacity);

        for candidate in &mut candidates {
            if let Some(old) = self.points.iter().find(|old| old.fid == candidate.fid) {
                candidate.normal_impulse = old.normal_impulse;
                candidate.tangent_impulses = old.tangent_impulses;
            }
        }

        self.normal = normal;
        self.points.clear();
        self.points.extend(candidates);
    }
}

/// Computes the contact points between two shapes, storing them into `manifold`.
///
/// Points further apart than `prediction` are ignored. Returns `Ok(true)` if at least one
/// contact point was found. The combinations involving a triangle are only supported if the
/// triangle is the second shape and the first one is a ball or a cuboid.
pub fn contact_manifold(
    pos1: &Isometry<Real>,
    g1: &dyn Shape,
    pos2: &Isometry<Real>,
    g2: &dyn Shape,
    prediction: Real,
    manifold: &mut ContactManifold,
) -> Result<bool, Unsupported> {
    let result = match (g1.as_typed_shape(), g2.as_typed_shape()) {
        (TypedShape::Ball(b1), TypedShape::Ball(b2)) => {
            super::contact_ball_ball(pos1, b1, pos2, b2, prediction)
        }
        (TypedShape::Ball(b1), TypedShape::Cuboid(c2)) => {
            super::contact_ball_cuboid(pos1, b1, pos2, c2, prediction)
        }
        (TypedShape::Cuboid(c1), TypedShape::Ball(b2)) => {
            super::contact_cuboid_ball(pos1, c1, pos2, b2, prediction)
        }
        (TypedShape::Cuboid(c1), TypedShape::Cuboid(c2)) => {
            super::contact_cuboid_cuboid(pos1, c1, pos2, c2, prediction)
        }
        (TypedShape::Ball(b1), TypedShape::Triangle(t2)) => {
            super::contact_ball_triangle(pos1, b1, &t2.transformed(pos2), prediction)
        }
        (TypedShape::Cuboid(c1), TypedShape::Triangle(t2)) => {
            super::contact_cuboid_triangle(pos1, c1, &t2.transformed(pos2), prediction)
        }
        _ => return Err(Unsupported),
    };

    match result {
        Some((normal, candidates)) if !candidates.is_empty() => {
            manifold.update(normal, candidates);
            Ok(true)
        }
        _ => {
            manifold.clear();
            Ok(false)
        }
    }
}
