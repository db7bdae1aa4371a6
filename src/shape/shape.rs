use crate::bounding_volume::Aabb;
use crate::math::{Isometry, PrincipalAngularInertia, Real};
use crate::query::{Ray, RayIntersection};
use crate::shape::{Ball, Cuboid, Triangle};
use core::fmt::Debug;

/// Enum representing the type of a shape.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum ShapeType {
    /// A ball shape.
    Ball,
    /// A cuboid shape.
    Cuboid,
    /// A triangle shape.
    Triangle,
}

/// Enum giving access to the concrete type of a shape.
#[derive(Copy, Clone, Debug)]
pub enum TypedShape<'a> {
    /// A ball shape.
    Ball(&'a Ball),
    /// A cuboid shape.
    Cuboid(&'a Cuboid),
    /// A triangle shape.
    Triangle(&'a Triangle),
}

/// Trait implemented by shapes usable as the collider of a rigid body.
pub trait Shape: Send + Sync + Debug {
    /// Computes the AABB of this shape placed at `position`.
    fn compute_aabb(&self, position: &Isometry<Real>) -> Aabb;

    /// Gets the type tag of this shape.
    fn shape_type(&self) -> ShapeType;

    /// Gets the underlying shape as an enum.
    fn as_typed_shape(&self) -> TypedShape<'_>;

    /// The maximum number of contact points this shape generates against any other shape.
    ///
    /// This is the key used to pool contact manifolds, since their storage size depends on it.
    fn max_contacts(&self) -> usize;

    /// The principal angular inertia of this shape for the given mass, assuming a uniform
    /// density and the shape's local frame as principal frame.
    fn principal_inertia(&self, mass: Real) -> PrincipalAngularInertia<Real>;

    /// Computes the intersection of a ray with this shape placed at `position`.
    ///
    /// The returned normal is expressed in world-space.
    fn cast_ray(
        &self,
        position: &Isometry<Real>,
        ray: &Ray,
        max_toi: Real,
        solid: bool,
    ) -> Option<RayIntersection> {
        let local_ray = ray.inverse_transform_by(position);
        let hit = match self.as_typed_shape() {
            TypedShape::Ball(s) => s.cast_local_ray(&local_ray, max_toi, solid),
            TypedShape::Cuboid(s) => s.cast_local_ray(&local_ray, max_toi, solid),
            TypedShape::Triangle(s) => s.cast_local_ray(&local_ray, max_toi, false),
        }?;

        Some(RayIntersection::new(
            hit.time_of_impact,
            position * hit.normal,
        ))
    }
}

impl Shape for Ball {
    fn compute_aabb(&self, position: &Isometry<Real>) -> Aabb {
        self.aabb(position)
    }

    fn shape_type(&self) -> ShapeType {
        ShapeType::Ball
    }

    fn as_typed_shape(&self) -> TypedShape<'_> {
        TypedShape::Ball(self)
    }

    fn max_contacts(&self) -> usize {
        1
    }

    fn principal_inertia(&self, mass: Real) -> PrincipalAngularInertia<Real> {
        let i = mass * self.radius * self.radius * 2.0 / 5.0;
        PrincipalAngularInertia::repeat(i)
    }
}

impl Shape for Cuboid {
    fn compute_aabb(&self, position: &Isometry<Real>) -> Aabb {
        self.aabb(position)
    }

    fn shape_type(&self) -> ShapeType {
        ShapeType::Cuboid
    }

    fn as_typed_shape(&self) -> TypedShape<'_> {
        TypedShape::Cuboid(self)
    }

    fn max_contacts(&self) -> usize {
        4
    }

    fn principal_inertia(&self, mass: Real) -> PrincipalAngularInertia<Real> {
        let sq = self.half_extents.component_mul(&self.half_extents);
        PrincipalAngularInertia::new(sq.y + sq.z, sq.x + sq.z, sq.x + sq.y) * (mass / 3.0)
    }
}

impl Shape for Triangle {
    fn compute_aabb(&self, position: &Isometry<Real>) -> Aabb {
        self.transformed(position).local_aabb()
    }

    fn shape_type(&self) -> ShapeType {
        ShapeType::Triangle
    }

    fn as_typed_shape(&self) -> TypedShape<'_> {
        TypedShape::Triangle(self)
    }

    fn max_contacts(&self) -> usize {
        3
    }

    // A triangle has no volume: it behaves as if its rotation was locked.
    fn principal_inertia(&self, _mass: Real) -> PrincipalAngularInertia<Real> {
        PrincipalAngularInertia::zeros()
    }
}
