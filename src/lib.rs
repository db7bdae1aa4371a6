/*!
impetus
=======

**impetus** is a real-time 3-dimensional rigid-body physics engine written with
the rust programming language.

The engine is organized around a small number of data structures:

- a dynamic [`Bvh`](partitioning::Bvh) culling moving bodies during the broad-phase,
- a sparse grid of octrees ([`StaticGeometry`](partitioning::StaticGeometry)) indexing
  immovable triangle meshes for box and ray queries,
- a [`World`](pipeline::World) driving force application, pair bookkeeping, an
  external [`ContactSolver`](dynamics::solver::ContactSolver), integration and sleeping,
- a barrier-synchronized [`WorkerPool`](parallel::WorkerPool) used to fan out the
  broad-phase refit across threads.

*/

#![deny(non_camel_case_types)]
#![deny(unused_parens)]
#![deny(non_upper_case_globals)]
#![deny(unused_results)]
#![warn(missing_docs)]
#![warn(unused_imports)]
#![allow(missing_copy_implementations)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::module_inception)]
#![allow(clippy::manual_range_contains)]
#![allow(clippy::type_complexity)]

#[cfg(feature = "serde-serialize")]
#[macro_use]
extern crate serde;
#[cfg_attr(test, macro_use)]
extern crate approx;
extern crate num_traits as num;

pub extern crate nalgebra as na;

pub mod bounding_volume;
pub mod dynamics;
pub mod parallel;
pub mod partitioning;
pub mod pipeline;
pub mod query;
pub mod shape;
pub mod utils;

mod real {
    /// The scalar type used throughout this crate.
    #[cfg(feature = "f64")]
    pub use f64 as Real;

    /// The scalar type used throughout this crate.
    #[cfg(feature = "f32")]
    pub use f32 as Real;
}

/// Compilation flags dependent aliases for mathematical types.
pub mod math {
    pub use super::real::*;
    pub use na::{Isometry3, Matrix3, Point3, Translation3, UnitVector3, Vector3};
    use na::UnitQuaternion;

    /// The default tolerance used for geometric operations.
    pub const DEFAULT_EPSILON: Real = Real::EPSILON;

    /// The dimension of the space.
    pub const DIM: usize = 3;

    /// The point type.
    pub use Point3 as Point;

    /// The vector type.
    pub use Vector3 as Vector;

    /// The unit vector type.
    pub use UnitVector3 as UnitVector;

    /// The matrix type.
    pub use Matrix3 as Matrix;

    /// The transformation matrix type.
    pub use Isometry3 as Isometry;

    /// The rotation type.
    pub type Rotation<N> = UnitQuaternion<N>;

    /// The translation type.
    pub use Translation3 as Translation;

    /// The principal angular inertia of a rigid body.
    pub type PrincipalAngularInertia<N> = Vector3<N>;

    /// The angular vector type.
    pub type AngVector<N> = Vector3<N>;

    /// Archimedes’ constant, in the precision of [`Real`].
    pub const PI: Real = core::f64::consts::PI as Real;
}
