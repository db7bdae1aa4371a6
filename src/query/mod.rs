//! Non-persistent geometric queries.
//!
//! # General cases
//! The most general methods provided by this module are:
//!
//! * [`contact_manifold()`] to compute the contact points between a dynamic shape and another
//!   dynamic shape or a static triangle.
//! * [`intersection_test_triangle_aabb()`] to determine if a triangle overlaps an axis-aligned box.
//! * Ray casting through [`Ray`] on [`Aabb`](crate::bounding_volume::Aabb) and
//!   [`Triangle`](crate::shape::Triangle).

pub use self::contact::{contact_manifold, ContactManifold, TrackedContact};
pub use self::error::Unsupported;
pub use self::ray::{ray_toi_with_ball, Ray, RayIntersection};
pub use self::sat::intersection_test_triangle_aabb;

pub mod contact;
mod error;
mod ray;
pub mod sat;
