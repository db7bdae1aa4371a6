//! Application of the Separating-Axis-Theorem (SAT).

pub use self::sat_triangle_aabb::{intersection_test_triangle_aabb, triangle_aabb_separation};

mod sat_triangle_aabb;
