//! Rays and their intersection with shapes and bounding boxes.

pub use self::ray::{Ray, RayIntersection};
pub use self::ray_ball::ray_toi_with_ball;

mod ray;
mod ray_aabb;
mod ray_ball;
mod ray_cuboid;
mod ray_triangle;
