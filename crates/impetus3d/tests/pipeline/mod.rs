mod ball_joint;
mod bodies_at_rest;
mod collisions;
mod parallel_world;
mod ray_casts;
mod world_errors;

use impetus3d::math::{Isometry, Point, Real};
use impetus3d::shape::StaticMesh;

/// A horizontal square of side `2 * half_size` at height `y`, made of two triangles.
pub fn ground_quad(y: Real, half_size: Real) -> StaticMesh {
    let vertices = [
        Point::new(-half_size, y, -half_size),
        Point::new(-half_size, y, half_size),
        Point::new(half_size, y, half_size),
        Point::new(half_size, y, -half_size),
    ];
    StaticMesh::new(&vertices, &[[0, 1, 2], [0, 2, 3]], &Isometry::identity()).unwrap()
}
