use super::ground_quad;
use approx::assert_relative_eq;
use impetus3d::dynamics::RigidBody;
use impetus3d::math::{Point, Vector};
use impetus3d::pipeline::{World, WorldConfig};
use impetus3d::query::Ray;
use impetus3d::shape::{Ball, Cuboid};
use std::sync::Arc;

#[test]
fn rays_hit_the_static_ground() {
    let mut world = World::new(WorldConfig::default()).unwrap();
    let ground = world.add_static_mesh(ground_quad(1.0, 10.0));

    let down = Ray::new(Point::new(3.0, 6.0, -2.0), -Vector::y());
    let hit = world.cast_ray_static(&down, 100.0, true);
    assert!(hit.is_hit());
    assert_relative_eq!(hit.time_of_impact, 5.0, epsilon = 1.0e-4);
    assert_relative_eq!(hit.normal, Vector::y(), epsilon = 1.0e-5);
    assert_eq!(hit.triangle.unwrap().mesh, ground);

    let up = Ray::new(Point::new(3.0, 6.0, -2.0), Vector::y());
    let miss = world.cast_ray_static(&up, 100.0, true);
    assert!(!miss.is_hit());
    assert_eq!(miss.time_of_impact, 100.0);

    // The ground is only visible from above with backface culling.
    let from_below = Ray::new(Point::new(3.0, -4.0, -2.0), Vector::y());
    assert!(!world.cast_ray_static(&from_below, 100.0, true).is_hit());
    assert!(world.cast_ray_static(&from_below, 100.0, false).is_hit());

    let _ = world.remove_static_mesh(ground).unwrap();
    assert!(!world.cast_ray_static(&down, 100.0, true).is_hit());
}

#[test]
fn rays_hit_the_closest_body() {
    let mut world = World::new(WorldConfig::default()).unwrap();
    let far = world.add_body(
        RigidBody::dynamic(Arc::new(Ball::new(1.0)), 1.0)
            .with_translation(Vector::new(10.0, 0.0, 0.0)),
    );
    let near = world.add_body(
        RigidBody::dynamic(Arc::new(Cuboid::new(Vector::repeat(0.5))), 1.0)
            .with_translation(Vector::new(4.0, 0.0, 0.0)),
    );

    let ray = Ray::new(Point::origin(), Vector::x());
    let (handle, hit) = world.cast_ray_bodies(&ray, 100.0).unwrap();
    assert_eq!(handle, near);
    assert_relative_eq!(hit.time_of_impact, 3.5, epsilon = 1.0e-4);
    assert_relative_eq!(hit.normal, -Vector::x(), epsilon = 1.0e-5);

    let _ = world.remove_body(near).unwrap();
    let (handle, hit) = world.cast_ray_bodies(&ray, 100.0).unwrap();
    assert_eq!(handle, far);
    assert_relative_eq!(hit.time_of_impact, 9.0, epsilon = 1.0e-4);
    assert!(world.cast_ray_bodies(&ray, 5.0).is_none());
}
