use super::ground_quad;
use approx::assert_relative_eq;
use impetus3d::dynamics::RigidBody;
use impetus3d::math::Vector;
use impetus3d::pipeline::{World, WorldConfig};
use impetus3d::shape::{Ball, Cuboid};
use std::sync::Arc;

#[test]
fn dropped_ball_sleeps_on_the_ground() {
    let mut world = World::new(WorldConfig::default()).unwrap();
    let _ = world.add_static_mesh(ground_quad(0.0, 10.0));
    let ball = world.add_body(
        RigidBody::dynamic(Arc::new(Ball::new(0.5)), 1.0)
            .with_translation(Vector::new(2.0, 3.0, -1.0)),
    );

    let mut frames = 0;
    while !world.body(ball).unwrap().is_sleeping() {
        world.step().unwrap();
        frames += 1;
        assert!(frames < 300, "The ball is still awake after {} frames.", frames);
    }

    let body = world.body(ball).unwrap();
    assert_relative_eq!(body.position().translation.vector.y, 0.5, epsilon = 0.01);
    assert_relative_eq!(body.position().translation.vector.x, 2.0, epsilon = 1.0e-3);
    assert_relative_eq!(body.position().translation.vector.z, -1.0, epsilon = 1.0e-3);
    assert_eq!(*body.linvel(), Vector::zeros());

    let stats = world.stats();
    assert_eq!(stats.num_sleeping, 1);
    assert_eq!(stats.num_awake, 0);
    assert_eq!(stats.frame, frames);
}

#[test]
fn sleeping_ball_stays_put_until_woken() {
    let mut world = World::new(WorldConfig::default()).unwrap();
    let _ = world.add_static_mesh(ground_quad(0.0, 10.0));
    let ball = world.add_body(
        RigidBody::dynamic(Arc::new(Ball::new(0.5)), 1.0)
            .with_translation(Vector::new(0.0, 0.5, 3.0)),
    );

    world.update(30).unwrap();
    assert!(world.body(ball).unwrap().is_sleeping());
    let rest = *world.body(ball).unwrap().position();

    world.update(30).unwrap();
    assert_eq!(*world.body(ball).unwrap().position(), rest);

    world
        .body_mut(ball)
        .unwrap()
        .set_linvel(Vector::new(2.0, 0.0, 0.0));
    world.step().unwrap();
    let body = world.body(ball).unwrap();
    assert!(!body.is_sleeping());
    assert!(body.position().translation.vector.x > rest.translation.vector.x);
}

#[test]
fn dropped_cube_lands_flat() {
    let mut world = World::new(WorldConfig::default()).unwrap();
    let _ = world.add_static_mesh(ground_quad(0.0, 10.0));
    let cube = world.add_body(
        RigidBody::dynamic(Arc::new(Cuboid::new(Vector::repeat(0.5))), 2.0)
            .with_translation(Vector::new(-2.0, 2.0, -5.0)),
    );

    world.update(240).unwrap();

    let body = world.body(cube).unwrap();
    assert_relative_eq!(body.position().translation.vector.y, 0.5, epsilon = 0.03);
    assert!(body.rotation().angle() < 1.0e-2);
    assert!(body.linvel().norm() < 0.1);
}

#[test]
fn removing_the_ground_wakes_the_bodies_resting_on_it() {
    let mut world = World::new(WorldConfig::default()).unwrap();
    let ground = world.add_static_mesh(ground_quad(0.0, 10.0));
    let ball = world.add_body(
        RigidBody::dynamic(Arc::new(Ball::new(0.5)), 1.0)
            .with_translation(Vector::new(1.0, 0.5, 1.0)),
    );

    world.update(60).unwrap();
    assert!(world.body(ball).unwrap().is_sleeping());

    let _ = world.remove_static_mesh(ground).unwrap();
    assert!(!world.body(ball).unwrap().is_sleeping());

    world.update(30).unwrap();
    assert!(world.body(ball).unwrap().position().translation.vector.y < 0.0);
}
