use impetus3d::dynamics::{BallSocketJoint, RigidBody};
use impetus3d::math::{Point, Real, Vector};
use impetus3d::pipeline::{World, WorldConfig};
use impetus3d::shape::Ball;
use std::sync::Arc;

#[test]
fn pendulum_keeps_its_length() {
    let mut world = World::new(WorldConfig::default()).unwrap();
    let anchor = world.add_body(
        RigidBody::fixed(Arc::new(Ball::new(0.1))).with_translation(Vector::new(0.0, 5.0, 0.0)),
    );
    let bob = world.add_body(
        RigidBody::dynamic(Arc::new(Ball::new(0.2)), 1.0)
            .with_translation(Vector::new(1.0, 5.0, 0.0)),
    );
    let joint = world
        .add_joint(BallSocketJoint::new(
            anchor,
            bob,
            Point::origin(),
            Point::new(-1.0, 0.0, 0.0),
        ))
        .unwrap();

    let mut lowest: Real = 5.0;
    for _ in 0..180 {
        world.step().unwrap();
        let center = world.body(bob).unwrap().center_of_mass();
        let length = (center - Point::new(0.0, 5.0, 0.0)).norm();
        assert!((length - 1.0).abs() < 0.05, "pendulum length: {}", length);
        lowest = lowest.min(center.y);
    }

    // The bob swung down instead of staying still.
    assert!(lowest < 4.2);

    assert!(world.remove_joint(joint).is_some());
    assert!(world.joints().is_empty());
}

#[test]
fn removing_a_body_removes_its_joints() {
    let mut world = World::new(WorldConfig::default()).unwrap();
    let ball = Arc::new(Ball::new(0.5));
    let b1 = world.add_body(RigidBody::dynamic(ball.clone(), 1.0));
    let b2 = world.add_body(
        RigidBody::dynamic(ball, 1.0).with_translation(Vector::new(0.0, 0.8, 0.0)),
    );
    let _ = world
        .add_joint(BallSocketJoint::new(
            b1,
            b2,
            Point::new(0.0, 0.4, 0.0),
            Point::new(0.0, -0.4, 0.0),
        ))
        .unwrap();

    // The joint disables collisions between the overlapping balls.
    world.step().unwrap();
    assert!(world.contact_pairs().is_empty());

    let _ = world.remove_body(b1).unwrap();
    assert!(world.joints().is_empty());
    world.step().unwrap();
}
