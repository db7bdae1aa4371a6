use impetus3d::dynamics::{InverseSquareAttractor, RigidBody};
use impetus3d::math::{Point, Vector};
use impetus3d::pipeline::{CollisionGroups, Group, World, WorldConfig};
use impetus3d::shape::Ball;
use std::sync::Arc;

fn weightless_world() -> World {
    World::new(WorldConfig::default().with_gravity(Vector::zeros())).unwrap()
}

#[test]
fn head_on_balls_stop_without_overlapping() {
    let mut world = weightless_world();
    let ball = Arc::new(Ball::new(0.5));
    let left = world.add_body(
        RigidBody::dynamic(ball.clone(), 1.0)
            .with_translation(Vector::new(-2.0, 5.0, 0.0))
            .with_linvel(Vector::new(3.0, 0.0, 0.0)),
    );
    let right = world.add_body(
        RigidBody::dynamic(ball, 1.0)
            .with_translation(Vector::new(2.0, 5.0, 0.0))
            .with_linvel(Vector::new(-3.0, 0.0, 0.0)),
    );

    let mut pairs_created = 0;
    for _ in 0..120 {
        world.step().unwrap();
        pairs_created += world.stats().num_pairs_created;

        let p1 = world.body(left).unwrap().center_of_mass();
        let p2 = world.body(right).unwrap().center_of_mass();
        assert!((p2 - p1).norm() > 0.9);
    }

    assert_eq!(pairs_created, 1);
    assert_eq!(world.contact_pairs().len(), 1);
    assert!(world.body(left).unwrap().linvel().norm() < 0.1);
    assert!(world.body(right).unwrap().linvel().norm() < 0.1);
    assert_eq!(world.body(left).unwrap().active_collisions(), 1);

    let _ = world.remove_body(right).unwrap();
    assert!(world.contact_pairs().is_empty());
    assert_eq!(world.body(left).unwrap().active_collisions(), 0);
}

#[test]
fn filtered_groups_pass_through_each_other() {
    let mut world = weightless_world();
    let ball = Arc::new(Ball::new(0.5));
    let groups1 = CollisionGroups::new(Group::GROUP_1, Group::GROUP_1);
    let groups2 = CollisionGroups::new(Group::GROUP_2, Group::GROUP_2);
    let left = world.add_body(
        RigidBody::dynamic(ball.clone(), 1.0)
            .with_translation(Vector::new(-2.0, 0.0, 0.0))
            .with_linvel(Vector::new(3.0, 0.0, 0.0))
            .with_collision_groups(groups1),
    );
    let _ = world.add_body(
        RigidBody::dynamic(ball, 1.0)
            .with_translation(Vector::new(2.0, 0.0, 0.0))
            .with_collision_groups(groups2),
    );

    world.update(120).unwrap();

    assert!(world.contact_pairs().is_empty());
    assert!(world.body(left).unwrap().center_of_mass().x > 2.0);
}

#[test]
fn attractor_pulls_bodies_toward_its_center() {
    let mut world = weightless_world();
    world.add_force(InverseSquareAttractor::new(Point::new(0.0, 0.0, 10.0), 200.0));
    let ball = world.add_body(RigidBody::dynamic(Arc::new(Ball::new(0.5)), 1.0));
    let fixed = world.add_body(
        RigidBody::fixed(Arc::new(Ball::new(0.5))).with_translation(Vector::new(5.0, 0.0, 0.0)),
    );

    world.update(30).unwrap();

    let body = world.body(ball).unwrap();
    assert!(body.center_of_mass().z > 0.1);
    assert!(body.center_of_mass().x.abs() < 1.0e-5);
    assert_eq!(
        world.body(fixed).unwrap().center_of_mass(),
        Point::new(5.0, 0.0, 0.0)
    );
}
