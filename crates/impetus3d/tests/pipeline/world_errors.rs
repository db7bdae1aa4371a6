use impetus3d::dynamics::{BallSocketJoint, RigidBody, RigidBodyHandle};
use impetus3d::math::Point;
use impetus3d::pipeline::{World, WorldConfig, WorldError};
use impetus3d::shape::{Ball, StaticMeshHandle};
use std::sync::Arc;

#[test]
fn zero_frames_are_rejected() {
    let mut world = World::new(WorldConfig::default()).unwrap();
    assert!(matches!(
        world.update(0),
        Err(WorldError::InvalidFrameCount(0))
    ));
    assert_eq!(world.stats().frame, 0);

    world.update(3).unwrap();
    assert_eq!(world.stats().frame, 3);
}

#[test]
fn unknown_handles_are_rejected() {
    let mut world = World::new(WorldConfig::default()).unwrap();
    let ball = world.add_body(RigidBody::dynamic(Arc::new(Ball::new(0.5)), 1.0));

    assert!(matches!(
        world.remove_body(RigidBodyHandle(42)),
        Err(WorldError::UnknownBody(RigidBodyHandle(42)))
    ));
    assert!(matches!(
        world.remove_static_mesh(StaticMeshHandle(3)),
        Err(WorldError::UnknownMesh(StaticMeshHandle(3)))
    ));
    assert!(matches!(
        world.add_joint(BallSocketJoint::new(
            ball,
            RigidBodyHandle(7),
            Point::origin(),
            Point::origin()
        )),
        Err(WorldError::UnknownBody(RigidBodyHandle(7)))
    ));
    assert!(world.joints().is_empty());

    assert!(world.remove_body(ball).is_ok());
    assert!(world.body(ball).is_none());
    assert!(world.broad_phase().tree().is_empty());
}

#[test]
fn invalid_configurations_are_rejected() {
    assert!(matches!(
        World::new(WorldConfig::default().with_worker_threads(1, 5)),
        Err(WorldError::InvalidConfig(_))
    ));
    assert!(matches!(
        World::new(WorldConfig::default().with_static_grid(0.0, 5)),
        Err(WorldError::InvalidConfig(_))
    ));
}
