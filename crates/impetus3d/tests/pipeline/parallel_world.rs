use super::ground_quad;
use impetus3d::bounding_volume::BoundingVolume;
use impetus3d::dynamics::RigidBody;
use impetus3d::math::{Real, Vector};
use impetus3d::pipeline::{World, WorldConfig};
use impetus3d::shape::{Ball, Cuboid};
use std::sync::Arc;

fn scatter(world: &mut World) {
    let ball = Arc::new(Ball::new(0.4));
    let cube = Arc::new(Cuboid::new(Vector::repeat(0.4)));
    let mut rng = oorandom::Rand32::new(11);

    for i in 0..10 {
        for j in 0..10 {
            let height = 1.0 + rng.rand_float() as Real * 4.0;
            let position = Vector::new(i as Real * 1.5 - 7.0, height, j as Real * 1.5 - 7.0);
            let body = if (i + j) % 2 == 0 {
                RigidBody::dynamic(ball.clone(), 1.0)
            } else {
                RigidBody::dynamic(cube.clone(), 1.0)
            };
            let _ = world.add_body(body.with_translation(position));
        }
    }
}

#[test]
fn parallel_world_matches_sequential_outcome() {
    let config = WorldConfig::default().with_static_grid(8.0, 3);
    let mut sequential = World::new(config).unwrap();
    let mut parallel = World::new(config.with_worker_threads(4, 3)).unwrap();

    for world in [&mut sequential, &mut parallel] {
        let _ = world.add_static_mesh(ground_quad(0.0, 20.0));
        scatter(world);
    }

    let mut updates = 0;
    for _ in 0..240 {
        sequential.step().unwrap();
        parallel.step().unwrap();
        updates += parallel.stats().num_broad_phase_updates;
    }

    assert!(updates > 0);
    parallel.broad_phase().tree().assert_well_formed();
    assert_eq!(parallel.broad_phase().tree().leaf_count(), 100);

    for world in [&sequential, &parallel] {
        for (_, body) in world.bodies().iter() {
            assert!(body.center_of_mass().y > 0.3);
            assert!(world
                .broad_phase()
                .tree()
                .node_aabb(body.proxy())
                .contains(body.aabb()));
        }
    }
}
