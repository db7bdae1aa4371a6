use crate::bounding_volume::BoundingVolume;
use crate::dynamics::solver::{ContactSolver, SequentialImpulseSolver};
use crate::dynamics::{
    apply_forces, integrate_positions, BallSocketJoint, ConstantGravity, ExternalForce,
    JointHandle, JointSet, RigidBody, RigidBodyHandle, RigidBodySet,
};
use crate::math::Real;
use crate::parallel::{WorkerPool, WorkerPoolError};
use crate::partitioning::{RayHit, StaticGeometry};
use crate::pipeline::pair_id;
use crate::pipeline::{
    BroadPhase, CollisionFilter, ContactPair, DefaultCollisionFilter, MeshContact, NarrowPhase,
    PairManager, StepStats, WorldConfig,
};
use crate::query::{Ray, RayIntersection};
use crate::shape::{StaticMesh, StaticMeshHandle};
use std::time::Instant;

/// Errors reported by the [`World`].
#[derive(thiserror::Error, Debug)]
pub enum WorldError {
    /// At least one frame must be simulated.
    #[error("at least one frame must be simulated, {0} requested")]
    InvalidFrameCount(u32),
    /// No body has the given handle.
    #[error("no rigid body with handle {0:?}")]
    UnknownBody(RigidBodyHandle),
    /// No static mesh has the given handle.
    #[error("no static mesh with handle {0:?}")]
    UnknownMesh(StaticMeshHandle),
    /// The worker pool failed.
    #[error(transparent)]
    WorkerPool(#[from] WorkerPoolError),
    /// A parameter of the configuration is out of its valid range.
    #[error("invalid world configuration: {0}")]
    InvalidConfig(&'static str),
}

/// A physics world: rigid bodies, static meshes, joints and the pipeline stepping them.
///
/// Each step applies the external forces to the velocities, refits the broad-phase, updates
/// the set of body pairs, generates contacts, calls the contact solver, and integrates the
/// positions of the bodies.
pub struct World {
    config: WorldConfig,
    bodies: RigidBodySet,
    joints: JointSet,
    forces: Vec<Box<dyn ExternalForce>>,
    static_geometry: StaticGeometry,
    broad_phase: BroadPhase,
    pairs: PairManager,
    narrow_phase: NarrowPhase,
    filter: Box<dyn CollisionFilter>,
    solver: Box<dyn ContactSolver>,
    pool: Option<WorkerPool>,
    candidate_pairs: Vec<(RigidBodyHandle, RigidBodyHandle)>,
    stats: StepStats,
}

impl World {
    /// Creates an empty world.
    ///
    /// A non-zero gravity is registered as the first external force. A worker pool is started
    /// if `config.worker_threads` is not zero.
    pub fn new(config: WorldConfig) -> Result<Self, WorldError> {
        config.validate()?;

        let pool = if config.worker_threads > 0 {
            Some(WorkerPool::new(config.worker_threads)?)
        } else {
            None
        };

        let mut forces: Vec<Box<dyn ExternalForce>> = vec![];
        if config.gravity.norm_squared() > 0.0 {
            forces.push(Box::new(ConstantGravity {
                acceleration: config.gravity,
            }));
        }

        Ok(Self {
            static_geometry: StaticGeometry::new(
                config.static_cell_size,
                config.static_octree_depth,
            ),
            broad_phase: BroadPhase::new(config.broad_phase_margin, config.parallel_cutoff_depth),
            solver: Box::new(SequentialImpulseSolver::new(
                config.contact_erp,
                config.allowed_penetration,
                config.warm_starting,
            )),
            config,
            bodies: RigidBodySet::new(),
            joints: JointSet::new(),
            forces,
            pairs: PairManager::new(),
            narrow_phase: NarrowPhase::new(),
            filter: Box::new(DefaultCollisionFilter),
            pool,
            candidate_pairs: vec![],
            stats: StepStats::default(),
        })
    }

    /// The configuration of this world.
    #[inline]
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// The rigid bodies of this world.
    #[inline]
    pub fn bodies(&self) -> &RigidBodySet {
        &self.bodies
    }

    /// The joints of this world.
    #[inline]
    pub fn joints(&self) -> &JointSet {
        &self.joints
    }

    /// The static meshes of this world.
    #[inline]
    pub fn static_geometry(&self) -> &StaticGeometry {
        &self.static_geometry
    }

    /// The broad-phase of this world.
    #[inline]
    pub fn broad_phase(&self) -> &BroadPhase {
        &self.broad_phase
    }

    /// The pairs of bodies with overlapping broad-phase AABBs.
    #[inline]
    pub fn contact_pairs(&self) -> &[ContactPair] {
        self.pairs.pairs()
    }

    /// The contacts between bodies and static triangles found at the last step.
    #[inline]
    pub fn mesh_contacts(&self) -> &[MeshContact] {
        self.narrow_phase.mesh_contacts()
    }

    /// The statistics of the last step.
    #[inline]
    pub fn stats(&self) -> &StepStats {
        &self.stats
    }

    /// Adds a rigid body.
    pub fn add_body(&mut self, body: RigidBody) -> RigidBodyHandle {
        let handle = self.bodies.insert(body);
        self.broad_phase.insert(handle, &mut self.bodies[handle]);
        handle
    }

    /// Removes a rigid body, along with its contacts and the joints attached to it.
    pub fn remove_body(&mut self, handle: RigidBodyHandle) -> Result<RigidBody, WorldError> {
        if !self.bodies.contains(handle) {
            return Err(WorldError::UnknownBody(handle));
        }

        let _ = self.pairs.remove_pairs_of(handle, &mut self.bodies);
        let _ = self.joints.remove_attached(handle);
        self.narrow_phase.remove_body(handle);
        self.broad_phase.remove(&mut self.bodies[handle]);

        self.bodies
            .remove(handle)
            .ok_or(WorldError::UnknownBody(handle))
    }

    /// The rigid body with the given handle.
    #[inline]
    pub fn body(&self, handle: RigidBodyHandle) -> Option<&RigidBody> {
        self.bodies.get(handle)
    }

    /// The rigid body with the given handle, mutably.
    ///
    /// Its broad-phase AABB is updated at the next step.
    #[inline]
    pub fn body_mut(&mut self, handle: RigidBodyHandle) -> Option<&mut RigidBody> {
        self.bodies.get_mut(handle)
    }

    /// Adds a static mesh.
    pub fn add_static_mesh(&mut self, mesh: StaticMesh) -> StaticMeshHandle {
        self.static_geometry.insert_mesh(mesh)
    }

    /// Removes a static mesh.
    pub fn remove_static_mesh(
        &mut self,
        handle: StaticMeshHandle,
    ) -> Result<StaticMesh, WorldError> {
        let mesh = self
            .static_geometry
            .remove_mesh(handle)
            .ok_or(WorldError::UnknownMesh(handle))?;
        self.narrow_phase.remove_mesh(handle);

        // Bodies resting on the mesh must fall. Flat meshes have a zero-thickness box.
        let support = mesh.aabb().loosened(self.config.prediction_distance);
        for (_, body) in self.bodies.iter_mut() {
            if body.is_sleeping() && body.aabb().intersects(&support) {
                body.wake_up();
            }
        }

        Ok(mesh)
    }

    /// Adds a joint between two bodies, waking both of them.
    ///
    /// A pair between both bodies is removed if the joint disables their collisions.
    pub fn add_joint(&mut self, joint: BallSocketJoint) -> Result<JointHandle, WorldError> {
        for handle in [joint.body1, joint.body2] {
            self.bodies
                .get_mut(handle)
                .ok_or(WorldError::UnknownBody(handle))?
                .wake_up();
        }

        if !joint.collide_connected {
            let _ = self
                .pairs
                .remove_pair(pair_id(joint.body1, joint.body2), &mut self.bodies);
        }

        Ok(self.joints.insert(joint))
    }

    /// Removes a joint.
    pub fn remove_joint(&mut self, handle: JointHandle) -> Option<BallSocketJoint> {
        let joint = self.joints.remove(handle)?;

        for body in [joint.body1, joint.body2] {
            if let Some(body) = self.bodies.get_mut(body) {
                body.wake_up();
            }
        }

        Some(joint)
    }

    /// Registers an external force applied to every awake body with forces enabled.
    pub fn add_force(&mut self, force: impl ExternalForce + 'static) {
        self.forces.push(Box::new(force));
    }

    /// Replaces the collision filter. Existing pairs are kept.
    pub fn set_collision_filter(&mut self, filter: impl CollisionFilter + 'static) {
        self.filter = Box::new(filter);
    }

    /// Replaces the contact solver.
    pub fn set_solver(&mut self, solver: impl ContactSolver + 'static) {
        self.solver = Box::new(solver);
    }

    /// Casts a ray on the static meshes.
    ///
    /// A miss is reported by a hit with a time of impact equal to `max_toi`.
    pub fn cast_ray_static(&self, ray: &Ray, max_toi: Real, backface_culling: bool) -> RayHit {
        self.static_geometry.cast_ray(ray, max_toi, backface_culling)
    }

    /// Casts a ray on the rigid bodies, returning the closest one hit.
    pub fn cast_ray_bodies(
        &self,
        ray: &Ray,
        max_toi: Real,
    ) -> Option<(RigidBodyHandle, RayIntersection)> {
        self.broad_phase.cast_ray(&self.bodies, ray, max_toi)
    }

    /// Simulates `frames` steps.
    pub fn update(&mut self, frames: u32) -> Result<(), WorldError> {
        if frames < 1 {
            return Err(WorldError::InvalidFrameCount(frames));
        }

        for _ in 0..frames {
            self.step()?;
        }

        Ok(())
    }

    /// Simulates a single step.
    pub fn step(&mut self) -> Result<(), WorldError> {
        let dt = self.config.dt;
        let step_start = Instant::now();
        let mut stats = StepStats {
            frame: self.stats.frame + 1,
            ..StepStats::default()
        };

        let start = Instant::now();
        apply_forces(&mut self.bodies, &self.forces, dt);
        stats.timings.forces = start.elapsed();

        let start = Instant::now();
        stats.num_broad_phase_updates = self.broad_phase.update(&self.bodies, self.pool.as_mut())?;

        self.remove_separated_pairs();

        self.candidate_pairs.clear();
        self.broad_phase
            .find_pairs(&self.bodies, &mut self.candidate_pairs);
        for (body1, body2) in self.candidate_pairs.drain(..) {
            let _ = self.pairs.add_pair(
                body1,
                body2,
                &mut self.bodies,
                &*self.filter,
                &self.joints,
            );
        }
        stats.timings.broad_phase = start.elapsed();

        let start = Instant::now();
        let prediction = self.config.prediction_distance;
        self.narrow_phase
            .update_pairs(self.pairs.pairs_mut(), &mut self.bodies, prediction);
        self.narrow_phase.update_mesh_contacts(
            &self.bodies,
            &self.static_geometry,
            self.config.friction,
            prediction,
        );
        stats.timings.narrow_phase = start.elapsed();

        let start = Instant::now();
        self.wake_jointed_bodies();
        self.solver.solve(
            &mut self.bodies,
            self.narrow_phase.mesh_contacts_mut(),
            self.pairs.pairs_mut(),
            &self.joints,
            dt,
            self.config.position_iterations,
            self.config.velocity_iterations,
        );
        stats.timings.solver = start.elapsed();

        let start = Instant::now();
        stats.num_fell_asleep =
            integrate_positions(&mut self.bodies, dt, &self.config.sleep, self.config.gyroscopic);
        stats.timings.integration = start.elapsed();

        for (_, body) in self.bodies.iter() {
            if body.is_fixed() {
                continue;
            }
            if body.is_sleeping() {
                stats.num_sleeping += 1;
            } else {
                stats.num_awake += 1;
            }
        }

        let (created, removed) = self.pairs.take_counters();
        stats.num_pairs_created = created;
        stats.num_pairs_removed = removed;
        stats.num_pairs = self.pairs.len();
        stats.num_active_pairs = self
            .pairs
            .pairs()
            .iter()
            .filter(|p| !p.manifold.is_empty())
            .count();
        stats.num_mesh_contacts = self.narrow_phase.mesh_contacts().len();
        stats.timings.total = step_start.elapsed();

        if created > 0 || removed > 0 {
            log::debug!(
                "Frame {}: {} pairs created, {} pairs removed.",
                stats.frame,
                created,
                removed
            );
        }
        log::trace!("Frame {} stats: {:?}", stats.frame, stats);

        self.stats = stats;
        Ok(())
    }

    /// Removes the pairs whose broad-phase leaves no longer overlap.
    fn remove_separated_pairs(&mut self) {
        let broad_phase = &self.broad_phase;
        let separated: Vec<_> = self
            .pairs
            .pairs()
            .iter()
            .filter(|pair| {
                match (self.bodies.get(pair.body1), self.bodies.get(pair.body2)) {
                    (Some(rb1), Some(rb2)) => !broad_phase.overlaps(rb1, rb2),
                    _ => true,
                }
            })
            .map(ContactPair::id)
            .collect();

        for id in separated {
            let _ = self.pairs.remove_pair(id, &mut self.bodies);
        }
    }

    /// Wakes the sleeping bodies attached by a joint to an awake dynamic body.
    fn wake_jointed_bodies(&mut self) {
        for (_, joint) in self.joints.iter() {
            let (Some(rb1), Some(rb2)) =
                (self.bodies.get(joint.body1), self.bodies.get(joint.body2))
            else {
                continue;
            };

            let awake1 = !rb1.is_fixed() && !rb1.is_sleeping();
            let awake2 = !rb2.is_fixed() && !rb2.is_sleeping();

            if awake1 && rb2.is_sleeping() {
                self.bodies[joint.body2].wake_up();
            } else if awake2 && rb1.is_sleeping() {
                self.bodies[joint.body1].wake_up();
            }
        }
    }
}
