use crate::bounding_volume::Aabb;
use crate::math::{
    AngVector, Isometry, Matrix, Point, PrincipalAngularInertia, Real, Rotation, Vector,
};
use crate::partitioning::{BvhNodeId, NO_NODE};
use crate::pipeline::CollisionGroups;
use crate::shape::Shape;
use std::sync::Arc;

/// The handle of a rigid body inserted into a [`RigidBodySet`](crate::dynamics::RigidBodySet).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct RigidBodyHandle(pub u32);

/// The sleep state of a rigid body.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum SleepState {
    /// The body is simulated. `frames_at_rest` counts the consecutive frames it spent with a
    /// negligible velocity.
    Awake {
        /// The number of consecutive frames with a negligible velocity.
        frames_at_rest: u32,
    },
    /// The body is not simulated until something wakes it up.
    Sleeping,
}

impl Default for SleepState {
    fn default() -> Self {
        SleepState::Awake { frames_at_rest: 0 }
    }
}

/// A rigid body.
///
/// The position of a body is the position of its center of mass, which coincides with the
/// origin of its shape. Bodies with a zero inverse mass are fixed: they are never moved by
/// forces or contacts.
#[derive(Clone, Debug)]
pub struct RigidBody {
    pub(crate) position: Isometry<Real>,
    pub(crate) linvel: Vector<Real>,
    pub(crate) angvel: AngVector<Real>,
    pub(crate) pseudo_linvel: Vector<Real>,
    pub(crate) pseudo_angvel: AngVector<Real>,
    pub(crate) force: Vector<Real>,
    pub(crate) torque: AngVector<Real>,
    pub(crate) inv_mass: Real,
    pub(crate) principal_inertia: PrincipalAngularInertia<Real>,
    pub(crate) inv_principal_inertia: PrincipalAngularInertia<Real>,
    pub(crate) world_inv_inertia: Matrix<Real>,
    pub(crate) shape: Arc<dyn Shape>,
    pub(crate) aabb: Aabb,
    pub(crate) sleep: SleepState,
    pub(crate) forces_enabled: bool,
    pub(crate) collision_groups: CollisionGroups,
    pub(crate) friction: Real,
    pub(crate) active_collisions: u32,
    pub(crate) proxy: BvhNodeId,
}

impl RigidBody {
    /// A dynamic body with the given shape and mass.
    ///
    /// Its inertia is computed from the shape assuming a uniform density. A zero mass makes the
    /// body fixed.
    pub fn dynamic(shape: Arc<dyn Shape>, mass: Real) -> Self {
        assert!(mass >= 0.0, "The mass of a rigid body must not be negative.");
        let principal_inertia = shape.principal_inertia(mass);
        let inv = |x: Real| if x == 0.0 { 0.0 } else { 1.0 / x };

        let mut body = Self {
            position: Isometry::identity(),
            linvel: Vector::zeros(),
            angvel: AngVector::zeros(),
            pseudo_linvel: Vector::zeros(),
            pseudo_angvel: AngVector::zeros(),
            force: Vector::zeros(),
            torque: AngVector::zeros(),
            inv_mass: inv(mass),
            principal_inertia,
            inv_principal_inertia: principal_inertia.map(inv),
            world_inv_inertia: Matrix::zeros(),
            aabb: shape.compute_aabb(&Isometry::identity()),
            shape,
            sleep: SleepState::default(),
            forces_enabled: true,
            collision_groups: CollisionGroups::default(),
            friction: 0.5,
            active_collisions: 0,
            proxy: NO_NODE,
        };
        body.update_transforms();
        body
    }

    /// A fixed body with the given shape. It has a zero inverse mass and inertia.
    pub fn fixed(shape: Arc<dyn Shape>) -> Self {
        Self::dynamic(shape, 0.0).with_forces_enabled(false)
    }

    /// Sets the initial position of this body.
    #[must_use]
    pub fn with_position(mut self, position: Isometry<Real>) -> Self {
        self.position = position;
        self.update_transforms();
        self
    }

    /// Sets the initial translation of this body.
    #[must_use]
    pub fn with_translation(self, translation: Vector<Real>) -> Self {
        let rotation = self.position.rotation;
        self.with_position(Isometry::from_parts(translation.into(), rotation))
    }

    /// Sets the initial linear velocity of this body.
    #[must_use]
    pub fn with_linvel(mut self, linvel: Vector<Real>) -> Self {
        self.linvel = linvel;
        self
    }

    /// Sets the initial angular velocity of this body.
    #[must_use]
    pub fn with_angvel(mut self, angvel: AngVector<Real>) -> Self {
        self.angvel = angvel;
        self
    }

    /// Enables or disables the external forces applied to this body.
    #[must_use]
    pub fn with_forces_enabled(mut self, enabled: bool) -> Self {
        self.forces_enabled = enabled;
        self
    }

    /// Sets the collision groups of this body.
    #[must_use]
    pub fn with_collision_groups(mut self, groups: CollisionGroups) -> Self {
        self.collision_groups = groups;
        self
    }

    /// Sets the friction coefficient of this body.
    #[must_use]
    pub fn with_friction(mut self, friction: Real) -> Self {
        self.friction = friction;
        self
    }

    /// The position of the center of mass of this body.
    #[inline]
    pub fn position(&self) -> &Isometry<Real> {
        &self.position
    }

    /// The world-space center of mass of this body.
    #[inline]
    pub fn center_of_mass(&self) -> Point<Real> {
        self.position.translation.vector.into()
    }

    /// The orientation of this body.
    #[inline]
    pub fn rotation(&self) -> &Rotation<Real> {
        &self.position.rotation
    }

    /// Teleports this body, waking it up.
    pub fn set_position(&mut self, position: Isometry<Real>) {
        self.position = position;
        self.update_transforms();
        self.wake_up();
    }

    /// The linear velocity of this body.
    #[inline]
    pub fn linvel(&self) -> &Vector<Real> {
        &self.linvel
    }

    /// The angular velocity of this body.
    #[inline]
    pub fn angvel(&self) -> &AngVector<Real> {
        &self.angvel
    }

    /// Sets the linear velocity of this body, waking it up.
    pub fn set_linvel(&mut self, linvel: Vector<Real>) {
        self.linvel = linvel;
        self.wake_up();
    }

    /// Sets the angular velocity of this body, waking it up.
    pub fn set_angvel(&mut self, angvel: AngVector<Real>) {
        self.angvel = angvel;
        self.wake_up();
    }

    /// The position-correction linear velocity computed by the solver for the current step.
    #[inline]
    pub fn pseudo_linvel(&self) -> &Vector<Real> {
        &self.pseudo_linvel
    }

    /// The position-correction angular velocity computed by the solver for the current step.
    #[inline]
    pub fn pseudo_angvel(&self) -> &AngVector<Real> {
        &self.pseudo_angvel
    }

    /// Overwrites the velocities of this body without affecting its sleep state.
    ///
    /// This is meant to be used by contact solvers.
    pub fn set_solver_velocities(
        &mut self,
        linvel: Vector<Real>,
        angvel: AngVector<Real>,
        pseudo_linvel: Vector<Real>,
        pseudo_angvel: AngVector<Real>,
    ) {
        if self.inv_mass == 0.0 && self.inv_principal_inertia == Vector::zeros() {
            return;
        }

        self.linvel = linvel;
        self.angvel = angvel;
        self.pseudo_linvel = pseudo_linvel;
        self.pseudo_angvel = pseudo_angvel;
    }

    /// Adds a force applied at the center of mass during the next step, waking the body up.
    pub fn add_force(&mut self, force: Vector<Real>) {
        self.force += force;
        self.wake_up();
    }

    /// Adds a torque applied during the next step, waking the body up.
    pub fn add_torque(&mut self, torque: AngVector<Real>) {
        self.torque += torque;
        self.wake_up();
    }

    /// The force accumulated for the next step.
    #[inline]
    pub fn force(&self) -> &Vector<Real> {
        &self.force
    }

    /// Applies an impulse at the center of mass of this body, waking it up.
    pub fn apply_impulse(&mut self, impulse: Vector<Real>) {
        self.linvel += impulse * self.inv_mass;
        self.wake_up();
    }

    /// The inverse of the mass of this body.
    #[inline]
    pub fn inv_mass(&self) -> Real {
        self.inv_mass
    }

    /// The mass of this body. Infinite for fixed bodies.
    #[inline]
    pub fn mass(&self) -> Real {
        if self.inv_mass == 0.0 {
            Real::INFINITY
        } else {
            1.0 / self.inv_mass
        }
    }

    /// Is this body fixed?
    #[inline]
    pub fn is_fixed(&self) -> bool {
        self.inv_mass == 0.0
    }

    /// The principal angular inertia of this body, in its local frame.
    #[inline]
    pub fn principal_inertia(&self) -> &PrincipalAngularInertia<Real> {
        &self.principal_inertia
    }

    /// The inverse of the world-space inertia tensor of this body.
    #[inline]
    pub fn world_inv_inertia(&self) -> &Matrix<Real> {
        &self.world_inv_inertia
    }

    /// The shape of this body.
    #[inline]
    pub fn shape(&self) -> &dyn Shape {
        &*self.shape
    }

    /// The world-space AABB of this body, as of its last transform update.
    #[inline]
    pub fn aabb(&self) -> &Aabb {
        &self.aabb
    }

    /// Are external forces, like gravity, applied to this body?
    #[inline]
    pub fn forces_enabled(&self) -> bool {
        self.forces_enabled
    }

    /// The collision groups of this body.
    #[inline]
    pub fn collision_groups(&self) -> CollisionGroups {
        self.collision_groups
    }

    /// Sets the collision groups of this body.
    ///
    /// Existing contacts are not affected.
    pub fn set_collision_groups(&mut self, groups: CollisionGroups) {
        self.collision_groups = groups;
    }

    /// The friction coefficient of this body.
    #[inline]
    pub fn friction(&self) -> Real {
        self.friction
    }

    /// The number of other bodies this body currently shares a contact pair with.
    #[inline]
    pub fn active_collisions(&self) -> u32 {
        self.active_collisions
    }

    /// The broad-phase leaf of this body, or [`NO_NODE`] if it isn’t part of a world.
    #[inline]
    pub fn proxy(&self) -> BvhNodeId {
        self.proxy
    }

    /// The sleep state of this body.
    #[inline]
    pub fn sleep_state(&self) -> SleepState {
        self.sleep
    }

    /// Is this body sleeping?
    #[inline]
    pub fn is_sleeping(&self) -> bool {
        self.sleep == SleepState::Sleeping
    }

    /// The number of consecutive frames this body spent with a negligible velocity.
    #[inline]
    pub fn sleep_counter(&self) -> u32 {
        match self.sleep {
            SleepState::Awake { frames_at_rest } => frames_at_rest,
            SleepState::Sleeping => 0,
        }
    }

    /// Wakes this body up, resetting its rest counter.
    ///
    /// Fixed bodies never sleep nor wake.
    pub fn wake_up(&mut self) {
        if !self.is_fixed() {
            self.sleep = SleepState::Awake { frames_at_rest: 0 };
        }
    }

    /// Puts this body to sleep, zeroing all its velocities.
    pub fn sleep(&mut self) {
        self.sleep = SleepState::Sleeping;
        self.linvel.fill(0.0);
        self.angvel.fill(0.0);
        self.pseudo_linvel.fill(0.0);
        self.pseudo_angvel.fill(0.0);
    }

    /// Moves this body by `displacement`.
    #[inline]
    pub fn translate(&mut self, displacement: &Vector<Real>) {
        self.position.translation.vector += displacement;
    }

    /// Rotates this body about its center of mass.
    #[inline]
    pub fn rotate_about_center_of_mass(&mut self, rotation: &Rotation<Real>) {
        self.position.rotation = rotation * self.position.rotation;
        self.position.rotation.renormalize_fast();
    }

    /// Refreshes the quantities derived from the position of this body: its world-space
    /// inverse inertia tensor and its AABB.
    pub fn update_transforms(&mut self) {
        let rot = self.position.rotation.to_rotation_matrix();
        let local_inv_inertia = Matrix::from_diagonal(&self.inv_principal_inertia);
        self.world_inv_inertia = rot.matrix() * local_inv_inertia * rot.matrix().transpose();
        self.aabb = self.shape.compute_aabb(&self.position);
    }

    /// The velocity of the material point of this body located at `point`.
    #[inline]
    pub fn velocity_at_point(&self, point: &Point<Real>) -> Vector<Real> {
        self.linvel + self.angvel.cross(&(point - self.center_of_mass()))
    }
}
