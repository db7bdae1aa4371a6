//! Force application, velocity integration and sleeping.

use crate::dynamics::{ExternalForce, RigidBody, RigidBodySet, SleepState};
use crate::math::{AngVector, Matrix, PrincipalAngularInertia, Real, Rotation, PI};
use na::Unit;

/// Parameters of the sleep state machine of rigid bodies.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct SleepConfig {
    /// Can bodies fall asleep at all?
    pub enabled: bool,
    /// Linear speeds below this threshold are negligible.
    pub min_translation_speed: Real,
    /// Angular speeds below this threshold are negligible.
    pub min_rotation_speed: Real,
    /// The number of consecutive frames with negligible speeds after which a body sleeps.
    pub frames_at_rest: u32,
    /// Displacements, angles and inertia differences smaller than this are treated as zero.
    pub min_length: Real,
}

impl Default for SleepConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_translation_speed: 0.1,
            // One revolution every ten seconds.
            min_rotation_speed: 2.0 * PI / 20.0,
            frames_at_rest: 5,
            min_length: 1.0e-6,
        }
    }
}

/// What happened to a body during [`integrate_body`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum IntegrationOutcome {
    /// The body was sleeping or fixed, so it was not integrated.
    Skipped,
    /// The body was integrated and is still awake.
    Awake,
    /// The body was integrated and fell asleep.
    FellAsleep,
}

/// Applies the external forces and the accumulated force and torque of every awake body to
/// its velocity.
///
/// Positions are not modified. Accumulated forces are cleared on every body, including the
/// ones that aren’t affected.
pub fn apply_forces(bodies: &mut RigidBodySet, forces: &[Box<dyn ExternalForce>], dt: Real) {
    for (_, body) in bodies.iter_mut() {
        if body.forces_enabled && !body.is_fixed() && !body.is_sleeping() {
            for force in forces {
                force.apply(body, dt);
            }

            body.linvel += body.force * (body.inv_mass * dt);
            body.angvel += body.world_inv_inertia * body.torque * dt;
        }

        body.force.fill(0.0);
        body.torque.fill(0.0);
    }
}

/// Runs one implicit Newton iteration of the Euler equation `I·dω/dt + ω × I·ω = 0`, written in
/// the local frame of a body with orientation `rotation` and principal inertia `inertia`.
///
/// Returns `None` if the inertia is nearly isotropic, in which case the gyroscopic term
/// vanishes, or if the Newton step is singular.
pub fn gyroscopic_correction(
    angvel: &AngVector<Real>,
    rotation: &Rotation<Real>,
    inertia: &PrincipalAngularInertia<Real>,
    dt: Real,
    min_length: Real,
) -> Option<AngVector<Real>> {
    if (inertia.x - inertia.y).abs() < min_length
        && (inertia.y - inertia.z).abs() < min_length
        && (inertia.x - inertia.z).abs() < min_length
    {
        return None;
    }

    let local_angvel = rotation.inverse_transform_vector(angvel);
    let local_inertia = Matrix::from_diagonal(inertia);
    let local_momentum = local_inertia * local_angvel;

    let residual = local_angvel.cross(&local_momentum) * dt;
    let jacobian = local_inertia
        + (local_angvel.cross_matrix() * local_inertia - local_momentum.cross_matrix()) * dt;
    let step = jacobian.try_inverse()? * residual;

    Some(rotation * (local_angvel - step))
}

/// Integrates the position of a body from its velocities and pseudo-velocities, then runs its
/// sleep state machine.
///
/// Pseudo-velocities are zeroed in every case.
pub fn integrate_body(
    body: &mut RigidBody,
    dt: Real,
    sleep: &SleepConfig,
    gyroscopic: bool,
) -> IntegrationOutcome {
    if body.is_fixed() || body.is_sleeping() {
        body.pseudo_linvel.fill(0.0);
        body.pseudo_angvel.fill(0.0);
        return IntegrationOutcome::Skipped;
    }

    if gyroscopic {
        if let Some(angvel) = gyroscopic_correction(
            &body.angvel,
            &body.position.rotation,
            &body.principal_inertia,
            dt,
            sleep.min_length,
        ) {
            body.angvel = angvel;
        }
    }

    let linear_delta = (body.linvel + body.pseudo_linvel) * dt;
    let angular = body.angvel + body.pseudo_angvel;
    let angular_speed = angular.norm();

    let linear_speed_sq = (linear_delta / dt).norm_squared();
    let negligible = linear_speed_sq < sleep.min_translation_speed * sleep.min_translation_speed
        && angular_speed * angular_speed < sleep.min_rotation_speed * sleep.min_rotation_speed;

    let mut outcome = IntegrationOutcome::Awake;

    if negligible && sleep.enabled {
        let frames_at_rest = body.sleep_counter() + 1;

        if frames_at_rest >= sleep.frames_at_rest {
            body.sleep();
            outcome = IntegrationOutcome::FellAsleep;
        } else {
            body.sleep = SleepState::Awake { frames_at_rest };
        }
    } else {
        body.sleep = SleepState::Awake { frames_at_rest: 0 };
    }

    if outcome == IntegrationOutcome::Awake {
        if linear_delta.norm() > sleep.min_length {
            body.translate(&linear_delta);
        }

        let angle = angular_speed * dt;
        if angle > sleep.min_length {
            let axis = Unit::new_unchecked(angular / angular_speed);
            body.rotate_about_center_of_mass(&Rotation::from_axis_angle(&axis, angle));
        }
    }

    body.update_transforms();
    body.pseudo_linvel.fill(0.0);
    body.pseudo_angvel.fill(0.0);

    outcome
}

/// Integrates the positions of all the bodies of `bodies`, returning the number of bodies that
/// fell asleep.
pub fn integrate_positions(
    bodies: &mut RigidBodySet,
    dt: Real,
    sleep: &SleepConfig,
    gyroscopic: bool,
) -> usize {
    let mut num_fell_asleep = 0;

    for (_, body) in bodies.iter_mut() {
        if integrate_body(body, dt, sleep, gyroscopic) == IntegrationOutcome::FellAsleep {
            num_fell_asleep += 1;
        }
    }

    num_fell_asleep
}
