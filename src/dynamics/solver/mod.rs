//! Resolution of contacts and joints.

pub use self::sequential_impulse::SequentialImpulseSolver;

use crate::dynamics::{JointSet, RigidBodySet};
use crate::math::Real;
use crate::pipeline::{ContactPair, MeshContact};

mod sequential_impulse;

/// A solver computing the velocities and pseudo-velocities of bodies subject to contacts and
/// joints.
///
/// It is called once per step, after external forces were applied to the velocities and before
/// positions are integrated. It must leave fixed bodies untouched. Pseudo-velocities are
/// single-step position corrections: they are integrated then discarded.
pub trait ContactSolver: Send {
    /// Solves the contacts between bodies and static triangles, the contacts between pairs of
    /// bodies, and the joints.
    ///
    /// The accumulated impulses of each contact point may be written back to its manifold so
    /// the next step can be warm-started.
    fn solve(
        &mut self,
        bodies: &mut RigidBodySet,
        mesh_contacts: &mut [MeshContact],
        body_contacts: &mut [ContactPair],
        joints: &JointSet,
        dt: Real,
        position_iterations: usize,
        velocity_iterations: usize,
    );
}
