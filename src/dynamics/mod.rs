//! Rigid bodies, external forces, joints, integration and contact resolution.

pub use self::force::{ConstantGravity, ExternalForce, InverseSquareAttractor};
pub use self::integration::{
    apply_forces, gyroscopic_correction, integrate_body, integrate_positions, IntegrationOutcome,
    SleepConfig,
};
pub use self::joint::{BallSocketJoint, JointHandle, JointSet};
pub use self::rigid_body::{RigidBody, RigidBodyHandle, SleepState};
pub use self::rigid_body_set::RigidBodySet;

mod force;
mod integration;
mod joint;
mod rigid_body;
mod rigid_body_set;
pub mod solver;
