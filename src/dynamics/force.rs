use crate::dynamics::RigidBody;
use crate::math::{Point, Real, Vector};

/// A force field applied to every awake body with external forces enabled.
///
/// Forces only modify velocities. They are applied before contacts are solved.
pub trait ExternalForce: Send + Sync {
    /// Changes the velocity of `body` by the effect of this force over a step of `dt`.
    fn apply(&self, body: &mut RigidBody, dt: Real);
}

/// A uniform acceleration, like gravity near the ground.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct ConstantGravity {
    /// The acceleration applied to all bodies, regardless of their mass.
    pub acceleration: Vector<Real>,
}

impl ConstantGravity {
    /// A vertical gravity of magnitude `g` pointing toward `-y`.
    pub fn vertical(g: Real) -> Self {
        Self {
            acceleration: Vector::new(0.0, -g, 0.0),
        }
    }
}

impl ExternalForce for ConstantGravity {
    fn apply(&self, body: &mut RigidBody, dt: Real) {
        body.linvel += self.acceleration * dt;
    }
}

/// An acceleration toward a point, decreasing with the square of the distance.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct InverseSquareAttractor {
    /// The attracting point.
    pub center: Point<Real>,
    /// The acceleration at unit distance from the center.
    pub strength: Real,
    /// Below this distance, the acceleration stops increasing.
    pub min_distance: Real,
}

impl InverseSquareAttractor {
    /// An attractor at `center` with acceleration `strength / d²` at distance `d`.
    pub fn new(center: Point<Real>, strength: Real) -> Self {
        Self {
            center,
            strength,
            min_distance: 1.0e-3,
        }
    }
}

impl ExternalForce for InverseSquareAttractor {
    fn apply(&self, body: &mut RigidBody, dt: Real) {
        let delta = self.center - body.center_of_mass();
        let dist = delta.norm();

        if dist <= Real::EPSILON {
            return;
        }

        let clamped = dist.max(self.min_distance);
        body.linvel += delta * (self.strength * dt / (clamped * clamped * dist));
    }
}

#[cfg(test)]
mod test {
    use super::{ConstantGravity, ExternalForce, InverseSquareAttractor};
    use crate::dynamics::RigidBody;
    use crate::math::{Point, Vector};
    use crate::shape::Ball;
    use std::sync::Arc;

    #[test]
    fn gravity_is_mass_independent() {
        let gravity = ConstantGravity::vertical(10.0);
        let mut light = RigidBody::dynamic(Arc::new(Ball::new(1.0)), 1.0);
        let mut heavy = RigidBody::dynamic(Arc::new(Ball::new(1.0)), 100.0);

        gravity.apply(&mut light, 0.1);
        gravity.apply(&mut heavy, 0.1);

        assert_relative_eq!(*light.linvel(), Vector::new(0.0, -1.0, 0.0));
        assert_relative_eq!(*heavy.linvel(), *light.linvel());
        assert_eq!(light.position().translation.vector, Vector::zeros());
    }

    #[test]
    fn attractor_decreases_with_distance() {
        let attractor = InverseSquareAttractor::new(Point::origin(), 8.0);
        let mut near = RigidBody::dynamic(Arc::new(Ball::new(0.1)), 1.0)
            .with_translation(Vector::new(2.0, 0.0, 0.0));
        let mut far = RigidBody::dynamic(Arc::new(Ball::new(0.1)), 1.0)
            .with_translation(Vector::new(0.0, 0.0, -4.0));

        attractor.apply(&mut near, 1.0);
        attractor.apply(&mut far, 1.0);

        assert_relative_eq!(*near.linvel(), Vector::new(-2.0, 0.0, 0.0));
        assert_relative_eq!(*far.linvel(), Vector::new(0.0, 0.0, 0.5));
    }
}
