use crate::dynamics::solver::ContactSolver;
use crate::dynamics::{JointSet, RigidBodyHandle, RigidBodySet};
use crate::math::{AngVector, Matrix, Point, Real, Vector};
use crate::pipeline::{ContactPair, MeshContact};
use crate::query::ContactManifold;
use crate::utils::hashmap::HashMap;

/// The velocities of a body, copied for the duration of a solve.
#[derive(Copy, Clone, Debug)]
struct SolverBody {
    handle: RigidBodyHandle,
    center: Point<Real>,
    linvel: Vector<Real>,
    angvel: AngVector<Real>,
    pseudo_linvel: Vector<Real>,
    pseudo_angvel: AngVector<Real>,
    inv_mass: Real,
    inv_inertia: Matrix<Real>,
    mobile: bool,
}

impl SolverBody {
    fn apply_impulse(&mut self, impulse: &Vector<Real>, r: &Vector<Real>) {
        self.linvel += impulse * self.inv_mass;
        self.angvel += self.inv_inertia * r.cross(impulse);
    }

    fn apply_pseudo_impulse(&mut self, impulse: &Vector<Real>, r: &Vector<Real>) {
        self.pseudo_linvel += impulse * self.inv_mass;
        self.pseudo_angvel += self.inv_inertia * r.cross(impulse);
    }

    fn velocity_at(&self, r: &Vector<Real>) -> Vector<Real> {
        self.linvel + self.angvel.cross(r)
    }

    fn pseudo_velocity_at(&self, r: &Vector<Real>) -> Vector<Real> {
        self.pseudo_linvel + self.pseudo_angvel.cross(r)
    }

    /// The inverse mass "seen" along `dir` at the offset `r` from the center of mass.
    fn inv_mass_along(&self, r: &Vector<Real>, dir: &Vector<Real>) -> Real {
        self.inv_mass + (self.inv_inertia * r.cross(dir)).cross(r).dot(dir)
    }

    /// The contribution of this body to the 3×3 effective inverse mass of a point constraint.
    fn inv_mass_matrix(&self, r: &Vector<Real>) -> Matrix<Real> {
        let rx = r.cross_matrix();
        Matrix::identity() * self.inv_mass - rx * self.inv_inertia * rx
    }
}

/// Identifies the manifold point a constraint was built from.
#[derive(Copy, Clone, Debug)]
enum ContactSource {
    Mesh(usize, usize),
    Pair(usize, usize),
}

#[derive(Copy, Clone, Debug)]
struct PointConstraint {
    body1: usize,
    /// `None` for contacts with static triangles.
    body2: Option<usize>,
    normal: Vector<Real>,
    tangents: [Vector<Real>; 2],
    r1: Vector<Real>,
    r2: Vector<Real>,
    dist: Real,
    friction: Real,
    normal_mass: Real,
    tangent_masses: [Real; 2],
    normal_impulse: Real,
    tangent_impulses: [Real; 2],
    pseudo_impulse: Real,
    source: ContactSource,
}

#[derive(Copy, Clone, Debug)]
struct JointConstraint {
    body1: usize,
    body2: usize,
    r1: Vector<Real>,
    r2: Vector<Real>,
    inv_mass_matrix: Matrix<Real>,
}

/// A sequential-impulse solver with split-impulse position correction.
///
/// Contacts are speculative: a positive distance lets bodies approach until they touch during
/// the step. Penetrations deeper than `allowed_penetration` are resolved by pseudo-velocities,
/// which don’t add energy to the system. Friction follows a pyramid model along two tangents.
#[derive(Clone, Debug)]
pub struct SequentialImpulseSolver {
    /// The fraction of the penetration resolved at each step.
    pub erp: Real,
    /// The penetration depth that is not corrected, avoiding jitter of resting contacts.
    pub allowed_penetration: Real,
    /// Are contacts initialized with the impulses computed for them at the previous step?
    pub warm_starting: bool,
    solver_bodies: Vec<SolverBody>,
    body_indices: HashMap<RigidBodyHandle, usize>,
    contacts: Vec<PointConstraint>,
    joints: Vec<JointConstraint>,
}

impl Default for SequentialImpulseSolver {
    fn default() -> Self {
        Self::new(0.2, 0.005, true)
    }
}

impl SequentialImpulseSolver {
    /// Creates a solver.
    pub fn new(erp: Real, allowed_penetration: Real, warm_starting: bool) -> Self {
        Self {
            erp,
            allowed_penetration,
            warm_starting,
            solver_bodies: vec![],
            body_indices: HashMap::default(),
            contacts: vec![],
            joints: vec![],
        }
    }

    fn body_index(&mut self, bodies: &RigidBodySet, handle: RigidBodyHandle) -> Option<usize> {
        if let Some(i) = self.body_indices.get(&handle) {
            return Some(*i);
        }

        let body = bodies.get(handle)?;
        let mobile = !body.is_fixed() && !body.is_sleeping();
        let (inv_mass, inv_inertia) = if mobile {
            (body.inv_mass(), *body.world_inv_inertia())
        } else {
            (0.0, Matrix::zeros())
        };

        let i = self.solver_bodies.len();
        self.solver_bodies.push(SolverBody {
            handle,
            center: body.center_of_mass(),
            linvel: *body.linvel(),
            angvel: *body.angvel(),
            pseudo_linvel: *body.pseudo_linvel(),
            pseudo_angvel: *body.pseudo_angvel(),
            inv_mass,
            inv_inertia,
            mobile,
        });
        let _ = self.body_indices.insert(handle, i);
        Some(i)
    }

    fn add_manifold(
        &mut self,
        body1: usize,
        body2: Option<usize>,
        manifold: &ContactManifold,
        friction: Real,
        source: impl Fn(usize) -> ContactSource,
    ) {
        let normal = manifold.normal;
        let tangents = tangent_basis(&normal);
        let b1 = self.solver_bodies[body1];
        let b2 = body2.map(|i| self.solver_bodies[i]);

        if !b1.mobile && !b2.map(|b| b.mobile).unwrap_or(false) {
            return;
        }

        for (k, point) in manifold.points.iter().enumerate() {
            let r1 = point.point1 - b1.center;
            let r2 = b2.map(|b| point.point2 - b.center).unwrap_or_else(Vector::zeros);
            let inv_mass_along = |dir: &Vector<Real>| {
                b1.inv_mass_along(&r1, dir) + b2.map(|b| b.inv_mass_along(&r2, dir)).unwrap_or(0.0)
            };
            let mass = |k: Real| if k > 0.0 { 1.0 / k } else { 0.0 };
            let (normal_impulse, tangent_impulses) = if self.warm_starting {
                (point.normal_impulse, point.tangent_impulses)
            } else {
                (0.0, [0.0; 2])
            };

            self.contacts.push(PointConstraint {
                body1,
                body2,
                normal,
                tangents,
                r1,
                r2,
                dist: point.dist,
                friction,
                normal_mass: mass(inv_mass_along(&normal)),
                tangent_masses: [
                    mass(inv_mass_along(&tangents[0])),
                    mass(inv_mass_along(&tangents[1])),
                ],
                normal_impulse,
                tangent_impulses,
                pseudo_impulse: 0.0,
                source: source(k),
            });
        }
    }

    fn apply_contact_impulse(&mut self, c: &PointConstraint, impulse: &Vector<Real>) {
        self.solver_bodies[c.body1].apply_impulse(&-impulse, &c.r1);
        if let Some(b2) = c.body2 {
            self.solver_bodies[b2].apply_impulse(impulse, &c.r2);
        }
    }

    fn relative_velocity(&self, c: &PointConstraint) -> Vector<Real> {
        let v2 = c
            .body2
            .map(|b| self.solver_bodies[b].velocity_at(&c.r2))
            .unwrap_or_else(Vector::zeros);
        v2 - self.solver_bodies[c.body1].velocity_at(&c.r1)
    }

    fn relative_pseudo_velocity(&self, c: &PointConstraint) -> Vector<Real> {
        let v2 = c
            .body2
            .map(|b| self.solver_bodies[b].pseudo_velocity_at(&c.r2))
            .unwrap_or_else(Vector::zeros);
        v2 - self.solver_bodies[c.body1].pseudo_velocity_at(&c.r1)
    }

    fn warm_start(&mut self) {
        for i in 0..self.contacts.len() {
            let c = self.contacts[i];
            let impulse = c.normal * c.normal_impulse
                + c.tangents[0] * c.tangent_impulses[0]
                + c.tangents[1] * c.tangent_impulses[1];
            self.apply_contact_impulse(&c, &impulse);
        }
    }

    fn solve_contact_velocities(&mut self, dt: Real) {
        for i in 0..self.contacts.len() {
            let mut c = self.contacts[i];

            // Friction first, bounded by the normal impulse of the previous iteration.
            let max_friction = c.friction * c.normal_impulse;
            for k in 0..2 {
                let vt = self.relative_velocity(&c).dot(&c.tangents[k]);
                let new_impulse = (c.tangent_impulses[k] - vt * c.tangent_masses[k])
                    .clamp(-max_friction, max_friction);
                let delta = new_impulse - c.tangent_impulses[k];
                c.tangent_impulses[k] = new_impulse;
                self.apply_contact_impulse(&c, &(c.tangents[k] * delta));
            }

            // Speculative contacts let the gap close during this step.
            let bias = c.dist.max(0.0) / dt;
            let vn = self.relative_velocity(&c).dot(&c.normal);
            let new_impulse = (c.normal_impulse - (vn + bias) * c.normal_mass).max(0.0);
            let delta = new_impulse - c.normal_impulse;
            c.normal_impulse = new_impulse;
            self.apply_contact_impulse(&c, &(c.normal * delta));

            self.contacts[i] = c;
        }
    }

    fn solve_contact_positions(&mut self, dt: Real) {
        for i in 0..self.contacts.len() {
            let mut c = self.contacts[i];
            let penetration = -c.dist - self.allowed_penetration;

            if penetration <= 0.0 {
                continue;
            }

            let target = self.erp * penetration / dt;
            let pvn = self.relative_pseudo_velocity(&c).dot(&c.normal);
            let new_impulse = (c.pseudo_impulse + (target - pvn) * c.normal_mass).max(0.0);
            let delta = new_impulse - c.pseudo_impulse;
            c.pseudo_impulse = new_impulse;

            let impulse = c.normal * delta;
            self.solver_bodies[c.body1].apply_pseudo_impulse(&-impulse, &c.r1);
            if let Some(b2) = c.body2 {
                self.solver_bodies[b2].apply_pseudo_impulse(&impulse, &c.r2);
            }

            self.contacts[i] = c;
        }
    }

    fn solve_joint_velocities(&mut self) {
        for joint in &self.joints {
            let (b1, b2) = (
                self.solver_bodies[joint.body1],
                self.solver_bodies[joint.body2],
            );
            let cdot = b2.velocity_at(&joint.r2) - b1.velocity_at(&joint.r1);
            let impulse = -(joint.inv_mass_matrix * cdot);

            self.solver_bodies[joint.body1].apply_impulse(&-impulse, &joint.r1);
            self.solver_bodies[joint.body2].apply_impulse(&impulse, &joint.r2);
        }
    }

    fn solve_joint_positions(&mut self, dt: Real) {
        for joint in &self.joints {
            let (b1, b2) = (
                self.solver_bodies[joint.body1],
                self.solver_bodies[joint.body2],
            );
            let error = (b2.center + joint.r2) - (b1.center + joint.r1);
            let pcdot = b2.pseudo_velocity_at(&joint.r2) - b1.pseudo_velocity_at(&joint.r1);
            let impulse = joint.inv_mass_matrix * (-error * (self.erp / dt) - pcdot);

            self.solver_bodies[joint.body1].apply_pseudo_impulse(&-impulse, &joint.r1);
            self.solver_bodies[joint.body2].apply_pseudo_impulse(&impulse, &joint.r2);
        }
    }
}

impl ContactSolver for SequentialImpulseSolver {
    fn solve(
        &mut self,
        bodies: &mut RigidBodySet,
        mesh_contacts: &mut [MeshContact],
        body_contacts: &mut [ContactPair],
        joints: &JointSet,
        dt: Real,
        position_iterations: usize,
        velocity_iterations: usize,
    ) {
        self.solver_bodies.clear();
        self.body_indices.clear();
        self.contacts.clear();
        self.joints.clear();

        for (i, contact) in mesh_contacts.iter().enumerate() {
            if contact.manifold.is_empty() {
                continue;
            }
            if let Some(b1) = self.body_index(bodies, contact.body) {
                self.add_manifold(b1, None, &contact.manifold, contact.friction, |k| {
                    ContactSource::Mesh(i, k)
                });
            }
        }

        for (i, pair) in body_contacts.iter().enumerate() {
            if pair.manifold.is_empty() {
                continue;
            }
            if let (Some(b1), Some(b2)) = (
                self.body_index(bodies, pair.body1),
                self.body_index(bodies, pair.body2),
            ) {
                self.add_manifold(b1, Some(b2), &pair.manifold, pair.friction, |k| {
                    ContactSource::Pair(i, k)
                });
            }
        }

        for (_, joint) in joints.iter() {
            let (Some(b1), Some(b2)) = (
                self.body_index(bodies, joint.body1),
                self.body_index(bodies, joint.body2),
            ) else {
                continue;
            };

            let r1 = bodies[joint.body1].rotation() * joint.anchor1.coords;
            let r2 = bodies[joint.body2].rotation() * joint.anchor2.coords;
            let (sb1, sb2) = (&self.solver_bodies[b1], &self.solver_bodies[b2]);

            if !sb1.mobile && !sb2.mobile {
                continue;
            }

            let Some(inv_mass_matrix) =
                (sb1.inv_mass_matrix(&r1) + sb2.inv_mass_matrix(&r2)).try_inverse()
            else {
                continue;
            };

            self.joints.push(JointConstraint {
                body1: b1,
                body2: b2,
                r1,
                r2,
                inv_mass_matrix,
            });
        }

        if self.warm_starting {
            self.warm_start();
        }

        for _ in 0..velocity_iterations {
            self.solve_joint_velocities();
            self.solve_contact_velocities(dt);
        }

        for _ in 0..position_iterations {
            self.solve_joint_positions(dt);
            self.solve_contact_positions(dt);
        }

        for c in &self.contacts {
            let point = match c.source {
                ContactSource::Mesh(i, k) => &mut mesh_contacts[i].manifold.points[k],
                ContactSource::Pair(i, k) => &mut body_contacts[i].manifold.points[k],
            };
            point.normal_impulse = c.normal_impulse;
            point.tangent_impulses = c.tangent_impulses;
        }

        for sb in &self.solver_bodies {
            if sb.mobile {
                bodies[sb.handle].set_solver_velocities(
                    sb.linvel,
                    sb.angvel,
                    sb.pseudo_linvel,
                    sb.pseudo_angvel,
                );
            }
        }

        log::trace!(
            "Solved {} contact points and {} joints over {} bodies.",
            self.contacts.len(),
            self.joints.len(),
            self.solver_bodies.len()
        );
    }
}

/// Two unit vectors orthogonal to `normal` and to each other.
fn tangent_basis(normal: &Vector<Real>) -> [Vector<Real>; 2] {
    let t1 = if normal.x.abs() > 0.57735 {
        Vector::new(normal.y, -normal.x, 0.0)
    } else {
        Vector::new(0.0, normal.z, -normal.y)
    };
    let t1 = t1.try_normalize(Real::EPSILON).unwrap_or_else(Vector::x);
    [t1, normal.cross(&t1)]
}
