use crate::bounding_volume::BoundingVolume;
use crate::dynamics::{RigidBodyHandle, RigidBodySet};
use crate::math::{Isometry, Real};
use crate::partitioning::StaticGeometry;
use crate::pipeline::combine_friction;
use crate::pipeline::{ContactPair, MeshContact};
use crate::query::{self, ContactManifold};
use crate::shape::{StaticMeshHandle, TriangleRef};
use crate::utils::hashmap::HashMap;

/// Generates the contact points between pairs of bodies, and between bodies and static
/// triangles.
#[derive(Clone, Debug, Default)]
pub struct NarrowPhase {
    mesh_contacts: Vec<MeshContact>,
    /// The manifolds of the previous step, reused to warm-start the contacts that persist.
    previous: HashMap<(RigidBodyHandle, TriangleRef), ContactManifold>,
    triangles: Vec<TriangleRef>,
}

impl NarrowPhase {
    /// An empty narrow-phase.
    pub fn new() -> Self {
        Self::default()
    }

    /// The contacts between bodies and static triangles found by the last call to
    /// [`Self::update_mesh_contacts`].
    #[inline]
    pub fn mesh_contacts(&self) -> &[MeshContact] {
        &self.mesh_contacts
    }

    /// The contacts between bodies and static triangles, mutably.
    #[inline]
    pub fn mesh_contacts_mut(&mut self) -> &mut [MeshContact] {
        &mut self.mesh_contacts
    }

    /// Forgets every contact involving `body`.
    pub fn remove_body(&mut self, body: RigidBodyHandle) {
        self.mesh_contacts.retain(|c| c.body != body);
    }

    /// Forgets every contact involving a triangle of `mesh`.
    pub fn remove_mesh(&mut self, mesh: StaticMeshHandle) {
        self.mesh_contacts.retain(|c| c.triangle.mesh != mesh);
    }

    /// Updates the contact points of every pair involving at least one awake dynamic body.
    ///
    /// A sleeping body gaining a contact with an awake body is woken up. Pairs of shapes
    /// without a contact generator are left without contacts.
    pub fn update_pairs(
        &mut self,
        pairs: &mut [ContactPair],
        bodies: &mut RigidBodySet,
        prediction: Real,
    ) {
        for pair in pairs {
            let (Some(rb1), Some(rb2)) = (bodies.get(pair.body1), bodies.get(pair.body2)) else {
                pair.manifold.clear();
                continue;
            };

            let active1 = !rb1.is_fixed() && !rb1.is_sleeping();
            let active2 = !rb2.is_fixed() && !rb2.is_sleeping();

            if !active1 && !active2 {
                continue;
            }

            let was_touching = !pair.manifold.is_empty();
            let touching = match query::contact_manifold(
                rb1.position(),
                rb1.shape(),
                rb2.position(),
                rb2.shape(),
                prediction,
                &mut pair.manifold,
            ) {
                Ok(touching) => touching,
                Err(_) => {
                    log::trace!(
                        "No contact generator between {:?} and {:?}.",
                        rb1.shape().shape_type(),
                        rb2.shape().shape_type()
                    );
                    pair.manifold.clear();
                    false
                }
            };

            if touching && !was_touching {
                for handle in [pair.body1, pair.body2] {
                    if bodies[handle].is_sleeping() {
                        bodies[handle].wake_up();
                    }
                }
            }
        }
    }

    /// Finds the contacts between every awake dynamic body and the static triangles close to
    /// it.
    ///
    /// Contacts with a triangle that already touched the same body at the previous step keep
    /// their accumulated impulses.
    pub fn update_mesh_contacts(
        &mut self,
        bodies: &RigidBodySet,
        geometry: &StaticGeometry,
        static_friction: Real,
        prediction: Real,
    ) {
        self.previous.clear();
        self.previous.extend(
            self.mesh_contacts
                .drain(..)
                .map(|c| ((c.body, c.triangle), c.manifold)),
        );

        for (handle, body) in bodies.iter_active() {
            self.triangles.clear();
            geometry.box_query(&body.aabb().loosened(prediction), &mut self.triangles);

            for tri in &self.triangles {
                let mut manifold = self
                    .previous
                    .remove(&(handle, *tri))
                    .unwrap_or_else(|| ContactManifold::with_capacity(body.shape().max_contacts()));

                let touching = query::contact_manifold(
                    body.position(),
                    body.shape(),
                    &Isometry::identity(),
                    geometry.triangle(*tri),
                    prediction,
                    &mut manifold,
                )
                .unwrap_or(false);

                if touching {
                    self.mesh_contacts.push(MeshContact {
                        body: handle,
                        triangle: *tri,
                        manifold,
                        friction: combine_friction(body.friction(), static_friction),
                    });
                }
            }
        }

        log::trace!(
            "{} contacts with static triangles.",
            self.mesh_contacts.len()
        );
    }
}
