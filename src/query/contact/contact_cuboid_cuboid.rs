use crate::math::{Isometry, Real, Vector};
use crate::query::contact::{ContactCandidates, TrackedContact};
use crate::shape::Cuboid;

/// Minimum cosine between a contact point normal and the manifold normal for the point to be
/// kept in the manifold.
const NORMAL_ALIGNMENT: Real = 0.9;

/// Tests the vertices of `cuboid2` against `cuboid1`.
///
/// Each candidate gets the outward normal of `cuboid1` at the projection of the vertex.
fn vertices_against_cuboid(
    pos1: &Isometry<Real>,
    cuboid1: &Cuboid,
    pos2: &Isometry<Real>,
    cuboid2: &Cuboid,
    prediction: Real,
    fid_offset: u32,
    flip: bool,
    out: &mut Vec<(Vector<Real>, TrackedContact)>,
) {
    let pos12 = pos1.inv_mul(pos2);

    for (i, vtx) in cuboid2.vertices().iter().enumerate() {
        let local_vtx = pos12 * vtx;
        let (proj, local_normal, dist) = cuboid1.project_local_point(&local_vtx);

        if dist <= prediction {
            let normal = pos1 * local_normal;
            let contact = TrackedContact::new(pos1 * proj, pos2 * vtx, dist, fid_offset + i as u32);

            if flip {
                out.push((-normal, contact.flipped()));
            } else {
                out.push((normal, contact));
            }
        }
    }
}

/// Contact between two cuboids, computed by testing the vertices of each cuboid against the
/// other one.
///
/// The deepest vertex selects the manifold normal; only the vertices with a normal aligned
/// with it are kept. Edge-edge configurations without any vertex inside the other cuboid are
/// not detected.
pub fn contact_cuboid_cuboid(
    pos1: &Isometry<Real>,
    cuboid1: &Cuboid,
    pos2: &Isometry<Real>,
    cuboid2: &Cuboid,
    prediction: Real,
) -> Option<(Vector<Real>, ContactCandidates)> {
    let mut all = Vec::new();
    vertices_against_cuboid(pos1, cuboid1, pos2, cuboid2, prediction, 0, false, &mut all);
    vertices_against_cuboid(pos2, cuboid2, pos1, cuboid1, prediction, 8, true, &mut all);

    let (normal, _) = all
        .iter()
        .min_by(|a, b| a.1.dist.total_cmp(&b.1.dist))
        .copied()?;

    let candidates = all
        .into_iter()
        .filter(|(n, _)| n.dot(&normal) >= NORMAL_ALIGNMENT)
        .map(|(_, mut contact)| {
            contact.dist = (contact.point2 - contact.point1).dot(&normal);
            contact
        })
        .collect();

    Some((normal, candidates))
}
