//! Implementation details of the `contact_manifold` function.

pub use self::contact_ball_ball::contact_ball_ball;
pub use self::contact_ball_cuboid::{contact_ball_cuboid, contact_cuboid_ball};
pub use self::contact_ball_triangle::contact_ball_triangle;
pub use self::contact_cuboid_cuboid::contact_cuboid_cuboid;
pub use self::contact_cuboid_triangle::contact_cuboid_triangle;
pub use self::contact_manifold::{
    contact_manifold, ContactCandidates, ContactManifold, TrackedContact,
};

mod contact_ball_ball;
mod contact_ball_cuboid;
mod contact_ball_triangle;
mod contact_cuboid_cuboid;
mod contact_cuboid_triangle;
mod contact_manifold;
