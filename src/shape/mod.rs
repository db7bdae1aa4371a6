//! Shapes supported by impetus.

pub use self::ball::Ball;
pub use self::cuboid::Cuboid;
pub use self::shape::{Shape, ShapeType, TypedShape};
pub use self::static_mesh::{StaticMesh, StaticMeshError, StaticMeshHandle, TriangleRef};
pub use self::triangle::{Triangle, TriangleError};

mod ball;
mod cuboid;
mod shape;
mod static_mesh;
mod triangle;
