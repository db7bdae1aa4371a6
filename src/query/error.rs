/// Returned by contact generation when no algorithm exists for a shape pairing.
///
/// Body shapes (balls and cuboids) collide with each other and with static triangles.
/// Anything else, e.g. triangle against triangle, yields this error.
#[derive(thiserror::Error, Debug, Copy, Clone, Eq, PartialEq)]
#[error("no contact algorithm for this pair of shapes")]
pub struct Unsupported;
