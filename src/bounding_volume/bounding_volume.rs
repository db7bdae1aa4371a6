use crate::math::{Point, Real};

/// A conservative, cheap-to-test enclosure of some geometry.
///
/// Every operation here runs in constant time. Implementors must keep `merged` and
/// `loosened` monotonic: the result always contains its inputs.
pub trait BoundingVolume: Sized {
    /// A representative point of the volume, usually its center.
    fn center(&self) -> Point<Real>;

    /// Whether the interiors of `self` and `other` overlap.
    fn intersects(&self, other: &Self) -> bool;

    /// Whether `other` lies entirely inside of `self`.
    fn contains(&self, other: &Self) -> bool;

    /// Grows `self` in-place so it also encloses `other`.
    fn merge(&mut self, other: &Self);

    /// The smallest volume enclosing both `self` and `other`.
    fn merged(&self, other: &Self) -> Self;

    /// Grows `self` in-place by `margin` in every direction.
    fn loosen(&mut self, margin: Real);

    /// A copy of `self` grown by `margin` in every direction.
    fn loosened(&self, margin: Real) -> Self;
}
