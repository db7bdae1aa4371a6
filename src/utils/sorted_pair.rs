use core::cmp::PartialOrd;
use core::ops::Deref;

/// A pair of elements sorted in increasing order.
///
/// `SortedPair::new(a, b) == SortedPair::new(b, a)` for any `a` and `b`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct SortedPair<T: PartialOrd>([T; 2]);

impl<T: PartialOrd> SortedPair<T> {
    /// Sorts two elements in increasing order into a new pair.
    pub fn new(element1: T, element2: T) -> Self {
        if element1 > element2 {
            SortedPair([element2, element1])
        } else {
            SortedPair([element1, element2])
        }
    }

    /// The smallest element of this pair.
    #[inline]
    pub fn first(&self) -> &T {
        &self.0[0]
    }

    /// The largest element of this pair.
    #[inline]
    pub fn second(&self) -> &T {
        &self.0[1]
    }
}

impl SortedPair<u32> {
    /// Packs this pair into a single 64-bit key: the smallest element occupies
    /// the high 32 bits, the largest one the low 32 bits.
    #[inline]
    pub fn packed(&self) -> u64 {
        ((self.0[0] as u64) << 32) | self.0[1] as u64
    }
}

impl<T: PartialOrd> Deref for SortedPair<T> {
    type Target = [T; 2];

    fn deref(&self) -> &[T; 2] {
        &self.0
    }
}
