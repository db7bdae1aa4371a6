use crate::math::Real;
use core::cmp::Ordering;
use ordered_float::OrderedFloat;

/// An entry of a best-first search queue.
///
/// The ordering is reversed on `cost` so a `BinaryHeap` of entries behaves as a
/// min-queue. The payload never takes part in comparisons.
#[derive(Copy, Clone, Debug)]
pub(crate) struct CostEntry<T> {
    pub item: T,
    pub cost: Real,
}

impl<T> CostEntry<T> {
    #[inline]
    pub fn new(item: T, cost: Real) -> Self {
        Self { item, cost }
    }

    #[inline]
    fn key(&self) -> OrderedFloat<Real> {
        OrderedFloat(self.cost)
    }
}

impl<T> PartialEq for CostEntry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl<T> Eq for CostEntry<T> {}

impl<T> PartialOrd for CostEntry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for CostEntry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        other.key().cmp(&self.key())
    }
}

#[cfg(test)]
mod test {
    use super::CostEntry;
    use std::collections::BinaryHeap;

    #[test]
    fn cheapest_entry_pops_first() {
        let mut queue: BinaryHeap<_> = [3.0, -1.0, 2.5, 0.0]
            .iter()
            .enumerate()
            .map(|(i, c)| CostEntry::new(i, *c))
            .collect();

        let order: Vec<_> = core::iter::from_fn(|| queue.pop().map(|e| e.item)).collect();
        assert_eq!(order, vec![1, 3, 2, 0]);
    }
}
