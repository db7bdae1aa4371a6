//! Small helpers shared by the partitioning structures and the pipeline.

pub(crate) use self::cost_entry::CostEntry;
pub use self::sorted_pair::SortedPair;

mod cost_entry;
pub mod hashmap;
mod sorted_pair;
