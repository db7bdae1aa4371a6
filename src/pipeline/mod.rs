//! The simulation pipeline: configuration, broad-phase, pair bookkeeping, narrow-phase and
//! the world stepping all of them.

pub use self::broad_phase::BroadPhase;
pub use self::collision_filter::{CollisionFilter, CollisionGroups, DefaultCollisionFilter, Group};
pub use self::config::{WorldConfig, DEFAULT_PARALLEL_CUTOFF_DEPTH};
pub use self::contact_pairs::{combine_friction, pair_id, ContactPair, MeshContact, PairManager};
pub use self::narrow_phase::NarrowPhase;
pub use self::stats::{StageTimings, StepStats};
pub use self::world::{World, WorldError};

mod broad_phase;
mod collision_filter;
mod config;
mod contact_pairs;
mod narrow_phase;
mod stats;
mod world;
