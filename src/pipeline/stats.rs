use std::time::Duration;

/// The time spent in each stage of a step.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct StageTimings {
    /// Application of external forces.
    pub forces: Duration,
    /// Broad-phase tree refit and pair detection.
    pub broad_phase: Duration,
    /// Contact generation.
    pub narrow_phase: Duration,
    /// Contact and joint resolution.
    pub solver: Duration,
    /// Position integration and sleeping.
    pub integration: Duration,
    /// The whole step.
    pub total: Duration,
}

/// Counters describing the last step of a [`World`](crate::pipeline::World).
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct StepStats {
    /// The index of the step, starting at 1 for the first one.
    pub frame: u64,
    /// The number of dynamic bodies awake at the end of the step.
    pub num_awake: usize,
    /// The number of dynamic bodies sleeping at the end of the step.
    pub num_sleeping: usize,
    /// The number of bodies that fell asleep during the step.
    pub num_fell_asleep: usize,
    /// The number of broad-phase leaves whose AABB was updated.
    pub num_broad_phase_updates: usize,
    /// The number of body pairs with at least one contact point.
    pub num_active_pairs: usize,
    /// The number of body pairs tracked by the broad-phase.
    pub num_pairs: usize,
    /// The number of contacts between bodies and static triangles.
    pub num_mesh_contacts: usize,
    /// The number of body pairs created during the step.
    pub num_pairs_created: usize,
    /// The number of body pairs removed during the step.
    pub num_pairs_removed: usize,
    /// The time spent in each stage.
    pub timings: StageTimings,
}
