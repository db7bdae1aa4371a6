use crate::dynamics::SleepConfig;
use crate::math::{Real, Vector};
use crate::pipeline::WorldError;

/// The depth at which the broad-phase tree is split into subtrees for its parallel refit.
pub const DEFAULT_PARALLEL_CUTOFF_DEPTH: usize = 5;

/// Parameters of a [`World`](crate::pipeline::World).
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct WorldConfig {
    /// The duration of a single step, in seconds.
    pub dt: Real,
    /// The number of velocity iterations of the contact solver.
    pub velocity_iterations: usize,
    /// The number of position iterations of the contact solver.
    pub position_iterations: usize,
    /// The gravity applied to every body with forces enabled.
    pub gravity: Vector<Real>,
    /// The size of the cubic cells of the static geometry grid.
    pub static_cell_size: Real,
    /// The number of subdivisions of the octree of each cell of the static geometry grid.
    pub static_octree_depth: u32,
    /// The margin by which the broad-phase enlarges the AABB of each body.
    ///
    /// A body moving inside of its enlarged AABB doesn’t need a broad-phase update.
    pub broad_phase_margin: Real,
    /// Contacts are generated as soon as shapes are closer than this distance.
    pub prediction_distance: Real,
    /// The depth at which the broad-phase tree is split for its parallel refit.
    pub parallel_cutoff_depth: usize,
    /// The number of worker threads. Zero runs everything on the calling thread, otherwise
    /// it must be at least 2.
    pub worker_threads: usize,
    /// Are contact impulses reused from one step to the next?
    pub warm_starting: bool,
    /// Is the gyroscopic term integrated?
    pub gyroscopic: bool,
    /// The fraction of the penetration depth corrected at each step.
    pub contact_erp: Real,
    /// The penetration depth left uncorrected.
    pub allowed_penetration: Real,
    /// The friction coefficient of static meshes.
    pub friction: Real,
    /// The parameters of the sleep state machine.
    pub sleep: SleepConfig,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            dt: 1.0 / 60.0,
            velocity_iterations: 8,
            position_iterations: 2,
            gravity: Vector::new(0.0, -9.81, 0.0),
            static_cell_size: 32.0,
            static_octree_depth: 5,
            broad_phase_margin: 0.05,
            prediction_distance: 0.02,
            parallel_cutoff_depth: DEFAULT_PARALLEL_CUTOFF_DEPTH,
            worker_threads: 0,
            warm_starting: true,
            gyroscopic: true,
            contact_erp: 0.2,
            allowed_penetration: 0.005,
            friction: 0.5,
            sleep: SleepConfig::default(),
        }
    }
}

impl WorldConfig {
    /// Sets the duration of a step.
    #[must_use]
    pub fn with_dt(mut self, dt: Real) -> Self {
        self.dt = dt;
        self
    }

    /// Sets the number of velocity and position iterations of the solver.
    #[must_use]
    pub fn with_iterations(
        mut self,
        velocity_iterations: usize,
        position_iterations: usize,
    ) -> Self {
        self.velocity_iterations = velocity_iterations;
        self.position_iterations = position_iterations;
        self
    }

    /// Sets the gravity.
    #[must_use]
    pub fn with_gravity(mut self, gravity: Vector<Real>) -> Self {
        self.gravity = gravity;
        self
    }

    /// Sets the cell size and octree depth of the static geometry grid.
    #[must_use]
    pub fn with_static_grid(mut self, cell_size: Real, octree_depth: u32) -> Self {
        self.static_cell_size = cell_size;
        self.static_octree_depth = octree_depth;
        self
    }

    /// Sets the broad-phase margin.
    #[must_use]
    pub fn with_broad_phase_margin(mut self, margin: Real) -> Self {
        self.broad_phase_margin = margin;
        self
    }

    /// Sets the contact prediction distance.
    #[must_use]
    pub fn with_prediction_distance(mut self, distance: Real) -> Self {
        self.prediction_distance = distance;
        self
    }

    /// Sets the number of worker threads, and the depth at which the broad-phase tree is
    /// split among them.
    #[must_use]
    pub fn with_worker_threads(mut self, threads: usize, cutoff_depth: usize) -> Self {
        self.worker_threads = threads;
        self.parallel_cutoff_depth = cutoff_depth;
        self
    }

    /// Enables or disables warm-starting.
    #[must_use]
    pub fn with_warm_starting(mut self, enabled: bool) -> Self {
        self.warm_starting = enabled;
        self
    }

    /// Enables or disables the gyroscopic term.
    #[must_use]
    pub fn with_gyroscopic(mut self, enabled: bool) -> Self {
        self.gyroscopic = enabled;
        self
    }

    /// Sets the penetration correction parameters.
    #[must_use]
    pub fn with_penetration_correction(mut self, erp: Real, allowed_penetration: Real) -> Self {
        self.contact_erp = erp;
        self.allowed_penetration = allowed_penetration;
        self
    }

    /// Sets the friction coefficient of static meshes.
    #[must_use]
    pub fn with_friction(mut self, friction: Real) -> Self {
        self.friction = friction;
        self
    }

    /// Sets the parameters of the sleep state machine.
    #[must_use]
    pub fn with_sleep(mut self, sleep: SleepConfig) -> Self {
        self.sleep = sleep;
        self
    }

    /// Checks that every parameter is in its valid range.
    pub fn validate(&self) -> Result<(), WorldError> {
        let check = |valid: bool, reason: &'static str| {
            if valid {
                Ok(())
            } else {
                Err(WorldError::InvalidConfig(reason))
            }
        };

        check(self.dt.is_finite() && self.dt > 0.0, "the time step must be positive")?;
        check(
            self.velocity_iterations > 0,
            "at least one velocity iteration is needed",
        )?;
        check(
            self.static_cell_size.is_finite() && self.static_cell_size > 0.0,
            "the static cell size must be positive",
        )?;
        check(
            self.broad_phase_margin >= 0.0,
            "the broad-phase margin must not be negative",
        )?;
        check(
            self.prediction_distance >= 0.0,
            "the prediction distance must not be negative",
        )?;
        check(
            self.worker_threads != 1,
            "a worker pool needs at least 2 threads",
        )?;
        check(
            self.contact_erp >= 0.0 && self.contact_erp <= 1.0,
            "the contact ERP must be in [0, 1]",
        )?;
        check(
            self.allowed_penetration >= 0.0,
            "the allowed penetration must not be negative",
        )?;
        check(self.friction >= 0.0, "the friction must not be negative")?;
        check(
            self.sleep.frames_at_rest > 0,
            "bodies must rest at least one frame before sleeping",
        )
    }
}
