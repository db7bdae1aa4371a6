//! Parallel work scheduling.

pub use self::worker_pool::{
    split_into_chunks, Task, WorkerContext, WorkerPool, WorkerPoolError, MAX_OUTSTANDING_ROUNDS,
};

mod worker_pool;
