use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, SyncSender, TrySendError};
use std::sync::{Arc, Barrier};
use std::thread::{self, JoinHandle};

/// The maximum number of rounds of work that can be scheduled without waiting for their
/// termination. This is a safety margin against a runaway scheduler, not a throughput knob.
pub const MAX_OUTSTANDING_ROUNDS: usize = 20;

/// A unit of work executed by a single worker thread.
pub type Task = Box<dyn FnOnce(&WorkerContext) + Send + 'static>;

/// Errors reported by the [`WorkerPool`].
#[derive(thiserror::Error, Debug)]
pub enum WorkerPoolError {
    /// A pool needs at least two threads to be useful.
    #[error("a worker pool needs at least 2 threads, {0} requested")]
    InvalidThreadCount(usize),
    /// The number of scheduled tasks must match the number of threads.
    #[error("expected exactly {expected} tasks (one per worker), got {found}")]
    TaskCountMismatch {
        /// The number of worker threads.
        expected: usize,
        /// The number of tasks given.
        found: usize,
    },
    /// Too many rounds were scheduled without waiting for their termination.
    #[error("{} rounds of work are already waiting for termination", MAX_OUTSTANDING_ROUNDS)]
    QueueFull,
    /// A worker thread could not be spawned.
    #[error("failed to spawn worker thread {index}: {source}")]
    Spawn {
        /// The index of the worker that failed to start.
        index: usize,
        /// The underlying OS error.
        #[source]
        source: std::io::Error,
    },
    /// A worker thread no longer accepts work.
    #[error("the worker thread {0} is no longer running")]
    Disconnected(usize),
}

/// The execution context given to each task.
pub struct WorkerContext {
    worker_index: usize,
    thread_count: usize,
    group_barrier: Arc<Barrier>,
}

impl WorkerContext {
    /// The index of the worker executing the task, in `0..thread_count`.
    #[inline]
    pub fn worker_index(&self) -> usize {
        self.worker_index
    }

    /// The number of workers of the pool.
    #[inline]
    pub fn thread_count(&self) -> usize {
        self.thread_count
    }

    /// Blocks until every worker of the pool reached this call.
    ///
    /// Every task of the round must call this the same number of times, otherwise the pool
    /// deadlocks.
    pub fn sync_group(&self) {
        let _ = self.group_barrier.wait();
    }
}

struct Worker {
    sender: Option<SyncSender<Task>>,
    handle: Option<JoinHandle<()>>,
}

/// A fixed-size pool of worker threads executing rounds of tasks.
///
/// A round is made of exactly one task per worker. Each worker owns a bounded queue of tasks.
/// Workers synchronize with each other through a group barrier (see
/// [`WorkerContext::sync_group`]) and with the scheduling thread through a termination barrier
/// that includes it (see [`WorkerPool::wait_for_task_termination`]).
///
/// A panic inside of a task aborts the whole process.
pub struct WorkerPool {
    workers: Vec<Worker>,
    termination_barrier: Arc<Barrier>,
    outstanding_rounds: usize,
}

impl WorkerPool {
    /// Starts a pool of `thread_count` worker threads.
    pub fn new(thread_count: usize) -> Result<Self, WorkerPoolError> {
        if thread_count < 2 {
            return Err(WorkerPoolError::InvalidThreadCount(thread_count));
        }

        let group_barrier = Arc::new(Barrier::new(thread_count));
        let termination_barrier = Arc::new(Barrier::new(thread_count + 1));
        let mut pool = WorkerPool {
            workers: Vec::with_capacity(thread_count),
            termination_barrier: termination_barrier.clone(),
            outstanding_rounds: 0,
        };

        for worker_index in 0..thread_count {
            let (sender, receiver) = mpsc::sync_channel::<Task>(MAX_OUTSTANDING_ROUNDS);
            let context = WorkerContext {
                worker_index,
                thread_count,
                group_barrier: group_barrier.clone(),
            };
            let termination_barrier = termination_barrier.clone();

            let handle = thread::Builder::new()
                .name(format!("impetus-worker-{}", worker_index))
                .spawn(move || {
                    while let Ok(task) = receiver.recv() {
                        let result = panic::catch_unwind(AssertUnwindSafe(|| task(&context)));

                        if result.is_err() {
                            log::error!(
                                "Worker thread {} panicked while executing a task, aborting.",
                                context.worker_index
                            );
                            std::process::abort();
                        }

                        let _ = termination_barrier.wait();
                    }
                })
                .map_err(|source| WorkerPoolError::Spawn {
                    index: worker_index,
                    source,
                })?;

            pool.workers.push(Worker {
                sender: Some(sender),
                handle: Some(handle),
            });
        }

        log::debug!("Started a worker pool with {} threads.", thread_count);
        Ok(pool)
    }

    /// The number of worker threads of this pool.
    #[inline]
    pub fn thread_count(&self) -> usize {
        self.workers.len()
    }

    /// The number of rounds scheduled but not waited for yet.
    #[inline]
    pub fn outstanding_rounds(&self) -> usize {
        self.outstanding_rounds
    }

    /// Schedules a round of work: the `i`-th task is executed by the `i`-th worker.
    ///
    /// Fails without scheduling anything if `tasks` does not contain exactly one task per
    /// worker, or if too many rounds are already waiting for termination.
    pub fn schedule_work(&mut self, tasks: Vec<Task>) -> Result<(), WorkerPoolError> {
        if tasks.len() != self.workers.len() {
            return Err(WorkerPoolError::TaskCountMismatch {
                expected: self.workers.len(),
                found: tasks.len(),
            });
        }

        if self.outstanding_rounds >= MAX_OUTSTANDING_ROUNDS {
            return Err(WorkerPoolError::QueueFull);
        }

        for (index, (worker, task)) in self.workers.iter().zip(tasks).enumerate() {
            let sender = worker
                .sender
                .as_ref()
                .ok_or(WorkerPoolError::Disconnected(index))?;

            match sender.try_send(task) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => return Err(WorkerPoolError::QueueFull),
                Err(TrySendError::Disconnected(_)) => {
                    return Err(WorkerPoolError::Disconnected(index))
                }
            }
        }

        self.outstanding_rounds += 1;
        log::trace!("Scheduled a round of {} tasks.", self.workers.len());
        Ok(())
    }

    /// Blocks until every worker completed every round scheduled so far.
    pub fn wait_for_task_termination(&mut self) {
        if self.outstanding_rounds == 0 {
            log::warn!("Waiting for the termination of a worker pool without scheduled work.");
            return;
        }

        while self.outstanding_rounds > 0 {
            let _ = self.termination_barrier.wait();
            self.outstanding_rounds -= 1;
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        while self.outstanding_rounds > 0 {
            let _ = self.termination_barrier.wait();
            self.outstanding_rounds -= 1;
        }

        // Closing the queues makes the workers leave their loop.
        for worker in &mut self.workers {
            worker.sender = None;
        }

        for worker in &mut self.workers {
            if let Some(handle) = worker.handle.take() {
                let _ = handle.join();
            }
        }

        log::debug!("Stopped a worker pool with {} threads.", self.workers.len());
    }
}

/// Splits `items` into `parts` contiguous chunks of near-equal sizes.
///
/// Every chunk has `items.len() / parts` elements except the last one, which also receives
/// the remainder.
pub fn split_into_chunks<T>(mut items: Vec<T>, parts: usize) -> Vec<Vec<T>> {
    assert!(parts > 0, "Cannot split a list into zero chunks.");
    let chunk_len = items.len() / parts;
    let mut chunks = Vec::with_capacity(parts);

    for _ in 0..parts - 1 {
        let rest = items.split_off(chunk_len);
        chunks.push(items);
        items = rest;
    }

    chunks.push(items);
    chunks
}
