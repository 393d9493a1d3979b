//! Fixed-size worker pool over a shared FIFO job queue.
//!
//! All shared bookkeeping (queue, running count, per-tag pending counts,
//! shutdown flag) lives behind one mutex. Two condition variables signal
//! "a job is available" to workers and "jobs finished" to waiters.

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::{Condvar, Mutex};
use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::{debug, error, trace};

use super::job::{Job, JobTag};

/// Pool size used when none is configured.
pub const DEFAULT_WORKER_THREADS: usize = 4;

/// Errors raised while building the worker pool.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("Job scheduler needs at least one worker thread")]
    NoWorkers,

    #[error("Failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),
}

struct QueueState {
    queue: VecDeque<Box<dyn Job>>,
    running: usize,
    tagged_pending: FxHashMap<JobTag, usize>,
    shutdown: bool,
}

impl QueueState {
    fn all_finished(&self) -> bool {
        self.queue.is_empty() && self.running == 0
    }

    fn tag_finished(&self, tag: JobTag) -> bool {
        self.tagged_pending.get(&tag).map_or(true, |&pending| pending == 0)
    }
}

struct Shared {
    state: Mutex<QueueState>,
    job_available: Condvar,
    jobs_finished: Condvar,
}

/// Fixed pool of worker threads consuming a shared job queue.
///
/// Created once by whatever drives the search and shared (via `Arc`) with
/// every tree that needs parallel rollouts. Dropping the scheduler waits for
/// all outstanding jobs, then stops and joins the workers.
///
/// ## Example
///
/// ```
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
/// use uct_engine::scheduler::{FnJob, JobScheduler};
///
/// let scheduler = JobScheduler::new(2).unwrap();
/// let tag = scheduler.next_tag();
/// let done = Arc::new(AtomicUsize::new(0));
///
/// for _ in 0..8 {
///     let done = Arc::clone(&done);
///     scheduler.schedule(Box::new(FnJob::new(move || {
///         done.fetch_add(1, Ordering::SeqCst);
///     }).with_tag(tag)));
/// }
///
/// scheduler.wait_until_finished(Some(tag));
/// assert_eq!(done.load(Ordering::SeqCst), 8);
/// ```
pub struct JobScheduler {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
    worker_count: usize,
    next_tag: AtomicU64,
}

impl JobScheduler {
    /// Start a pool of `worker_count` threads.
    ///
    /// Fails if `worker_count` is zero or a thread cannot be spawned; workers
    /// spawned before a failure are shut down again.
    pub fn new(worker_count: usize) -> Result<Self, SchedulerError> {
        if worker_count == 0 {
            return Err(SchedulerError::NoWorkers);
        }

        let shared = Arc::new(Shared {
            state: Mutex::new(QueueState {
                queue: VecDeque::new(),
                running: 0,
                tagged_pending: FxHashMap::default(),
                shutdown: false,
            }),
            job_available: Condvar::new(),
            jobs_finished: Condvar::new(),
        });

        let mut scheduler = Self {
            shared,
            workers: Vec::with_capacity(worker_count),
            worker_count,
            next_tag: AtomicU64::new(0),
        };

        for i in 0..worker_count {
            let shared = Arc::clone(&scheduler.shared);
            // On error `scheduler` drops here, joining the workers already started
            let handle = thread::Builder::new()
                .name(format!("rollout-worker-{}", i))
                .spawn(move || worker_loop(shared))?;
            scheduler.workers.push(handle);
        }

        debug!(workers = worker_count, "job scheduler started");
        Ok(scheduler)
    }

    /// Number of worker threads in the pool.
    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Allocate a fresh tag for a group of jobs.
    pub fn next_tag(&self) -> JobTag {
        JobTag::new(self.next_tag.fetch_add(1, Ordering::Relaxed))
    }

    /// Queue a job and wake one idle worker.
    pub fn schedule(&self, job: Box<dyn Job>) {
        let mut state = self.shared.state.lock();
        if let Some(tag) = job.tag() {
            *state.tagged_pending.entry(tag).or_insert(0) += 1;
        }
        state.queue.push_back(job);
        self.shared.job_available.notify_one();
    }

    /// Non-blocking check whether jobs have finished.
    ///
    /// With no tag: the queue is empty and no job is running. With a tag:
    /// no job carrying that tag is queued or running.
    #[must_use]
    pub fn jobs_have_finished(&self, tag: Option<JobTag>) -> bool {
        let state = self.shared.state.lock();
        match tag {
            None => state.all_finished(),
            Some(tag) => state.tag_finished(tag),
        }
    }

    /// Block until jobs have finished (see [`Self::jobs_have_finished`]).
    ///
    /// Must not be called from inside a job.
    pub fn wait_until_finished(&self, tag: Option<JobTag>) {
        let mut state = self.shared.state.lock();
        match tag {
            None => {
                while !state.all_finished() {
                    self.shared.jobs_finished.wait(&mut state);
                }
            }
            Some(tag) => {
                while !state.tag_finished(tag) {
                    self.shared.jobs_finished.wait(&mut state);
                }
            }
        }
    }
}

impl Drop for JobScheduler {
    fn drop(&mut self) {
        self.wait_until_finished(None);

        self.shared.state.lock().shutdown = true;
        self.shared.job_available.notify_all();

        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                error!("rollout worker exited abnormally");
            }
        }
        debug!("job scheduler stopped");
    }
}

impl std::fmt::Debug for JobScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobScheduler")
            .field("worker_count", &self.worker_count)
            .finish_non_exhaustive()
    }
}

fn worker_loop(shared: Arc<Shared>) {
    loop {
        let job = {
            let mut state = shared.state.lock();
            while state.queue.is_empty() && !state.shutdown {
                shared.job_available.wait(&mut state);
            }
            if state.shutdown {
                break;
            }
            let Some(job) = state.queue.pop_front() else {
                continue;
            };
            state.running += 1;
            job
        };

        let tag = job.tag();
        trace!(?tag, "running job");
        if panic::catch_unwind(AssertUnwindSafe(|| job.execute())).is_err() {
            error!(?tag, "job panicked");
        }

        let mut state = shared.state.lock();
        state.running -= 1;
        let mut tag_done = false;
        if let Some(tag) = tag {
            if let Some(pending) = state.tagged_pending.get_mut(&tag) {
                *pending -= 1;
                if *pending == 0 {
                    state.tagged_pending.remove(&tag);
                    tag_done = true;
                }
            }
        }
        if tag_done || state.running == 0 {
            shared.jobs_finished.notify_all();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::FnJob;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    #[test]
    fn test_zero_workers_rejected() {
        assert!(matches!(JobScheduler::new(0), Err(SchedulerError::NoWorkers)));
    }

    #[test]
    fn test_worker_count() {
        let scheduler = JobScheduler::new(3).unwrap();
        assert_eq!(scheduler.worker_count(), 3);
    }

    #[test]
    fn test_tags_are_unique() {
        let scheduler = JobScheduler::new(1).unwrap();
        let a = scheduler.next_tag();
        let b = scheduler.next_tag();
        assert_ne!(a, b);
    }

    #[test]
    fn test_wait_all() {
        let scheduler = JobScheduler::new(4).unwrap();
        let counter = Arc::new(AtomicUsize::new(0));

        for _ in 0..100 {
            let counter = Arc::clone(&counter);
            scheduler.schedule(Box::new(FnJob::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })));
        }

        scheduler.wait_until_finished(None);

        assert_eq!(counter.load(Ordering::SeqCst), 100);
        assert!(scheduler.jobs_have_finished(None));
    }

    #[test]
    fn test_wait_tagged_only() {
        let scheduler = JobScheduler::new(2).unwrap();
        let fast = scheduler.next_tag();
        let counter = Arc::new(AtomicUsize::new(0));

        for _ in 0..4 {
            let counter = Arc::clone(&counter);
            scheduler.schedule(Box::new(
                FnJob::new(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                })
                .with_tag(fast),
            ));
        }

        scheduler.wait_until_finished(Some(fast));

        assert_eq!(counter.load(Ordering::SeqCst), 4);
        assert!(scheduler.jobs_have_finished(Some(fast)));
    }

    #[test]
    fn test_unknown_tag_is_finished() {
        let scheduler = JobScheduler::new(1).unwrap();
        let tag = scheduler.next_tag();

        assert!(scheduler.jobs_have_finished(Some(tag)));
        // Returns immediately
        scheduler.wait_until_finished(Some(tag));
    }

    #[test]
    fn test_panicking_job_does_not_stall_pool() {
        let scheduler = JobScheduler::new(1).unwrap();
        let tag = scheduler.next_tag();
        let counter = Arc::new(AtomicUsize::new(0));

        scheduler.schedule(Box::new(FnJob::new(|| panic!("boom")).with_tag(tag)));
        let c = Arc::clone(&counter);
        scheduler.schedule(Box::new(
            FnJob::new(move || {
                c.fetch_add(1, Ordering::SeqCst);
            })
            .with_tag(tag),
        ));

        scheduler.wait_until_finished(Some(tag));

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_drains_queue() {
        let counter = Arc::new(AtomicUsize::new(0));
        {
            let scheduler = JobScheduler::new(2).unwrap();
            for _ in 0..10 {
                let counter = Arc::clone(&counter);
                scheduler.schedule(Box::new(FnJob::new(move || {
                    thread::sleep(Duration::from_millis(1));
                    counter.fetch_add(1, Ordering::SeqCst);
                })));
            }
        }
        assert_eq!(counter.load(Ordering::SeqCst), 10);
    }
}
