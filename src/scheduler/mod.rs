//! Job scheduler for parallel rollouts.
//!
//! ## Overview
//!
//! A fixed pool of worker threads consumes a shared FIFO of [`Job`]s.
//! Jobs may carry a [`JobTag`] so a caller can block until one group of
//! jobs is done without waiting on unrelated work.
//!
//! The search engine uses it exclusively to run the rollouts of one
//! expansion concurrently; tree mutation never happens on a worker.

pub mod job;
pub mod pool;

pub use job::{FnJob, Job, JobTag};
pub use pool::{JobScheduler, SchedulerError, DEFAULT_WORKER_THREADS};
