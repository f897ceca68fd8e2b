//! # Job System Core Types
//!
//! This module defines what the worker pool runs and what it hands back.
//!
//! ## Core Components
//! - `JobProcessor`: The work performed for one chunk, shared by every worker
//! - `JobOutcome`: The result of one job, successful or not
//!
//! ## Job Lifecycle
//! 1. A chunk position is submitted via `WorkerPool::submit()`
//! 2. A worker calls `JobProcessor::process()` with that position
//! 3. Errors and panics are turned into a `JobError` on the worker
//! 4. The `JobOutcome` is collected on the owning thread by `WorkerPool::poll_completed()`
//!
//! ## Thread Safety
//! - A processor is shared between workers behind an `Arc`, so it must be `Send + Sync`
//! - Its output crosses back to the owning thread, so it must be `Send`

use cgmath::Point3;

use crate::error::JobError;

/// The work the pool performs for one chunk position.
///
/// # Implementation Guidelines
/// - Must be `Send + Sync`: one instance is shared by every worker
/// - Should own or share (through `MtResource`/`World` handles) everything it reads
/// - Should report failure through `Err` rather than panicking; panics are still
///   caught and reported as [`JobError::Panicked`]
pub trait JobProcessor: Send + Sync + 'static {
    /// What a successful job produces.
    type Output: Send + 'static;

    /// Runs the job for one chunk. Called on a worker thread.
    fn process(&self, position: Point3<i32>) -> Result<Self::Output, JobError>;
}

/// The result of one job, as observed by the owning thread.
#[derive(Debug)]
pub struct JobOutcome<T> {
    /// Index of the worker that ran the job
    pub worker: usize,
    /// The chunk the job was for
    pub position: Point3<i32>,
    /// The job's output, or why it produced none
    pub result: Result<T, JobError>,
}
