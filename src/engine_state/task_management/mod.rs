//! # Task Management System
//!
//! This module provides the worker pool that runs meshing jobs off the owning
//! thread.
//!
//! ## Architecture Overview
//!
//! The task management system consists of several key components:
//! - `WorkerPool`: Central coordinator for job distribution and worker management
//! - `JobProcessor`: The work performed for one chunk position
//! - `JobOutcome`: The result of a completed job, sent back to the owning thread
//! - `TaskChannel`: Communication channel between the owning thread and one worker
//!
//! Each worker is a plain `std::thread` with a dedicated pair of `mpsc` channels:
//! positions go in, outcomes come out. Every job produces exactly one outcome,
//! even when it fails, so the in-flight counts on the owning side stay exact.
//!
//! ## Job Lifecycle
//! 1. Positions are submitted via `WorkerPool::submit()`
//! 2. The pool sends them to workers round-robin, at most `MAX_TASKS_IN_FLIGHT` per worker
//! 3. Positions that do not fit are parked in an owning-side backlog
//! 4. Workers run the processor, catching errors and panics
//! 5. Outcomes are collected by `WorkerPool::poll_completed()`, which also pumps the backlog
//!
//! Submission and polling never block.
//!
//! ## Example Usage
//! ```
//! use cgmath::Point3;
//! use voxel_mesh_engine::{JobError, JobProcessor, WorkerPool};
//!
//! struct Sum;
//!
//! impl JobProcessor for Sum {
//!     type Output = i32;
//!
//!     fn process(&self, position: Point3<i32>) -> Result<i32, JobError> {
//!         Ok(position.x + position.y + position.z)
//!     }
//! }
//!
//! let mut pool = WorkerPool::new(2, Sum).unwrap();
//! pool.submit(Point3::new(1, 2, 3));
//!
//! let mut outcomes = Vec::new();
//! while outcomes.is_empty() {
//!     outcomes = pool.poll_completed(usize::MAX);
//! }
//! assert_eq!(outcomes[0].result, Ok(6));
//! ```

pub mod task;

use std::any::Any;
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use cgmath::Point3;
use log::{debug, error, info, warn};

use crate::error::{EngineError, JobError};

pub use task::{JobOutcome, JobProcessor};

/// Maximum number of jobs that can be in flight per worker channel.
///
/// Two lets a worker pick up its next job without waiting for the owning thread
/// to poll, while keeping most pending work in the backlog where it can still be
/// reordered.
pub const MAX_TASKS_IN_FLIGHT: usize = 2;

/// A communication channel between the owning thread and one worker thread.
#[derive(Debug)]
struct TaskChannel<T> {
    task_sender: Sender<Point3<i32>>,
    result_receiver: Receiver<JobOutcome<T>>,
    num_tasks_in_flight: usize,
    worker: JoinHandle<()>,
}

/// Manages a pool of worker threads and coordinates job execution.
///
/// The `WorkerPool` is responsible for:
/// - Creating and joining worker threads
/// - Distributing jobs across available workers
/// - Parking jobs when all workers are busy
/// - Collecting outcomes on the owning thread
pub struct WorkerPool<P: JobProcessor> {
    channels: Vec<TaskChannel<P::Output>>,
    queued_tasks: VecDeque<Point3<i32>>,
    current_channel: usize,
    current_result_channel: usize,
}

/// Turns a panic payload into something worth logging.
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Runs one job, converting a panic into a [`JobError`].
fn run_isolated<P: JobProcessor>(processor: &P, position: Point3<i32>) -> Result<P::Output, JobError> {
    match panic::catch_unwind(AssertUnwindSafe(|| processor.process(position))) {
        Ok(result) => result,
        Err(payload) => Err(JobError::Panicked {
            position,
            message: panic_message(payload.as_ref()),
        }),
    }
}

impl<P: JobProcessor> WorkerPool<P> {
    /// Creates a new `WorkerPool` with the specified number of worker threads.
    ///
    /// # Arguments
    /// * `num_workers` - Number of worker threads to create; zero is raised to one
    /// * `processor` - The work to run for every submitted position, shared by all workers
    ///
    /// # Errors
    /// Returns [`EngineError::WorkerSpawn`] if the OS refuses to create a thread.
    /// Workers spawned before the failure are shut down and joined.
    pub fn new(num_workers: usize, processor: P) -> Result<Self, EngineError> {
        let num_workers = num_workers.max(1);
        let processor = Arc::new(processor);
        let mut pool = WorkerPool {
            channels: Vec::with_capacity(num_workers),
            queued_tasks: VecDeque::new(),
            current_channel: 0,
            current_result_channel: 0,
        };

        for index in 0..num_workers {
            let (task_tx, task_rx) = channel::<Point3<i32>>();
            let (result_tx, result_rx) = channel::<JobOutcome<P::Output>>();
            let processor = Arc::clone(&processor);

            let task_closure = move || {
                while let Ok(position) = task_rx.recv() {
                    let result = run_isolated(processor.as_ref(), position);
                    if let Err(err) = &result {
                        error!("Worker {index}: job for chunk {position:?} failed: {err}");
                    }
                    let outcome = JobOutcome {
                        worker: index,
                        position,
                        result,
                    };
                    if result_tx.send(outcome).is_err() {
                        break;
                    }
                }
            };

            let worker = thread::Builder::new()
                .name(format!("mesh-worker-{index}"))
                .spawn(task_closure)
                .map_err(|source| EngineError::WorkerSpawn { index, source })?;

            pool.channels.push(TaskChannel {
                task_sender: task_tx,
                result_receiver: result_rx,
                num_tasks_in_flight: 0,
                worker,
            });
        }

        info!("Started worker pool with {num_workers} workers");
        Ok(pool)
    }

    /// Number of worker threads.
    pub fn worker_count(&self) -> usize {
        self.channels.len()
    }

    /// Jobs sent to a worker whose outcome has not been collected yet.
    pub fn in_flight(&self) -> usize {
        self.channels.iter().map(|c| c.num_tasks_in_flight).sum()
    }

    /// Jobs parked on the owning side, waiting for a worker.
    pub fn queued(&self) -> usize {
        self.queued_tasks.len()
    }

    /// Jobs submitted whose outcome has not been collected: backlog plus in flight.
    pub fn outstanding(&self) -> usize {
        self.queued() + self.in_flight()
    }

    /// Attempts to send a job to a specific worker channel.
    ///
    /// # Returns
    /// - `Ok(())` if the job was handed to the worker
    /// - `Err(position)` if the worker has disconnected
    fn try_send_task(&mut self, position: Point3<i32>, channel_idx: usize) -> Result<(), Point3<i32>> {
        match self.channels[channel_idx].task_sender.send(position) {
            Ok(()) => {
                self.channels[channel_idx].num_tasks_in_flight += 1;
                Ok(())
            }
            Err(err) => Err(err.0),
        }
    }

    /// Finds a worker channel below its in-flight allowance, round-robin from
    /// the channel after the last one used.
    fn find_available_channel(&self) -> Option<usize> {
        let len = self.channels.len();
        (0..len)
            .map(|offset| (self.current_channel + offset) % len)
            .find(|&idx| self.channels[idx].num_tasks_in_flight < MAX_TASKS_IN_FLIGHT)
    }

    /// Submits a job for a chunk position. Never blocks.
    ///
    /// # Returns
    /// - `true` if the job was sent to a worker immediately
    /// - `false` if it was parked in the backlog because every worker is busy
    pub fn submit(&mut self, position: Point3<i32>) -> bool {
        if !self.queued_tasks.is_empty() {
            self.queued_tasks.push_back(position);
            return false;
        }

        match self.find_available_channel() {
            Some(channel_idx) => match self.try_send_task(position, channel_idx) {
                Ok(()) => {
                    self.current_channel = (channel_idx + 1) % self.channels.len();
                    true
                }
                Err(position) => {
                    warn!("Worker {channel_idx} disconnected; parking job for chunk {position:?}");
                    self.queued_tasks.push_back(position);
                    false
                }
            },
            None => {
                self.queued_tasks.push_back(position);
                false
            }
        }
    }

    /// Moves parked jobs to workers while any worker has room, oldest first.
    pub fn process_queued_tasks(&mut self) {
        while let Some(channel_idx) = self.find_available_channel() {
            let Some(position) = self.queued_tasks.pop_front() else {
                break;
            };
            match self.try_send_task(position, channel_idx) {
                Ok(()) => {
                    self.current_channel = (channel_idx + 1) % self.channels.len();
                }
                Err(position) => {
                    error!("Worker {channel_idx} disconnected; {} jobs stay parked", self.queued_tasks.len() + 1);
                    self.queued_tasks.push_front(position);
                    break;
                }
            }
        }
    }

    /// Collects up to `limit` finished jobs without blocking, then refills idle
    /// workers from the backlog.
    ///
    /// Channels are drained starting after the one the previous call stopped
    /// at, so a small `limit` does not starve any worker.
    pub fn poll_completed(&mut self, limit: usize) -> Vec<JobOutcome<P::Output>> {
        let mut outcomes = Vec::new();
        let len = self.channels.len();

        for offset in 0..len {
            if outcomes.len() >= limit {
                break;
            }
            let idx = (self.current_result_channel + offset) % len;
            let channel = &mut self.channels[idx];
            while outcomes.len() < limit {
                match channel.result_receiver.try_recv() {
                    Ok(outcome) => {
                        channel.num_tasks_in_flight = channel.num_tasks_in_flight.saturating_sub(1);
                        outcomes.push(outcome);
                    }
                    Err(_) => break,
                }
            }
        }
        if len > 0 {
            self.current_result_channel = (self.current_result_channel + 1) % len;
        }

        if !outcomes.is_empty() {
            debug!("Collected {} job outcomes", outcomes.len());
        }
        self.process_queued_tasks();
        outcomes
    }
}

impl<P: JobProcessor> Drop for WorkerPool<P> {
    /// Closes every job channel, then waits for the workers to finish their
    /// current job and exit. Parked jobs are discarded.
    fn drop(&mut self) {
        let mut workers = Vec::with_capacity(self.channels.len());
        for channel in self.channels.drain(..) {
            let TaskChannel {
                task_sender,
                result_receiver,
                worker,
                ..
            } = channel;
            drop(task_sender);
            drop(result_receiver);
            workers.push(worker);
        }
        for worker in workers {
            if worker.join().is_err() {
                error!("A worker thread panicked outside job isolation");
            }
        }
        debug!("Worker pool shut down, {} parked jobs dropped", self.queued_tasks.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Barrier};
    use std::time::{Duration, Instant};

    struct Echo;

    impl JobProcessor for Echo {
        type Output = Point3<i32>;

        fn process(&self, position: Point3<i32>) -> Result<Point3<i32>, JobError> {
            if position.x < 0 {
                return Err(JobError::ChunkNotLoaded(position));
            }
            if position.x == 99 {
                panic!("boom at {position:?}");
            }
            Ok(position)
        }
    }

    fn drain<P: JobProcessor>(pool: &mut WorkerPool<P>, expected: usize) -> Vec<JobOutcome<P::Output>> {
        let deadline = Instant::now() + Duration::from_secs(10);
        let mut outcomes = Vec::new();
        while outcomes.len() < expected {
            assert!(Instant::now() < deadline, "timed out waiting for outcomes");
            outcomes.extend(pool.poll_completed(usize::MAX));
            thread::sleep(Duration::from_millis(1));
        }
        outcomes
    }

    #[test]
    fn every_submission_produces_one_outcome() {
        let mut pool = WorkerPool::new(3, Echo).unwrap();
        for x in 0..20 {
            pool.submit(Point3::new(x, 0, 0));
        }
        assert_eq!(pool.outstanding(), 20);

        let outcomes = drain(&mut pool, 20);
        let mut seen: Vec<i32> = outcomes
            .iter()
            .map(|o| o.result.as_ref().unwrap().x)
            .collect();
        seen.sort();
        assert_eq!(seen, (0..20).collect::<Vec<_>>());
        assert_eq!(pool.outstanding(), 0);
    }

    #[test]
    fn errors_and_panics_are_isolated() {
        let mut pool = WorkerPool::new(1, Echo).unwrap();
        pool.submit(Point3::new(-1, 0, 0));
        pool.submit(Point3::new(99, 0, 0));
        pool.submit(Point3::new(5, 0, 0));

        let outcomes = drain(&mut pool, 3);
        let find = |x| outcomes.iter().find(|o| o.position.x == x).unwrap();

        assert_eq!(find(-1).result, Err(JobError::ChunkNotLoaded(Point3::new(-1, 0, 0))));
        match &find(99).result {
            Err(JobError::Panicked { message, .. }) => assert!(message.contains("boom")),
            other => panic!("expected a panic outcome, got {other:?}"),
        }
        assert_eq!(find(5).result, Ok(Point3::new(5, 0, 0)));
    }

    struct Gate {
        barrier: Arc<Barrier>,
        started: Arc<AtomicUsize>,
    }

    impl JobProcessor for Gate {
        type Output = ();

        fn process(&self, _position: Point3<i32>) -> Result<(), JobError> {
            self.started.fetch_add(1, Ordering::SeqCst);
            self.barrier.wait();
            Ok(())
        }
    }

    #[test]
    fn submissions_beyond_worker_capacity_are_parked() {
        // One worker, blocked on its first job until the test releases it.
        let barrier = Arc::new(Barrier::new(2));
        let started = Arc::new(AtomicUsize::new(0));
        let mut pool = WorkerPool::new(
            1,
            Gate {
                barrier: Arc::clone(&barrier),
                started: Arc::clone(&started),
            },
        )
        .unwrap();

        let total = MAX_TASKS_IN_FLIGHT + 3;
        let sent: usize = (0..total)
            .map(|x| pool.submit(Point3::new(x as i32, 0, 0)) as usize)
            .sum();
        assert_eq!(sent, MAX_TASKS_IN_FLIGHT);
        assert_eq!(pool.in_flight(), MAX_TASKS_IN_FLIGHT);
        assert_eq!(pool.queued(), 3);
        assert_eq!(pool.outstanding(), total);

        let mut collected = 0;
        let deadline = Instant::now() + Duration::from_secs(10);
        while collected < total {
            assert!(Instant::now() < deadline, "timed out");
            if started.load(Ordering::SeqCst) > collected {
                barrier.wait();
                // The outcome is sent right after the barrier releases.
                while pool.poll_completed(1).is_empty() {
                    thread::yield_now();
                }
                collected += 1;
                assert_eq!(pool.outstanding(), total - collected);
            } else {
                thread::yield_now();
            }
        }
    }

    #[test]
    fn zero_workers_means_one() {
        let pool = WorkerPool::new(0, Echo).unwrap();
        assert_eq!(pool.worker_count(), 1);
    }
}
