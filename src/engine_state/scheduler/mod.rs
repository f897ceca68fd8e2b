//! # Dirty-Chunk Scheduler
//!
//! Decides which chunks get meshed, when, and what happens to the results.
//!
//! ## Workflow
//!
//! 1. `mark_dirty` moves a `Clean` chunk to `QueuedDirty` and queues it by
//!    distance from the viewpoint. Any other state makes it a no-op.
//! 2. Each `tick` first dispatches up to `dispatch_per_tick` of the nearest
//!    queued chunks, stopping early once the job sink has
//!    `max_outstanding_jobs` outstanding. Dispatched chunks are `InFlight`.
//! 3. It then applies up to `apply_per_tick` finished jobs. A mesh for a chunk
//!    that still exists goes to the render adapter and the chunk is `Clean`
//!    again. Results for removed chunks are discarded.
//!
//! A failed job also returns the chunk to `Clean`, without a mesh. It is not
//! retried until something dirties it again.
//!
//! The scheduler never touches threads itself: jobs go through a
//! [`MeshJobSink`], which the worker pool implements and tests can fake.

pub mod dirty_queue;
pub mod state;

use std::collections::HashMap;

use cgmath::Point3;
use log::{debug, warn};

use crate::config::SchedulerConfig;
use crate::engine_state::rendering::tasks::ChunkMeshGenerationResult;
use crate::engine_state::rendering::RenderAdapter;
use crate::engine_state::task_management::{JobOutcome, JobProcessor, WorkerPool};
use crate::engine_state::voxels::chunk::coords;
use crate::engine_state::voxels::world::World;

pub use dirty_queue::DirtyQueue;
pub use state::{face_neighbors, BoundaryFlags, ChunkMeshState, ChunkRecord};

/// Where the scheduler sends meshing jobs and collects their outcomes.
pub trait MeshJobSink {
    /// Hands a chunk to be meshed. Must not block.
    fn submit(&mut self, position: Point3<i32>);

    /// Jobs submitted whose outcome has not been collected.
    fn outstanding(&self) -> usize;

    /// Collects up to `limit` finished jobs. Must not block.
    fn poll_completed(&mut self, limit: usize) -> Vec<JobOutcome<ChunkMeshGenerationResult>>;
}

impl<P> MeshJobSink for WorkerPool<P>
where
    P: JobProcessor<Output = ChunkMeshGenerationResult>,
{
    fn submit(&mut self, position: Point3<i32>) {
        WorkerPool::submit(self, position);
    }

    fn outstanding(&self) -> usize {
        WorkerPool::outstanding(self)
    }

    fn poll_completed(&mut self, limit: usize) -> Vec<JobOutcome<ChunkMeshGenerationResult>> {
        WorkerPool::poll_completed(self, limit)
    }
}

/// Cumulative scheduler counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    /// Jobs handed to the sink
    pub dispatched: u64,
    /// Meshes handed to the render adapter
    pub applied: u64,
    /// Jobs that reported an error or panicked
    pub failed: u64,
    /// Results dropped because their chunk had been removed
    pub discarded: u64,
    /// Queued chunks dropped at dispatch because they no longer existed
    pub dropped: u64,
    /// Neighbors re-dirtied after a job filled a chunk's terrain
    pub neighbor_refreshes: u64,
}

/// What a single tick did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Jobs dispatched this tick
    pub dispatched: usize,
    /// Meshes applied this tick
    pub applied: usize,
    /// Failed jobs observed this tick
    pub failed: usize,
    /// Results discarded this tick
    pub discarded: usize,
    /// Chunks still waiting in the dirty queue after the tick
    pub queued: usize,
    /// Jobs outstanding in the sink after the tick
    pub outstanding: usize,
}

impl TickReport {
    /// Whether nothing is queued or outstanding.
    pub fn is_idle(&self) -> bool {
        self.queued == 0 && self.outstanding == 0
    }
}

/// The dirty-chunk scheduler. Owned and driven by a single thread.
#[derive(Debug)]
pub struct MeshScheduler {
    config: SchedulerConfig,
    records: HashMap<Point3<i32>, ChunkRecord>,
    dirty: DirtyQueue,
    viewpoint: Point3<f32>,
    viewpoint_chunk: Option<Point3<i32>>,
    stats: SchedulerStats,
}

impl MeshScheduler {
    /// Creates a scheduler with the given budgets and a viewpoint at the origin.
    pub fn new(config: SchedulerConfig) -> Self {
        MeshScheduler {
            config,
            records: HashMap::new(),
            dirty: DirtyQueue::new(),
            viewpoint: Point3::new(0.0, 0.0, 0.0),
            viewpoint_chunk: None,
            stats: SchedulerStats::default(),
        }
    }

    /// The budgets this scheduler runs with.
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Cumulative counters.
    pub fn stats(&self) -> SchedulerStats {
        self.stats
    }

    /// The meshing state of a chunk. Chunks never seen are `Clean`.
    pub fn state(&self, coord: Point3<i32>) -> ChunkMeshState {
        self.records
            .get(&coord)
            .map(|record| record.state)
            .unwrap_or_default()
    }

    /// Whether a mesh has ever been applied for a chunk.
    pub fn is_meshed(&self, coord: Point3<i32>) -> bool {
        self.records.get(&coord).is_some_and(|record| record.meshed)
    }

    /// Number of chunks waiting in the dirty queue.
    pub fn queued(&self) -> usize {
        self.dirty.len()
    }

    /// Number of chunks with a job dispatched and not yet applied.
    pub fn in_flight(&self) -> usize {
        self.records
            .values()
            .filter(|record| record.state == ChunkMeshState::InFlight)
            .count()
    }

    /// Queues a chunk for remeshing.
    ///
    /// # Returns
    /// `true` if the chunk moved from `Clean` to `QueuedDirty`; `false` if it was
    /// already queued or in flight, in which case nothing changes.
    pub fn mark_dirty(&mut self, coord: Point3<i32>) -> bool {
        let record = self.records.entry(coord).or_default();
        if record.state != ChunkMeshState::Clean {
            return false;
        }
        record.state = ChunkMeshState::QueuedDirty;
        self.dirty.push_toward(coord, self.viewpoint);
        true
    }

    /// Forgets a chunk that was removed from the world.
    ///
    /// A queued chunk leaves the queue. A chunk with a job in flight keeps its
    /// record, flagged stale, until the result arrives and is discarded; that way
    /// a chunk re-added at the same position cannot get a second job meanwhile.
    pub fn forget(&mut self, coord: Point3<i32>) {
        self.dirty.remove(coord);
        match self.records.get_mut(&coord) {
            Some(record) if record.state == ChunkMeshState::InFlight => {
                record.stale = true;
                record.meshed = false;
            }
            Some(_) => {
                self.records.remove(&coord);
            }
            None => {}
        }
    }

    /// Records the viewpoint for this tick, re-prioritizing the queue when it
    /// has moved into a different chunk.
    pub fn update_viewpoint(&mut self, viewpoint: Point3<f32>) {
        self.viewpoint = viewpoint;
        let cell = coords::chunk_containing(viewpoint);
        if self.viewpoint_chunk != Some(cell) {
            self.viewpoint_chunk = Some(cell);
            self.dirty.reprioritize(viewpoint);
            debug!("Viewpoint entered chunk {cell:?}; re-prioritized {} queued chunks", self.dirty.len());
        }
    }

    /// Submits up to `dispatch_per_tick` queued chunks, nearest first, while the
    /// sink has fewer than `max_outstanding_jobs` outstanding.
    ///
    /// Queued chunks that are no longer in the world are dropped without using
    /// the budget.
    pub fn dispatch(&mut self, world: &World, jobs: &mut impl MeshJobSink) -> usize {
        let mut dispatched = 0;
        while dispatched < self.config.dispatch_per_tick
            && jobs.outstanding() < self.config.max_outstanding_jobs
        {
            let Some(coord) = self.dirty.pop() else {
                break;
            };
            if !world.contains(coord) {
                self.records.remove(&coord);
                self.stats.dropped += 1;
                continue;
            }
            jobs.submit(coord);
            self.records.entry(coord).or_default().state = ChunkMeshState::InFlight;
            dispatched += 1;
        }
        self.stats.dispatched += dispatched as u64;
        dispatched
    }

    /// Applies up to `apply_per_tick` finished jobs.
    pub fn apply(
        &mut self,
        world: &World,
        jobs: &mut impl MeshJobSink,
        adapter: &mut dyn RenderAdapter,
        report: &mut TickReport,
    ) {
        for outcome in jobs.poll_completed(self.config.apply_per_tick) {
            let position = outcome.position;
            let stale = self.records.get(&position).is_some_and(|record| record.stale);

            if stale || !world.contains(position) {
                self.discard(world, position);
                report.discarded += 1;
                if let Err(err) = outcome.result {
                    debug!("Discarded failed job for removed chunk {position:?}: {err}");
                }
                continue;
            }

            let record = self.records.entry(position).or_default();
            record.state = ChunkMeshState::Clean;
            let redirty = std::mem::take(&mut record.redirty);

            match outcome.result {
                Ok(result) => {
                    record.meshed = true;
                    adapter.apply_mesh(position, coords::chunk_origin(position), result.mesh);
                    report.applied += 1;
                    self.stats.applied += 1;

                    if redirty && self.mark_dirty(position) {
                        self.stats.neighbor_refreshes += 1;
                    }
                    if result.generated && self.config.remesh_neighbors_on_generate {
                        self.refresh_neighbors(position);
                    }
                }
                Err(err) => {
                    warn!("Chunk {position:?} left without a new mesh: {err}");
                    report.failed += 1;
                    self.stats.failed += 1;
                }
            }
        }
    }

    /// Drops the record of a chunk whose result must not be applied. If a chunk
    /// exists at that position again, it is queued afresh.
    fn discard(&mut self, world: &World, position: Point3<i32>) {
        self.records.remove(&position);
        self.stats.discarded += 1;
        if world.contains(position) {
            self.mark_dirty(position);
        }
    }

    /// Re-dirties face neighbors so their halos see newly filled terrain.
    ///
    /// Meshed clean neighbors are queued now. A neighbor whose job is in flight
    /// may have copied its halo before the fill, so it is queued again once its
    /// result is applied.
    fn refresh_neighbors(&mut self, position: Point3<i32>) {
        for neighbor in face_neighbors(position) {
            let Some(record) = self.records.get_mut(&neighbor) else {
                continue;
            };
            match (record.state, record.meshed, record.stale) {
                (ChunkMeshState::InFlight, _, false) => record.redirty = true,
                (ChunkMeshState::Clean, true, _) => {
                    if self.mark_dirty(neighbor) {
                        self.stats.neighbor_refreshes += 1;
                    }
                }
                _ => {}
            }
        }
    }

    /// Runs one scheduling tick: read the viewpoint, dispatch, then apply.
    ///
    /// # Arguments
    /// * `world` - The chunk store, checked for chunk existence
    /// * `jobs` - Where jobs are submitted and outcomes collected
    /// * `viewpoint` - The reference point for this tick
    /// * `adapter` - Receives every applied mesh
    pub fn tick(
        &mut self,
        world: &World,
        jobs: &mut impl MeshJobSink,
        viewpoint: Point3<f32>,
        adapter: &mut dyn RenderAdapter,
    ) -> TickReport {
        self.update_viewpoint(viewpoint);

        let mut report = TickReport {
            dispatched: self.dispatch(world, jobs),
            ..TickReport::default()
        };
        self.apply(world, jobs, adapter, &mut report);

        report.queued = self.dirty.len();
        report.outstanding = jobs.outstanding();
        if report.dispatched > 0 || report.applied > 0 || report.failed > 0 {
            debug!("{report:?}");
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::rendering::meshing::ChunkMeshRegistry;
    use crate::engine_state::rendering::MeshData;
    use crate::error::JobError;
    use std::collections::VecDeque;
    use std::time::Duration;

    /// Runs nothing by itself: the test decides when each job finishes.
    #[derive(Default)]
    struct ManualJobs {
        submitted: VecDeque<Point3<i32>>,
        finished: VecDeque<JobOutcome<ChunkMeshGenerationResult>>,
    }

    impl ManualJobs {
        fn complete_next(&mut self, generated: bool) -> Point3<i32> {
            let position = self.submitted.pop_front().unwrap();
            self.finished.push_back(JobOutcome {
                worker: 0,
                position,
                result: Ok(ChunkMeshGenerationResult {
                    mesh: MeshData::new(),
                    generated,
                    mesh_time: Duration::ZERO,
                }),
            });
            position
        }

        fn fail_next(&mut self) -> Point3<i32> {
            let position = self.submitted.pop_front().unwrap();
            self.finished.push_back(JobOutcome {
                worker: 0,
                position,
                result: Err(JobError::Panicked {
                    position,
                    message: "test".to_string(),
                }),
            });
            position
        }
    }

    impl MeshJobSink for ManualJobs {
        fn submit(&mut self, position: Point3<i32>) {
            self.submitted.push_back(position);
        }

        fn outstanding(&self) -> usize {
            self.submitted.len() + self.finished.len()
        }

        fn poll_completed(&mut self, limit: usize) -> Vec<JobOutcome<ChunkMeshGenerationResult>> {
            let n = limit.min(self.finished.len());
            self.finished.drain(..n).collect()
        }
    }

    fn config(dispatch: usize, apply: usize, cap: usize) -> SchedulerConfig {
        SchedulerConfig {
            dispatch_per_tick: dispatch,
            apply_per_tick: apply,
            max_outstanding_jobs: cap,
            remesh_neighbors_on_generate: true,
        }
    }

    fn world_with(positions: &[Point3<i32>]) -> World {
        let world = World::new();
        for &p in positions {
            world.add_chunk_at(p);
        }
        world
    }

    fn origin() -> Point3<f32> {
        Point3::new(0.0, 0.0, 0.0)
    }

    #[test]
    fn chunk_walks_through_every_state() {
        let p = Point3::new(0, 0, 0);
        let world = world_with(&[p]);
        let mut jobs = ManualJobs::default();
        let mut registry = ChunkMeshRegistry::new();
        let mut scheduler = MeshScheduler::new(config(4, 4, 8));

        assert_eq!(scheduler.state(p), ChunkMeshState::Clean);
        assert!(scheduler.mark_dirty(p));
        assert_eq!(scheduler.state(p), ChunkMeshState::QueuedDirty);

        let report = scheduler.tick(&world, &mut jobs, origin(), &mut registry);
        assert_eq!(report.dispatched, 1);
        assert_eq!(scheduler.state(p), ChunkMeshState::InFlight);

        jobs.complete_next(false);
        let report = scheduler.tick(&world, &mut jobs, origin(), &mut registry);
        assert_eq!(report.applied, 1);
        assert!(report.is_idle());
        assert_eq!(scheduler.state(p), ChunkMeshState::Clean);
        assert!(scheduler.is_meshed(p));
        assert!(registry.get(p).is_some());
    }

    #[test]
    fn dirtying_twice_queues_once() {
        let p = Point3::new(1, 1, 1);
        let world = world_with(&[p]);
        let mut jobs = ManualJobs::default();
        let mut scheduler = MeshScheduler::new(config(4, 4, 8));

        assert!(scheduler.mark_dirty(p));
        assert!(!scheduler.mark_dirty(p));
        assert_eq!(scheduler.queued(), 1);

        scheduler.tick(&world, &mut jobs, origin(), &mut ChunkMeshRegistry::new());
        assert_eq!(jobs.submitted.len(), 1);

        // In flight: still a no-op.
        assert!(!scheduler.mark_dirty(p));
        assert_eq!(scheduler.queued(), 0);
    }

    #[test]
    fn nearest_chunks_dispatch_first() {
        let positions = [Point3::new(5, 0, 0), Point3::new(1, 0, 0), Point3::new(9, 0, 0)];
        let world = world_with(&positions);
        let mut jobs = ManualJobs::default();
        let mut scheduler = MeshScheduler::new(config(1, 4, 8));
        for p in positions {
            scheduler.mark_dirty(p);
        }

        let mut registry = ChunkMeshRegistry::new();
        for _ in 0..3 {
            scheduler.tick(&world, &mut jobs, origin(), &mut registry);
        }
        let order: Vec<i32> = jobs.submitted.iter().map(|p| p.x).collect();
        assert_eq!(order, vec![1, 5, 9]);
    }

    #[test]
    fn dispatch_waits_for_outstanding_jobs_to_drop_below_the_cap() {
        let positions: Vec<_> = (0..5).map(|x| Point3::new(x, 0, 0)).collect();
        let world = world_with(&positions);
        let mut jobs = ManualJobs::default();
        let mut registry = ChunkMeshRegistry::new();
        let mut scheduler = MeshScheduler::new(config(10, 10, 2));
        for &p in &positions {
            scheduler.mark_dirty(p);
        }

        let report = scheduler.tick(&world, &mut jobs, origin(), &mut registry);
        assert_eq!(report.dispatched, 2);
        assert_eq!(report.queued, 3);

        // Nothing finished: no further dispatch.
        let report = scheduler.tick(&world, &mut jobs, origin(), &mut registry);
        assert_eq!(report.dispatched, 0);

        // One finishes; it is applied this tick, after dispatch, so the slot
        // frees up for the tick after.
        jobs.complete_next(false);
        let report = scheduler.tick(&world, &mut jobs, origin(), &mut registry);
        assert_eq!(report.dispatched, 0);
        assert_eq!(report.applied, 1);

        let report = scheduler.tick(&world, &mut jobs, origin(), &mut registry);
        assert_eq!(report.dispatched, 1);
        assert_eq!(jobs.outstanding(), 2);
    }

    #[test]
    fn apply_budget_limits_results_per_tick() {
        let positions: Vec<_> = (0..4).map(|x| Point3::new(x, 0, 0)).collect();
        let world = world_with(&positions);
        let mut jobs = ManualJobs::default();
        let mut registry = ChunkMeshRegistry::new();
        let mut scheduler = MeshScheduler::new(config(10, 3, 10));
        for &p in &positions {
            scheduler.mark_dirty(p);
        }
        scheduler.tick(&world, &mut jobs, origin(), &mut registry);
        for _ in 0..4 {
            jobs.complete_next(false);
        }

        assert_eq!(scheduler.tick(&world, &mut jobs, origin(), &mut registry).applied, 3);
        assert_eq!(scheduler.tick(&world, &mut jobs, origin(), &mut registry).applied, 1);
        assert_eq!(registry.len(), 4);
    }

    #[test]
    fn failed_jobs_return_the_chunk_to_clean() {
        let p = Point3::new(0, 0, 0);
        let world = world_with(&[p]);
        let mut jobs = ManualJobs::default();
        let mut registry = ChunkMeshRegistry::new();
        let mut scheduler = MeshScheduler::new(config(4, 4, 8));

        scheduler.mark_dirty(p);
        scheduler.tick(&world, &mut jobs, origin(), &mut registry);
        jobs.fail_next();
        let report = scheduler.tick(&world, &mut jobs, origin(), &mut registry);

        assert_eq!(report.failed, 1);
        assert_eq!(scheduler.state(p), ChunkMeshState::Clean);
        assert!(!scheduler.is_meshed(p));
        assert!(registry.is_empty());
        // No retry until dirtied again, which now works.
        assert!(report.is_idle());
        assert!(scheduler.mark_dirty(p));
        assert_eq!(scheduler.stats().failed, 1);
    }

    #[test]
    fn results_for_removed_chunks_are_discarded() {
        let p = Point3::new(0, 0, 0);
        let world = world_with(&[p]);
        let mut jobs = ManualJobs::default();
        let mut registry = ChunkMeshRegistry::new();
        let mut scheduler = MeshScheduler::new(config(4, 4, 8));

        scheduler.mark_dirty(p);
        scheduler.tick(&world, &mut jobs, origin(), &mut registry);
        world.remove_chunk_at(p);
        scheduler.forget(p);

        jobs.complete_next(false);
        let report = scheduler.tick(&world, &mut jobs, origin(), &mut registry);
        assert_eq!(report.discarded, 1);
        assert_eq!(report.applied, 0);
        assert!(registry.is_empty());
    }

    #[test]
    fn chunk_re_added_while_in_flight_is_remeshed_once_the_stale_result_lands() {
        let p = Point3::new(0, 0, 0);
        let world = world_with(&[p]);
        let mut jobs = ManualJobs::default();
        let mut registry = ChunkMeshRegistry::new();
        let mut scheduler = MeshScheduler::new(config(4, 4, 8));

        scheduler.mark_dirty(p);
        scheduler.tick(&world, &mut jobs, origin(), &mut registry);
        world.remove_chunk_at(p);
        scheduler.forget(p);
        world.add_chunk_at(p);
        assert!(!scheduler.mark_dirty(p));

        jobs.complete_next(false);
        let report = scheduler.tick(&world, &mut jobs, origin(), &mut registry);
        assert_eq!(report.discarded, 1);
        assert_eq!(scheduler.state(p), ChunkMeshState::QueuedDirty);
    }

    #[test]
    fn missing_chunks_are_dropped_at_dispatch() {
        let world = world_with(&[Point3::new(1, 0, 0)]);
        let mut jobs = ManualJobs::default();
        let mut scheduler = MeshScheduler::new(config(1, 4, 8));
        scheduler.mark_dirty(Point3::new(0, 0, 0));
        scheduler.mark_dirty(Point3::new(1, 0, 0));

        let report = scheduler.tick(&world, &mut jobs, origin(), &mut ChunkMeshRegistry::new());
        // The missing chunk did not use the budget of one.
        assert_eq!(report.dispatched, 1);
        assert_eq!(jobs.submitted.front(), Some(&Point3::new(1, 0, 0)));
        assert_eq!(scheduler.stats().dropped, 1);
    }

    #[test]
    fn generated_chunks_refresh_meshed_neighbors() {
        let a = Point3::new(0, 0, 0);
        let b = Point3::new(1, 0, 0);
        let world = world_with(&[a, b]);
        let mut jobs = ManualJobs::default();
        let mut registry = ChunkMeshRegistry::new();
        let mut scheduler = MeshScheduler::new(config(1, 4, 8));

        // a meshes first, then b's job fills b's terrain.
        scheduler.mark_dirty(a);
        scheduler.mark_dirty(b);
        scheduler.tick(&world, &mut jobs, origin(), &mut registry);
        jobs.complete_next(true);
        scheduler.tick(&world, &mut jobs, origin(), &mut registry);
        assert!(scheduler.is_meshed(a));
        assert_eq!(scheduler.state(b), ChunkMeshState::InFlight);

        // b was in flight when a's fill landed, so it is queued again as well.
        jobs.complete_next(true);
        scheduler.tick(&world, &mut jobs, origin(), &mut registry);
        assert_eq!(scheduler.state(a), ChunkMeshState::QueuedDirty);
        assert_eq!(scheduler.state(b), ChunkMeshState::QueuedDirty);
        assert_eq!(scheduler.stats().neighbor_refreshes, 2);
    }

    #[test]
    fn failed_jobs_drop_a_pending_refresh() {
        let a = Point3::new(0, 0, 0);
        let b = Point3::new(0, 0, 1);
        let world = world_with(&[a, b]);
        let mut jobs = ManualJobs::default();
        let mut registry = ChunkMeshRegistry::new();
        let mut scheduler = MeshScheduler::new(config(2, 4, 8));

        scheduler.mark_dirty(a);
        scheduler.mark_dirty(b);
        scheduler.tick(&world, &mut jobs, origin(), &mut registry);
        let first = jobs.complete_next(true);
        scheduler.tick(&world, &mut jobs, origin(), &mut registry);

        let second = jobs.fail_next();
        assert_ne!(first, second);
        scheduler.tick(&world, &mut jobs, origin(), &mut registry);
        assert_eq!(scheduler.state(second), ChunkMeshState::Clean);
        assert!(scheduler.dirty.is_empty());
    }
}
