//! Per-frame physics stepping
//!
//! One call to [`PhysicsStepper::step`] runs two phases in order:
//! 1. bodies pull on each other (serial, few bodies)
//! 2. the particle buffer is cut into one contiguous range per worker; each
//!    range moves into its own task, is updated against a snapshot of the
//!    bodies and comes back through the task's handle
//!
//! The call returns only after every range task has finished and the buffer has
//! been put back together, so callers never see a half-updated buffer.

use std::ops::Range;
use std::sync::Arc;

use log::{error, trace};

use crate::error::{SimError, SimResult};
use crate::scheduler::thread_pool::ThreadPool;
use crate::simulation::bodies::BodyRegistry;
use crate::simulation::forces::{NewtonianGravity, PointMass};
use crate::simulation::integrator::{euler_step, step_bodies};
use crate::simulation::params::Parameters;
use crate::simulation::particles::ParticleStore;
use crate::simulation::states::{NVec2, Particle};

/// Split `[0, len)` into `workers` contiguous ranges
///
/// Every range but the last has `len / workers` elements; the last one takes
/// the remainder. `workers == 0` is treated as 1.
pub fn partition_ranges(len: usize, workers: usize) -> Vec<Range<usize>> {
    let workers = workers.max(1);
    let batch = len / workers;

    (0..workers)
        .map(|i| {
            let start = i * batch;
            let end = if i == workers - 1 { len } else { (i + 1) * batch };
            start..end
        })
        .collect()
}

/// Counters gathered from the particle ranges of one step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RangeStats {
    pub updated: usize, // integrated this step
    pub expired: usize, // reached their lifetime
    pub culled: usize, // left the culling circle
}

impl RangeStats {
    fn merge(&mut self, other: &RangeStats) {
        self.updated += other.updated;
        self.expired += other.expired;
        self.culled += other.culled;
    }
}

/// Outcome of one call to `step`
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StepReport {
    pub advanced: bool, // false when paused
    pub dt: f64, // dilated time step actually applied
    pub particles: RangeStats,
}

/// Owns the worker pool and per-frame scratch space
pub struct PhysicsStepper {
    pool: ThreadPool,
    body_accels: Vec<NVec2>,
    frame: u64,
}

impl PhysicsStepper {
    pub fn new(pool: ThreadPool) -> Self {
        Self {
            pool,
            body_accels: Vec::new(),
            frame: 0,
        }
    }

    pub fn num_workers(&self) -> usize {
        self.pool.num_threads()
    }

    /// Frames fully advanced so far
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Advance bodies and particles by `dt` (already dilated)
    ///
    /// A failed range task fails the whole frame; the frame counter is not advanced.
    pub fn step(
        &mut self,
        bodies: &mut BodyRegistry,
        particles: &mut ParticleStore,
        params: &Parameters,
        dt: f64,
    ) -> SimResult<StepReport> {
        if !dt.is_finite() || dt < 0.0 {
            return Err(SimError::InvalidTimeStep(dt));
        }
        let gravity = NewtonianGravity::from_params(params);

        // Phase 1: body-body
        step_bodies(bodies, &gravity, dt, params.trails, &mut self.body_accels);

        // Phase 2: particles against the updated bodies
        let sources: Arc<[PointMass]> = bodies.iter().map(PointMass::from).collect();
        let stats = self.step_particles(sources, particles, params, gravity, dt)?;

        self.frame += 1;
        trace!(
            "frame {}: {} updated, {} expired, {} culled",
            self.frame, stats.updated, stats.expired, stats.culled
        );

        Ok(StepReport {
            advanced: true,
            dt,
            particles: stats,
        })
    }

    fn step_particles(
        &self,
        sources: Arc<[PointMass]>,
        particles: &mut ParticleStore,
        params: &Parameters,
        gravity: NewtonianGravity,
        dt: f64,
    ) -> SimResult<RangeStats> {
        let mut slots = particles.take_slots();
        let ranges = partition_ranges(slots.len(), self.pool.num_threads());
        let chunks = split_into_chunks(&mut slots, &ranges);

        let center = params.center;
        let cull_r2 = params.culling_radius * params.culling_radius;

        let outcomes = self.pool.parallel_map(chunks, move |mut chunk: Vec<Particle>| {
            let stats = update_range(&mut chunk, &sources, &gravity, center, cull_r2, dt);
            (chunk, stats)
        });
        // barrier: nothing else may still be running on the pool
        let barrier = self.pool.wait_for_all();

        // reassemble in order; a failed range comes back as free slots
        let mut total = RangeStats::default();
        let mut failure = barrier.err();
        for (range, outcome) in ranges.iter().zip(outcomes) {
            match outcome {
                Ok((chunk, stats)) => {
                    slots.extend(chunk);
                    total.merge(&stats);
                }
                Err(e) => {
                    slots.resize(slots.len() + range.len(), Particle::default());
                    failure.get_or_insert(e);
                }
            }
        }
        particles.restore_slots(slots);

        if let Some(e) = failure {
            error!("particle phase failed on frame {}: {}", self.frame + 1, e);
            return Err(SimError::Scheduler(e));
        }
        Ok(total)
    }
}

/// Update one range of particles against a read-only set of sources
///
/// A particle whose position is no longer finite counts as culled.
pub fn update_range(
    particles: &mut [Particle],
    sources: &[PointMass],
    gravity: &NewtonianGravity,
    center: NVec2,
    cull_r2: f64,
    dt: f64,
) -> RangeStats {
    let mut stats = RangeStats::default();

    for p in particles.iter_mut() {
        if !p.active {
            continue;
        }

        p.age += dt;
        if p.age >= p.lifetime {
            p.active = false;
            stats.expired += 1;
            continue;
        }

        // already outside: drop without integrating
        if !inside(&p.x, center, cull_r2) {
            p.active = false;
            stats.culled += 1;
            continue;
        }

        let a = gravity.acceleration_from(&p.x, p.m, sources);
        euler_step(&mut p.x, &mut p.v, &a, dt);
        stats.updated += 1;

        if !inside(&p.x, center, cull_r2) {
            p.active = false;
            stats.culled += 1;
        }
    }

    stats
}

// false for NaN as well as for points beyond the radius
#[inline]
fn inside(x: &NVec2, center: NVec2, cull_r2: f64) -> bool {
    (x - center).norm_squared() <= cull_r2
}

/// Move `buf` out into one owned chunk per range, leaving `buf` empty with
/// its allocation intact
///
/// `ranges` must be contiguous and in order starting at 0, as produced by
/// [`partition_ranges`].
fn split_into_chunks<T>(buf: &mut Vec<T>, ranges: &[Range<usize>]) -> Vec<Vec<T>> {
    let mut chunks: Vec<Vec<T>> = ranges.iter().rev().map(|r| buf.split_off(r.start)).collect();
    chunks.reverse();
    chunks
}
