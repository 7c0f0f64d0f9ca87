//! The simulation as a whole: bodies, particles, parameters and the stepper
//!
//! This is the surface a host (window loop, headless driver, tests) talks to:
//! loading scenarios, adding bodies, tuning parameters, stepping, and reading
//! frame-coherent views for rendering. Every view reflects a fully finished
//! step; `step` never returns while range tasks are still running.

use log::{debug, info, warn};

use crate::error::{SimError, SimResult};
use crate::scheduler::thread_pool::ThreadPool;
use crate::simulation::bodies::BodyRegistry;
use crate::simulation::engine::Engine;
use crate::simulation::params::Parameters;
use crate::simulation::particles::ParticleStore;
use crate::simulation::scenario::{Scenario, ScenarioGenerator, ScenarioKind};
use crate::simulation::states::{Body, NVec2, Particle, Rgba, Trail};
use crate::simulation::stepper::{PhysicsStepper, StepReport};

/// Mass and radius given to bodies placed with [`Simulation::add_body`]
pub const ADDED_BODY_MASS: f64 = 1000.0;
pub const ADDED_BODY_RADIUS: f64 = 8.0;

/// Simulated seconds between preset switches in demo mode
pub const DEMO_DURATION: f64 = 8.0;

/// What the renderer needs from one active particle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleView {
    pub x: NVec2,
    pub size: f32,
    pub color: Rgba,
    pub fade: f32, // 1 at birth, 0 at expiry
}

/// What the renderer needs from one body
#[derive(Debug, Clone, Copy)]
pub struct BodyView<'a> {
    pub x: NVec2,
    pub radius: f64,
    pub color: Rgba,
    pub trail: &'a Trail,
}

pub struct Simulation {
    bodies: BodyRegistry,
    particles: ParticleStore,
    params: Parameters,
    stepper: PhysicsStepper,
    generator: ScenarioGenerator,
    paused: bool,
    current: Option<ScenarioKind>,
    demo: bool,
    demo_timer: f64,
}

impl Simulation {
    /// Build an empty simulation sized by `engine` with default physics
    pub fn new(engine: &Engine, generator: ScenarioGenerator) -> SimResult<Self> {
        let mut params = Parameters::new(engine.center(), engine.culling_radius);
        params.trails = engine.trails;
        Self::with_params(engine, params, generator)
    }

    /// Build an empty simulation sized by `engine` using `params`
    pub fn with_params(engine: &Engine, params: Parameters, generator: ScenarioGenerator) -> SimResult<Self> {
        params.validate()?;
        let pool = match engine.workers {
            Some(n) => ThreadPool::new(n)?,
            None => ThreadPool::with_available_parallelism()?,
        };

        info!(
            "simulation ready: {} particle slots, {} workers, culling radius {}",
            engine.capacity,
            pool.num_threads(),
            engine.culling_radius
        );

        Ok(Self {
            bodies: BodyRegistry::new(),
            particles: ParticleStore::new(engine.capacity),
            params,
            stepper: PhysicsStepper::new(pool),
            generator,
            paused: false,
            current: None,
            demo: false,
            demo_timer: 0.0,
        })
    }

    /// Replace all bodies and particles; returns how many particles fit
    ///
    /// Fails without touching the current state if any mass is not positive or
    /// any body or particle state is not finite.
    pub fn load_scenario(&mut self, bodies: Vec<Body>, particles: &[Particle]) -> SimResult<usize> {
        for b in &bodies {
            BodyRegistry::check(b)?;
        }
        if let Some(p) = particles.iter().find(|p| !p.is_valid_template()) {
            if !(p.m > 0.0) {
                return Err(SimError::NonPositiveMass(p.m));
            }
            let value = p.x.iter().chain(p.v.iter()).copied().find(|c| !c.is_finite()).unwrap_or(p.m);
            return Err(SimError::InvalidParameter { name: "particle state", value });
        }

        self.bodies.clear();
        self.particles.clear();
        for body in bodies {
            self.bodies.push(body)?;
        }

        let emitted = particles.iter().filter(|p| self.particles.emit(p)).count();
        if emitted < particles.len() {
            warn!(
                "particle store full: kept {} of {} particles",
                emitted,
                particles.len()
            );
        }
        info!(
            "loaded scenario with {} particles and {} bodies",
            emitted,
            self.bodies.len()
        );
        Ok(emitted)
    }

    /// Generate and load a preset
    pub fn load_preset(&mut self, kind: ScenarioKind) -> SimResult<usize> {
        let Scenario { bodies, particles } = self.generator.generate(kind, self.params.center, self.params.g);
        let emitted = self.load_scenario(bodies, &particles)?;
        self.current = Some(kind);
        self.demo_timer = 0.0;
        Ok(emitted)
    }

    /// Reload the current preset, if one is loaded
    pub fn reset(&mut self) -> SimResult<()> {
        if let Some(kind) = self.current {
            self.load_preset(kind)?;
        }
        Ok(())
    }

    pub fn current_preset(&self) -> Option<ScenarioKind> {
        self.current
    }

    /// Place a default body at rest at `position`
    pub fn add_body(&mut self, position: NVec2) -> SimResult<()> {
        let color = self.generator.pastel();
        let body = Body::new(position, NVec2::zeros(), ADDED_BODY_MASS, ADDED_BODY_RADIUS).with_color(color);
        self.add_body_with(body)?;
        info!("added massive object at ({}, {})", position.x, position.y);
        Ok(())
    }

    pub fn add_body_with(&mut self, body: Body) -> SimResult<()> {
        self.bodies.push(body)
    }

    /// Emit one particle; `false` when the store is full or the template is invalid
    pub fn emit(&mut self, template: &Particle) -> bool {
        self.particles.emit(template)
    }

    /// Emit up to `count` particles; returns how many were placed
    pub fn emit_burst(&mut self, count: usize, template: &Particle) -> usize {
        self.particles.emit_burst(count, template)
    }

    /// Returns the factor actually applied after clamping
    pub fn set_time_dilation(&mut self, factor: f64) -> f64 {
        self.params.set_time_dilation(factor)
    }

    pub fn set_gravitational_constant(&mut self, g: f64) -> SimResult<()> {
        self.params.set_gravitational_constant(g)
    }

    /// Turn body trails on or off; turning them off clears existing trails
    pub fn set_trails(&mut self, enabled: bool) {
        self.params.trails = enabled;
        if !enabled {
            self.bodies.clear_trails();
        }
    }

    /// Cycle presets every [`DEMO_DURATION`] simulated seconds
    pub fn set_demo_mode(&mut self, enabled: bool) {
        self.demo = enabled;
        self.demo_timer = 0.0;
    }

    /// Returns `false` if already paused
    pub fn pause(&mut self) -> bool {
        let was_running = !self.paused;
        self.paused = true;
        was_running
    }

    /// Returns `false` if not paused
    pub fn resume(&mut self) -> bool {
        let was_paused = self.paused;
        self.paused = false;
        was_paused
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Advance by `dt` wall seconds scaled by the time dilation
    ///
    /// While paused this does nothing and reports `advanced == false`.
    pub fn step(&mut self, dt: f64) -> SimResult<StepReport> {
        if !dt.is_finite() || dt < 0.0 {
            return Err(SimError::InvalidTimeStep(dt));
        }
        if self.paused {
            return Ok(StepReport::default());
        }

        if self.demo {
            self.demo_timer += dt;
            if self.demo_timer >= DEMO_DURATION {
                let next = self.current.map_or(ScenarioKind::Spiral, ScenarioKind::next);
                debug!("demo mode: switching to {}", next.name());
                self.load_preset(next)?;
            }
        }

        let scaled = dt * self.params.time_dilation();
        self.stepper.step(&mut self.bodies, &mut self.particles, &self.params, scaled)
    }

    // read-only views ======================================================================

    pub fn params(&self) -> &Parameters {
        &self.params
    }

    pub fn bodies(&self) -> &BodyRegistry {
        &self.bodies
    }

    pub fn particles(&self) -> &ParticleStore {
        &self.particles
    }

    pub fn active_particle_count(&self) -> usize {
        self.particles.active_count()
    }

    pub fn num_workers(&self) -> usize {
        self.stepper.num_workers()
    }

    pub fn frame(&self) -> u64 {
        self.stepper.frame()
    }

    pub fn particle_views(&self) -> impl Iterator<Item = ParticleView> + '_ {
        self.particles.iter_active().map(|p| ParticleView {
            x: p.x,
            size: p.size,
            color: p.color,
            fade: p.fade(),
        })
    }

    pub fn body_views(&self) -> impl Iterator<Item = BodyView<'_>> + '_ {
        self.bodies.iter().map(|b| BodyView {
            x: b.x,
            radius: b.radius,
            color: b.color,
            trail: &b.trail,
        })
    }
}
