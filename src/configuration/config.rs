//! Configuration types for loading simulation runs from YAML.
//!
//! A thin, `serde`-deserializable description of a run:
//!
//! - [`EngineConfig`]     – worker pool size, particle capacity, viewport and culling
//! - [`ParametersConfig`] – physical constants and the fixed frame step
//! - [`PresetConfig`]     – which preset to generate, seed, extra bodies, demo mode
//! - [`ScenarioConfig`]   – top-level wrapper
//!
//! Every field has a default, so an empty document is a valid run.
//!
//! # YAML format
//!
//! ```yaml
//! engine:
//!   workers: 4              # omit for one worker per hardware thread
//!   capacity: 30000         # particle slots
//!   viewport: [1280, 720]   # simulation center is the middle of this
//!   culling_radius: 1920.0  # omit for 1.5x viewport width
//!   trails: true
//!
//! parameters:
//!   G: 100.0                # gravitational constant
//!   time_dilation: 1.0      # clamped to [0.1, 10]
//!   min_dist_sq: 10.0       # squared-distance floor
//!   dt: 0.016666667         # seconds per frame
//!   frames: 600             # frames to run headless
//!
//! scenario:
//!   preset: "spiral"        # "spiral", "binary" or "cluster"
//!   seed: 42                # omit for a random seed
//!   demo: false             # cycle presets every 8 s
//!   bodies:                 # added on top of the preset
//!     - x: [ 400.0, 360.0 ]
//!       v: [ 0.0, 0.0 ]
//!       m: 1000.0
//!       radius: 8.0
//! ```

use std::io::Read;

use serde::Deserialize;

use crate::error::{SimError, SimResult};
use crate::simulation::engine::{Engine, DEFAULT_CAPACITY, DEFAULT_VIEWPORT};
use crate::simulation::params::{Parameters, DEFAULT_G, DEFAULT_MIN_DIST_SQ};
use crate::simulation::scenario::ScenarioKind;
use crate::simulation::states::{Body, NVec2};

/// Engine sizing
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct EngineConfig {
    pub workers: Option<usize>, // worker threads, `None` = available parallelism
    pub capacity: usize, // fixed particle store size
    pub viewport: [f64; 2], // width, height
    pub culling_radius: Option<f64>, // `None` = 1.5x viewport width
    pub trails: bool, // record body trails
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            workers: None,
            capacity: DEFAULT_CAPACITY,
            viewport: DEFAULT_VIEWPORT,
            culling_radius: None,
            trails: true,
        }
    }
}

/// Physical constants and frame timing
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ParametersConfig {
    #[serde(rename = "G")]
    pub g: f64, // gravitational constant
    pub time_dilation: f64, // dt multiplier
    pub min_dist_sq: f64, // squared-distance floor preventing singular forces
    pub dt: f64, // seconds per frame
    pub frames: u64, // frames to run headless
}

impl Default for ParametersConfig {
    fn default() -> Self {
        Self {
            g: DEFAULT_G,
            time_dilation: 1.0,
            min_dist_sq: DEFAULT_MIN_DIST_SQ,
            dt: 1.0 / 60.0,
            frames: 600,
        }
    }
}

/// Initial state for one extra body
#[derive(Deserialize, Debug, Clone)]
pub struct BodyConfig {
    pub x: [f64; 2], // position
    #[serde(default)]
    pub v: [f64; 2], // velocity
    pub m: f64, // mass, must be positive
    #[serde(default = "default_body_radius")]
    pub radius: f64, // render radius
}

fn default_body_radius() -> f64 {
    8.0
}

/// Which initial conditions to generate
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct PresetConfig {
    pub preset: ScenarioKind,
    pub seed: Option<u64>,
    pub demo: bool,
    pub bodies: Vec<BodyConfig>,
}

/// Top-level run configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct ScenarioConfig {
    pub engine: EngineConfig,
    pub parameters: ParametersConfig,
    pub scenario: PresetConfig,
}

impl ScenarioConfig {
    pub fn from_yaml_str(s: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(s)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_reader(reader)
    }

    /// Runtime engine settings, validated
    pub fn engine(&self) -> SimResult<Engine> {
        let e = &self.engine;
        if e.capacity == 0 {
            return Err(SimError::InvalidParameter { name: "capacity", value: 0.0 });
        }
        if e.workers == Some(0) {
            return Err(SimError::InvalidParameter { name: "workers", value: 0.0 });
        }
        let culling_radius = e
            .culling_radius
            .unwrap_or_else(|| Engine::default_culling_radius(e.viewport));
        if !(culling_radius > 0.0) {
            return Err(SimError::InvalidParameter { name: "culling_radius", value: culling_radius });
        }

        Ok(Engine {
            workers: e.workers,
            capacity: e.capacity,
            viewport: e.viewport,
            culling_radius,
            trails: e.trails,
        })
    }

    /// Runtime parameters for `engine`, validated
    pub fn parameters(&self, engine: &Engine) -> SimResult<Parameters> {
        let p = &self.parameters;
        if !p.dt.is_finite() || p.dt < 0.0 {
            return Err(SimError::InvalidTimeStep(p.dt));
        }

        let mut params = Parameters::new(engine.center(), engine.culling_radius);
        params.set_gravitational_constant(p.g)?;
        params.min_dist_sq = p.min_dist_sq;
        params.set_time_dilation(p.time_dilation);
        params.trails = engine.trails;
        params.validate()?;
        Ok(params)
    }

    /// Extra bodies listed in the file
    pub fn bodies(&self) -> SimResult<Vec<Body>> {
        self.scenario
            .bodies
            .iter()
            .map(|bc| {
                if !(bc.m > 0.0) {
                    return Err(SimError::NonPositiveMass(bc.m));
                }
                Ok(Body::new(
                    NVec2::new(bc.x[0], bc.x[1]),
                    NVec2::new(bc.v[0], bc.v[1]),
                    bc.m,
                    bc.radius,
                ))
            })
            .collect()
    }
}
