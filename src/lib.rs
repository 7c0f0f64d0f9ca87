pub mod error;
pub mod scheduler;
pub mod simulation;
pub mod configuration;
pub mod diagnostics;
pub mod benchmark;

pub use error::{SchedulerError, SimError, SimResult};

pub use scheduler::thread_pool::{TaskHandle, ThreadPool};

pub use simulation::states::{Body, NVec2, Particle, Rgba, Trail, MAX_TRAIL_LENGTH};
pub use simulation::params::Parameters;
pub use simulation::engine::Engine;
pub use simulation::forces::{NewtonianGravity, PointMass};
pub use simulation::bodies::BodyRegistry;
pub use simulation::particles::ParticleStore;
pub use simulation::stepper::{partition_ranges, update_range, PhysicsStepper, RangeStats, StepReport};
pub use simulation::scenario::{Scenario, ScenarioGenerator, ScenarioKind};
pub use simulation::world::{BodyView, ParticleView, Simulation};

pub use configuration::config::{BodyConfig, EngineConfig, ParametersConfig, PresetConfig, ScenarioConfig};

pub use diagnostics::profiler::Profiler;

pub use benchmark::benchmark::bench_step_curve;
