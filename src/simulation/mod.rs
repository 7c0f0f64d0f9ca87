pub mod states;
pub mod params;
pub mod engine;
pub mod forces;
pub mod integrator;
pub mod bodies;
pub mod particles;
pub mod stepper;
pub mod scenario;
pub mod world;
