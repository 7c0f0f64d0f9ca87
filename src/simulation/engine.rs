//! High-level runtime engine settings
//!
//! Sizes the worker pool and the particle store, and fixes the culling circle
//! used when building a `Simulation`

use crate::simulation::states::NVec2;

pub const DEFAULT_CAPACITY: usize = 30_000;
pub const DEFAULT_VIEWPORT: [f64; 2] = [1280.0, 720.0];

#[derive(Debug, Clone)]
pub struct Engine {
    pub workers: Option<usize>, // None = one per hardware thread
    pub capacity: usize, // particle slots, fixed for the run
    pub viewport: [f64; 2], // width, height in world units
    pub culling_radius: f64, // distance from center at which particles are dropped
    pub trails: bool, // record body trails
}

impl Engine {
    /// Center of the viewport
    pub fn center(&self) -> NVec2 {
        NVec2::new(self.viewport[0] * 0.5, self.viewport[1] * 0.5)
    }

    /// Default culling radius for a viewport, 1.5x its width
    pub fn default_culling_radius(viewport: [f64; 2]) -> f64 {
        viewport[0] * 1.5
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self {
            workers: None,
            capacity: DEFAULT_CAPACITY,
            viewport: DEFAULT_VIEWPORT,
            culling_radius: Self::default_culling_radius(DEFAULT_VIEWPORT),
            trails: true,
        }
    }
}
