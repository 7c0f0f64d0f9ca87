//! Physical parameters shared by every phase of a step
//!
//! `Parameters` holds:
//! - gravitational constant `g` and the distance floor `min_dist_sq`,
//! - time dilation (clamped to [`MIN_TIME_DILATION`, `MAX_TIME_DILATION`]),
//! - the culling circle (`center`, `culling_radius`),
//! - whether body trails are recorded

use log::debug;

use crate::error::{SimError, SimResult};
use crate::simulation::states::NVec2;

pub const MIN_TIME_DILATION: f64 = 0.1;
pub const MAX_TIME_DILATION: f64 = 10.0;

pub const DEFAULT_G: f64 = 100.0;
pub const DEFAULT_MIN_DIST_SQ: f64 = 10.0;

#[derive(Debug, Clone)]
pub struct Parameters {
    pub g: f64, // gravitational constant
    pub min_dist_sq: f64, // squared-distance floor
    time_dilation: f64, // dt multiplier, see `set_time_dilation`
    pub center: NVec2, // simulation center
    pub culling_radius: f64, // particles beyond this distance from `center` are dropped
    pub trails: bool, // record body trails
}

impl Parameters {
    pub fn new(center: NVec2, culling_radius: f64) -> Self {
        Self {
            g: DEFAULT_G,
            min_dist_sq: DEFAULT_MIN_DIST_SQ,
            time_dilation: 1.0,
            center,
            culling_radius,
            trails: true,
        }
    }

    pub fn time_dilation(&self) -> f64 {
        self.time_dilation
    }

    /// Set time dilation, clamped into the safe range; returns the value applied
    pub fn set_time_dilation(&mut self, factor: f64) -> f64 {
        let clamped = if factor.is_nan() {
            1.0
        } else {
            factor.clamp(MIN_TIME_DILATION, MAX_TIME_DILATION)
        };
        if clamped != factor {
            debug!("time dilation {} clamped to {}", factor, clamped);
        }
        self.time_dilation = clamped;
        clamped
    }

    /// Rejects negative or non-finite values; 0 turns gravity off
    pub fn set_gravitational_constant(&mut self, g: f64) -> SimResult<()> {
        if !(g >= 0.0 && g.is_finite()) {
            return Err(SimError::InvalidParameter { name: "G", value: g });
        }
        self.g = g;
        Ok(())
    }

    /// Check the invariants a step relies on
    pub fn validate(&self) -> SimResult<()> {
        if !(self.g >= 0.0 && self.g.is_finite()) {
            return Err(SimError::InvalidParameter { name: "G", value: self.g });
        }
        if !(self.min_dist_sq > 0.0) {
            return Err(SimError::InvalidParameter { name: "min_dist_sq", value: self.min_dist_sq });
        }
        if !(self.culling_radius > 0.0) {
            return Err(SimError::InvalidParameter { name: "culling_radius", value: self.culling_radius });
        }
        Ok(())
    }
}
