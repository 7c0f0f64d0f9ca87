//! Gravitational force law for the galaxy engine
//!
//! Plain inverse-square attraction with a squared-distance floor in place of
//! softening. Used both for body-body pairs and for the body pull on particles.

use crate::simulation::params::Parameters;
use crate::simulation::states::{Body, NVec2};

/// Position and mass of one attracting body, detached from its trail
///
/// The particle phase works on a shared snapshot of these.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointMass {
    pub x: NVec2,
    pub m: f64,
}

impl From<&Body> for PointMass {
    fn from(b: &Body) -> Self {
        Self { x: b.x, m: b.m }
    }
}

/// Newtonian gravity with a minimum squared separation
#[derive(Debug, Clone, Copy)]
pub struct NewtonianGravity {
    pub g: f64, // gravitational constant
    pub min_dist_sq: f64, // floor on |r|^2
}

impl NewtonianGravity {
    pub fn from_params(params: &Parameters) -> Self {
        Self {
            g: params.g,
            min_dist_sq: params.min_dist_sq,
        }
    }

    /// Force on a mass `m1` at `x1` due to a mass `m2` at `x2`
    ///
    /// Direction is `normalize(x2 - x1)`, magnitude `G m1 m2 / max(|r|^2, min_dist_sq)`.
    /// Coincident points exert no force.
    #[inline]
    pub fn force(&self, x1: &NVec2, m1: f64, x2: &NVec2, m2: f64) -> NVec2 {
        let r = x2 - x1;
        let r2 = r.dot(&r);
        if r2 == 0.0 {
            return NVec2::zeros();
        }

        let d2 = r2.max(self.min_dist_sq);
        let magnitude = self.g * m1 * m2 / d2;

        // r / |r| * magnitude
        r * (magnitude / r2.sqrt())
    }

    /// Net acceleration at `x` for a mass `m` pulled by every source
    #[inline]
    pub fn acceleration_from(&self, x: &NVec2, m: f64, sources: &[PointMass]) -> NVec2 {
        let mut f = NVec2::zeros();
        for s in sources {
            f += self.force(x, m, &s.x, s.m);
        }
        f / m
    }

    /// Fill `out[i]` with the acceleration of body `i` due to every other body
    ///
    /// All pairs read the same positions, so the result does not depend on body order.
    pub fn accumulate_accels(&self, bodies: &[Body], out: &mut [NVec2]) {
        for a in out.iter_mut() {
            *a = NVec2::zeros();
        }

        let n = bodies.len();
        for i in 0..n {
            let bi = &bodies[i];
            let mut f = NVec2::zeros();
            for (j, bj) in bodies.iter().enumerate() {
                if i == j {
                    continue;
                }
                f += self.force(&bi.x, bi.m, &bj.x, bj.m);
            }
            out[i] = f / bi.m;
        }
    }
}
