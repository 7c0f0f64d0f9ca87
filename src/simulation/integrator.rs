//! Explicit Euler integration
//!
//! `v += a dt` then `x += v dt`. Not symplectic, long runs drift in energy;
//! kept for speed and because the particle phase shares the same update.

use crate::simulation::bodies::BodyRegistry;
use crate::simulation::forces::NewtonianGravity;
use crate::simulation::states::NVec2;

/// One Euler update of a position/velocity pair
#[inline]
pub fn euler_step(x: &mut NVec2, v: &mut NVec2, a: &NVec2, dt: f64) {
    *v += a * dt;
    *x += *v * dt;
}

/// Advance every body by `dt` under mutual gravity (serial, O(B^2))
///
/// Accelerations come from the positions at the start of the step, then each
/// body is integrated and, when `record_trails` is set, its new position is
/// appended to its trail. `scratch` is reused between frames.
pub fn step_bodies(
    bodies: &mut BodyRegistry,
    gravity: &NewtonianGravity,
    dt: f64,
    record_trails: bool,
    scratch: &mut Vec<NVec2>,
) {
    let n = bodies.len();
    if n == 0 { // no bodies, return
        return;
    }

    scratch.clear();
    scratch.resize(n, NVec2::zeros());
    gravity.accumulate_accels(bodies.as_slice(), scratch);

    for (b, a) in bodies.iter_mut().zip(scratch.iter()) {
        euler_step(&mut b.x, &mut b.v, a, dt);
        if record_trails {
            b.trail.push(b.x);
        }
    }
}
