use std::time::Instant;

use crate::error::SimResult;
use crate::scheduler::thread_pool::ThreadPool;
use crate::simulation::bodies::BodyRegistry;
use crate::simulation::params::Parameters;
use crate::simulation::particles::ParticleStore;
use crate::simulation::states::{Body, NVec2, Particle};
use crate::simulation::stepper::PhysicsStepper;

/// Helper to build a manual system of `n` particles around `bodies` bodies
fn make_system(n: usize, bodies: usize) -> SimResult<(BodyRegistry, ParticleStore)> {
    let mut registry = BodyRegistry::new();
    for k in 0..bodies {
        let k_f = k as f64;
        registry.push(Body::new(
            NVec2::new((k_f * 1.3).sin() * 50.0, (k_f * 0.7).cos() * 50.0),
            NVec2::zeros(),
            1000.0,
            8.0,
        ))?;
    }

    let mut store = ParticleStore::new(n);
    for i in 0..n {
        let i_f = i as f64;
        // deterministic positions, no rand needed
        let x = NVec2::new((i_f * 0.37).sin() * 400.0, (i_f * 0.13).cos() * 400.0);
        let v = NVec2::new((i_f * 0.07).sin() * 10.0, (i_f * 0.11).cos() * 10.0);
        store.emit(&Particle {
            lifetime: f64::MAX,
            ..Particle::new(x, v)
        });
    }

    Ok((registry, store))
}

/// Helper for parameters that never cull
fn make_params() -> Parameters {
    let mut params = Parameters::new(NVec2::zeros(), f64::MAX.sqrt());
    params.trails = false;
    params
}

/// Benchmark `PhysicsStepper::step` over particle counts and worker counts
/// Paste output directly into excel to graph
pub fn bench_step_curve() -> SimResult<()> {
    let ns = [5_000, 10_000, 20_000, 40_000];
    let workers = [1, 2, 4, 8];
    let bodies = 8;
    let steps = 20;
    let dt = 1.0 / 60.0;

    println!("N,workers,step_ms");

    for n in ns {
        for w in workers {
            let (mut registry, mut store) = make_system(n, bodies)?;
            let params = make_params();
            let mut stepper = PhysicsStepper::new(ThreadPool::new(w)?);

            // Warm up
            stepper.step(&mut registry, &mut store, &params, dt)?;

            let t0 = Instant::now();
            for _ in 0..steps {
                stepper.step(&mut registry, &mut store, &params, dt)?;
            }
            let ms = t0.elapsed().as_secs_f64() * 1000.0 / steps as f64;

            println!("{},{},{:.6}", n, w, ms);
        }
    }

    Ok(())
}
