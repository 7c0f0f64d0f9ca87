use galsim::{bench_step_curve, Profiler, ScenarioConfig, ScenarioGenerator, Simulation};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

#[derive(Parser, Debug)]
struct Args {
    /// Scenario file under `scenarios/`
    #[arg(short, long, default_value = "spiral.yaml")]
    file_name: String,

    /// Override the number of frames to run
    #[arg(long)]
    frames: Option<u64>,

    /// Override the worker pool size
    #[arg(long)]
    workers: Option<usize>,

    /// Run the step benchmark instead of a scenario
    #[arg(long)]
    bench: bool,
}

// load here to keep main clean
fn load_scenario_from_yaml(file_name: &str) -> Result<ScenarioConfig> {
    let config_path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file_name);
    let file = File::open(&config_path)
        .with_context(|| format!("opening {}", config_path.display()))?;
    let reader = BufReader::new(file);
    let scenario_cfg = ScenarioConfig::from_reader(reader)
        .with_context(|| format!("parsing {}", config_path.display()))?;

    Ok(scenario_cfg)
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.bench {
        bench_step_curve()?;
        return Ok(());
    }

    let mut cfg = load_scenario_from_yaml(&args.file_name)?;
    if let Some(w) = args.workers {
        cfg.engine.workers = Some(w);
    }
    let frames = args.frames.unwrap_or(cfg.parameters.frames);
    let dt = cfg.parameters.dt;

    let engine = cfg.engine()?;
    let params = cfg.parameters(&engine)?;
    let generator = match cfg.scenario.seed {
        Some(seed) => ScenarioGenerator::seeded(seed),
        None => ScenarioGenerator::from_entropy(),
    };

    let mut sim = Simulation::with_params(&engine, params, generator)?;
    sim.load_preset(cfg.scenario.preset)?;
    for body in cfg.bodies()? {
        sim.add_body_with(body)?;
    }
    sim.set_demo_mode(cfg.scenario.demo);

    let mut profiler = Profiler::new();
    let log_every = 60;

    for frame in 0..frames {
        profiler.begin_frame();
        let report = profiler.measure("physics", || sim.step(dt))?;
        profiler.end_frame();

        if frame % log_every == 0 {
            info!(
                "frame {:5}: {} active particles, {} bodies, {} culled, {} expired",
                frame,
                sim.active_particle_count(),
                sim.bodies().len(),
                report.particles.culled,
                report.particles.expired
            );
        }
    }

    info!(
        "finished {} frames with {} active particles",
        sim.frame(),
        sim.active_particle_count()
    );
    profiler.report();

    Ok(())
}
