use qtsim::{FrameInput, Scenario, ScenarioConfig};
use qtsim::bench_broad_phase;
use qtsim::simulation::boundary::out_of_bounds;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(about = "2D circle collision sandbox with grid and quadtree broad phases")]
struct Args {
    /// Scenario file, looked up under `scenarios/` unless the path exists as given
    #[arg(short, default_value = "default.yaml")]
    file_name: String,

    /// Run without a window
    #[arg(long)]
    headless: bool,

    /// Fixed steps to run in headless mode
    #[arg(long, default_value_t = 1000)]
    ticks: u64,

    /// Spawn requests issued before a headless run
    #[arg(long, default_value_t = 1)]
    batches: u32,

    /// Time every broad phase and exit
    #[arg(long)]
    bench: bool,
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

// load here to keep main clean
fn load_scenario_from_yaml(file_name: &str) -> Result<ScenarioConfig> {
    let given = PathBuf::from(file_name);
    let config_path = if given.exists() {
        given
    } else {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file_name)
    };

    let file = File::open(&config_path).with_context(|| format!("opening {}", config_path.display()))?;
    let reader = BufReader::new(file);
    let scenario_cfg = ScenarioConfig::from_reader(reader)
        .with_context(|| format!("parsing {}", config_path.display()))?;

    Ok(scenario_cfg)
}

fn run_headless(mut scenario: Scenario, ticks: u64, batches: u32) -> Result<()> {
    for _ in 0..batches {
        scenario.frame(0.0, FrameInput { spawn: true, ..Default::default() })?;
    }

    let dt = scenario.stepper.params().dt;
    let mut steps: u64 = 0;
    while steps < ticks {
        steps += scenario.frame(dt, FrameInput::default())? as u64;
    }

    let p = scenario.stepper.params();
    let escaped = scenario
        .stepper
        .bodies()
        .iter()
        .filter(|b| out_of_bounds(b, p.width, p.height).any())
        .count();
    let system = scenario.stepper.system();

    info!(
        small = scenario.small_count(),
        big = scenario.big_count(),
        ticks = scenario.stepper.ticks(),
        t = system.t,
        escaped,
        momentum = ?system.total_momentum(),
        kinetic_energy = system.kinetic_energy(),
        last_tick = ?scenario.stepper.last_tick(),
        "headless run finished"
    );
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.bench {
        init_logging();
        bench_broad_phase()?;
        return Ok(());
    }

    let scenario_cfg = load_scenario_from_yaml(&args.file_name)?;
    let scenario = Scenario::build_scenario(scenario_cfg).context("building scenario")?;

    if args.headless {
        init_logging();
        return run_headless(scenario, args.ticks, args.batches);
    }
    run_viewer(scenario, &args)
}

#[cfg(feature = "viewer")]
fn run_viewer(scenario: Scenario, _args: &Args) -> Result<()> {
    // Bevy's LogPlugin installs the tracing subscriber for the viewer
    qtsim::run_2d(scenario);
    Ok(())
}

#[cfg(not(feature = "viewer"))]
fn run_viewer(scenario: Scenario, args: &Args) -> Result<()> {
    init_logging();
    tracing::warn!("built without the `viewer` feature, running headless");
    run_headless(scenario, args.ticks, args.batches)
}
