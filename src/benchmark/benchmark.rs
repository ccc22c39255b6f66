use std::time::Instant;

use crate::configuration::config::{BroadPhaseKind, QueryMode, Subdivision};
use crate::error::SimError;
use crate::simulation::broad_phase::{build_broad_phase, BroadPhase};
use crate::simulation::engine::Engine;
use crate::simulation::grid::UniformGrid;
use crate::simulation::params::Parameters;
use crate::simulation::states::{Body, NVec2, System};
use crate::simulation::stepper::Stepper;

/// Deterministic scatter of `n` small bodies over the arena, no rng needed
pub fn scattered_bodies(n: usize, params: &Parameters) -> Result<Vec<Body>, SimError> {
    let mut bodies = Vec::with_capacity(n);
    for i in 0..n {
        let i_f = i as f64;
        let radius = 5 + (i % 5) as u32;
        let r = f64::from(radius);

        // keep the whole circle inside the arena
        let x = NVec2::new(
            r + ((i_f * 0.37).sin() * 0.5 + 0.5) * (params.width - 2.0 * r),
            r + ((i_f * 0.13).cos() * 0.5 + 0.5) * (params.height - 2.0 * r),
        );
        let v = NVec2::new((i_f * 0.07).sin() * 150.0, (i_f * 0.11).cos() * 150.0);

        bodies.push(Body::new(x, v, radius, 1)?);
    }
    Ok(bodies)
}

/// The broad phases worth comparing, with a label for printing
pub fn engines() -> Vec<(&'static str, Engine)> {
    let base = Engine::default();
    vec![
        ("brute", Engine { broad_phase: BroadPhaseKind::BruteForce, ..base.clone() }),
        ("grid", Engine { broad_phase: BroadPhaseKind::Grid, ..base.clone() }),
        (
            "qt-owner",
            Engine {
                broad_phase: BroadPhaseKind::Quadtree,
                query: QueryMode::FromOwner,
                ..base.clone()
            },
        ),
        (
            "qt-root",
            Engine {
                broad_phase: BroadPhaseKind::Quadtree,
                query: QueryMode::RootDown,
                ..base.clone()
            },
        ),
        (
            "qt-lazy",
            Engine {
                broad_phase: BroadPhaseKind::Quadtree,
                subdivision: Subdivision::Lazy,
                query: QueryMode::RootDown,
                ..base
            },
        ),
    ]
}

/// Time `steps` fixed steps per broad phase for growing body counts
pub fn bench_broad_phase() -> Result<(), SimError> {
    // Different system sizes to test
    let ns = [100, 200, 400, 800, 1600, 3200];
    let steps = 10;
    let params = Parameters::default();

    for n in ns {
        let bodies = scattered_bodies(n, &params)?;

        // how crowded the grid is for this n, cell-pair count is a proxy for narrow-phase work
        let mut grid = UniformGrid::new(params.width, params.height, Engine::default().grid_size)?;
        grid.rebuild(&bodies);
        let mut cell_pairs = 0usize;
        grid.for_each_cell_pair(|_, _| cell_pairs += 1);

        let mut line = format!("N = {n:5}, cell pairs = {cell_pairs:7}");
        for (label, engine) in engines() {
            let index = build_broad_phase(&engine, &params)?;
            let mut stepper = Stepper::new(System::new(bodies.clone()), params.clone(), index);

            // Warm up
            stepper.step();

            let t0 = Instant::now();
            let mut pairs = 0;
            for _ in 0..steps {
                pairs += stepper.step().candidate_pairs;
            }
            let per_step = t0.elapsed().as_secs_f64() / steps as f64;

            line.push_str(&format!(", {label} = {per_step:8.6} s ({} pairs)", pairs / steps));
        }
        println!("{line}");
    }

    Ok(())
}
