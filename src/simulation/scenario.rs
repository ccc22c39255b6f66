//! Build fully-initialized simulation scenarios from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces the runtime bundle
//! `Scenario` containing:
//! - engine settings (`Engine`)
//! - the fixed-timestep `Stepper` owning the bodies, parameters and index
//! - the `Spawner` answering spawn requests
//! - presentation toggles (index overlay)
//!
//! With the `viewer` feature the scenario is inserted into Bevy as a
//! `Resource` and driven one frame at a time by the visualization systems.

use tracing::info;

use crate::configuration::config::{BodyConfig, ScenarioConfig};
use crate::error::SimError;
use crate::simulation::broad_phase::build_broad_phase;
use crate::simulation::engine::Engine;
use crate::simulation::params::Parameters;
use crate::simulation::spawn::Spawner;
use crate::simulation::states::{Body, BodyColor, BodyKind, NVec2, System};
use crate::simulation::stepper::Stepper;

/// Discrete, edge-triggered requests collected during one frame
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FrameInput {
    pub spawn: bool,
    pub toggle_pause: bool,
    pub toggle_overlay: bool,
}

/// Runtime bundle representing a fully-initialized scenario
#[cfg_attr(feature = "viewer", derive(bevy::prelude::Resource))]
pub struct Scenario {
    pub engine: Engine,
    pub stepper: Stepper,
    pub spawner: Spawner,
    pub show_overlay: bool,
}

impl Scenario {
    pub fn build_scenario(cfg: ScenarioConfig) -> Result<Self, SimError> {
        cfg.validate()?;

        // Parameters (runtime) from ArenaConfig + ParametersConfig
        let parameters = Parameters::from_config(&cfg.arena, &cfg.parameters);

        // Engine (runtime) from EngineConfig
        let engine = Engine::from(&cfg.engine);

        // Bodies: map `BodyConfig` -> runtime `Body` using nalgebra vectors
        let bodies = cfg
            .bodies
            .iter()
            .map(body_from_config)
            .collect::<Result<Vec<_>, _>>()?;

        let index = build_broad_phase(&engine, &parameters)?;

        info!(
            width = parameters.width,
            height = parameters.height,
            dt = parameters.dt,
            bodies = bodies.len(),
            broad_phase = index.name(),
            "scenario ready"
        );

        let spawner = Spawner::new(cfg.spawn, parameters.width, parameters.height);
        let stepper = Stepper::new(System::new(bodies), parameters, index);

        Ok(Self {
            engine,
            stepper,
            spawner,
            show_overlay: false,
        })
    }

    /// Handle one external frame: toggles first, then a spawn request
    /// (ignored while paused), then the fixed steps `frame_dt` pays for.
    ///
    /// Returns the number of steps taken.
    pub fn frame(&mut self, frame_dt: f64, input: FrameInput) -> Result<usize, SimError> {
        if input.toggle_pause {
            let paused = !self.stepper.is_paused();
            self.stepper.set_paused(paused);
            info!(paused, "pause toggled");
        }
        if input.toggle_overlay {
            self.show_overlay = !self.show_overlay;
        }
        if input.spawn && !self.stepper.is_paused() {
            self.spawn()?;
        }
        Ok(self.stepper.advance(frame_dt))
    }

    /// Answer one spawn request, returns how many bodies were added
    pub fn spawn(&mut self) -> Result<usize, SimError> {
        let batch = self.spawner.spawn_batch()?;
        let n = batch.len();
        self.stepper.extend_bodies(batch);
        Ok(n)
    }

    pub fn small_count(&self) -> usize {
        self.stepper.system().count(BodyKind::Small)
    }

    pub fn big_count(&self) -> usize {
        self.stepper.system().count(BodyKind::Big)
    }
}

fn body_from_config(bc: &BodyConfig) -> Result<Body, SimError> {
    let body = Body::new(NVec2::new(bc.x[0], bc.x[1]), NVec2::new(bc.v[0], bc.v[1]), bc.radius, bc.m)?;
    Ok(match bc.color {
        Some([r, g, b]) => body.with_color(BodyColor::rgb(r, g, b)),
        None => body,
    })
}
