//! Numerical and physical parameters for the simulation
//!
//! `Parameters` holds the immutable runtime settings shared by the stepper,
//! the resolver and the spatial indices:
//! - arena extent and fixed step size,
//! - restitution and the rest thresholds,
//! - the constant force and linear drag fed to the integrator

use crate::configuration::config::{ArenaConfig, ParametersConfig};
use crate::simulation::states::NVec2;

#[derive(Debug, Clone)]
pub struct Parameters {
    pub width: f64,              // arena extent along x
    pub height: f64,             // arena extent along y
    pub dt: f64,                 // fixed step size
    pub elasticity: f64,         // restitution, 1 = perfectly elastic
    pub velocity_threshold: f64, // velocity components below this snap to 0
    pub drag: f64,               // linear drag coefficient
    pub force: NVec2,            // constant force on every body
    pub rest_speed: f64,         // near-rest relative speed
    pub rest_separation: f64,    // total near-rest push-apart distance
}

impl Parameters {
    pub fn from_config(arena: &ArenaConfig, p: &ParametersConfig) -> Self {
        Self {
            width: arena.width,
            height: arena.height,
            dt: p.timestep,
            elasticity: p.elasticity,
            velocity_threshold: p.velocity_threshold,
            drag: p.drag,
            force: NVec2::new(p.force[0], p.force[1]),
            rest_speed: p.rest_speed,
            rest_separation: p.rest_separation,
        }
    }
}

impl Default for Parameters {
    fn default() -> Self {
        Self::from_config(&ArenaConfig::default(), &ParametersConfig::default())
    }
}
