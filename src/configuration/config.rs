//! Configuration types for loading simulation scenarios from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! scenario. A scenario consists of:
//!
//! - [`ArenaConfig`]      – size of the bounded arena (y grows downward)
//! - [`ParametersConfig`] – timestep, restitution and rest thresholds
//! - [`EngineConfig`]     – which broad phase to use and how to shape it
//! - [`SpawnConfig`]      – rules for bodies created by spawn requests
//! - [`BodyConfig`]       – optional explicit initial bodies
//! - [`ScenarioConfig`]   – top-level wrapper used to load a scenario from YAML
//!
//! # YAML format
//! Every field has a default, so any subset is valid:
//!
//! ```yaml
//! arena:
//!   width: 1280
//!   height: 720
//!
//! parameters:
//!   timestep: 0.016666668   # fixed step, seconds
//!   elasticity: 1.0         # restitution in [0, 1]
//!   velocity_threshold: 5.0 # |v| components below this snap to zero
//!   drag: 0.0               # linear drag coefficient, 0 = off
//!   force: [0.0, 0.0]       # constant force on every body
//!   rest_speed: 0.1         # relative speed under which touching bodies are pushed apart
//!   rest_separation: 1.0    # total push-apart distance, split evenly
//!
//! engine:
//!   broad_phase: quadtree   # or "grid" / "brute_force"
//!   grid_size: 60
//!   max_depth: 4
//!   subdivision: eager      # or "lazy"
//!   query: from_owner       # or "root_down"
//!
//! spawn:
//!   seed: 42
//!   batch_size: 25
//!   presses_per_big: 10
//!
//! bodies:
//!   - x: [ 100.0, 100.0 ]
//!     v: [  50.0,   0.0 ]
//!     m: 1
//!     radius: 10
//! ```
//!
//! The scenario builder maps this configuration into its runtime
//! representation ([`crate::simulation::params::Parameters`],
//! [`crate::simulation::engine::Engine`]).

use std::io::Read;

use serde::Deserialize;

use crate::error::SimError;

/// Deepest eager tree we are willing to pre-build (4^(d-1) leaves)
pub const MAX_EAGER_DEPTH: u32 = 10;

/// Largest uniform grid we are willing to allocate
pub const MAX_GRID_CELLS: usize = 1 << 20;

/// Cells needed to cover `width x height` with squares of side `cell_size`,
/// `None` when the count does not fit in memory-sized integers
pub fn grid_cell_count(width: f64, height: f64, cell_size: f64) -> Option<usize> {
    let cols = (width / cell_size).ceil();
    let rows = (height / cell_size).ceil();
    if !(cols.is_finite() && rows.is_finite()) || cols > usize::MAX as f64 || rows > usize::MAX as f64 {
        return None;
    }
    (cols as usize).checked_mul(rows as usize)
}

/// Which broad phase feeds the narrow phase
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BroadPhaseKind {
    #[serde(rename = "brute_force")] // every body against every other body
    BruteForce,

    #[serde(rename = "grid")] // fixed-size square cells
    Grid,

    #[serde(rename = "quadtree")] // adaptive square subdivision
    #[default]
    Quadtree,
}

/// How quadtree nodes come into existence
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Subdivision {
    #[serde(rename = "eager")] // whole tree built up front, clear() only empties lists
    #[default]
    Eager,

    #[serde(rename = "lazy")] // children created on first insert, clear() drops them
    Lazy,
}

/// Where a quadtree neighbour query starts
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryMode {
    /// Start at the body's owning node and only look downward. Cheap, but a
    /// straddling body stored in an ancestor is invisible from below.
    #[serde(rename = "from_owner")]
    #[default]
    FromOwner,

    /// Start at the root and visit every node overlapping the body.
    #[serde(rename = "root_down")]
    RootDown,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ArenaConfig {
    pub width: f64,  // arena extent along x
    pub height: f64, // arena extent along y
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
        }
    }
}

/// Global numerical and physical parameters for a scenario
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ParametersConfig {
    pub timestep: f64,           // fixed step size
    pub elasticity: f64,         // restitution shared by every collision
    pub velocity_threshold: f64, // rest snapping threshold per component
    pub drag: f64,               // linear drag, acceleration -= drag * v
    pub force: [f64; 2],         // constant force on every body
    pub rest_speed: f64,         // near-rest relative speed
    pub rest_separation: f64,    // near-rest push-apart distance
}

impl Default for ParametersConfig {
    fn default() -> Self {
        Self {
            timestep: 1.0 / 60.0,
            elasticity: 1.0,
            velocity_threshold: 5.0,
            drag: 0.0,
            force: [0.0, 0.0],
            rest_speed: 0.1,
            rest_separation: 1.0,
        }
    }
}

/// Broad phase selection and shape
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct EngineConfig {
    pub broad_phase: BroadPhaseKind,
    pub grid_size: f64,          // grid cell side
    pub max_depth: u32,          // quadtree depth cap, root is depth 1
    pub subdivision: Subdivision,
    pub query: QueryMode,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            broad_phase: BroadPhaseKind::default(),
            grid_size: 60.0,
            max_depth: 4,
            subdivision: Subdivision::default(),
            query: QueryMode::default(),
        }
    }
}

/// Rules for bodies created by spawn requests
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct SpawnConfig {
    pub seed: u64,              // deterministic seed to make runs reproducible
    pub batch_size: usize,      // small bodies per spawn request
    pub presses_per_big: u32,   // every n-th request also adds a big body
    pub velocity_min: f64,
    pub velocity_max: f64,
    pub small_radius_min: u32,  // inclusive
    pub small_radius_max: u32,  // exclusive
    pub small_mass: u32,
    pub big_radius: u32,
    pub big_mass: u32,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            batch_size: 25,
            presses_per_big: 10,
            velocity_min: 5.0,
            velocity_max: 300.0,
            small_radius_min: 5,
            small_radius_max: 10,
            small_mass: 1,
            big_radius: 25,
            big_mass: 10,
        }
    }
}

/// Configuration for a single body's initial state
#[derive(Deserialize, Debug, Clone)]
pub struct BodyConfig {
    pub x: [f64; 2],              // initial position
    #[serde(default)]
    pub v: [f64; 2],              // initial velocity
    pub m: u32,                   // mass
    pub radius: u32,              // radius
    #[serde(default)]
    pub color: Option<[u8; 3]>,   // display only
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct ScenarioConfig {
    pub arena: ArenaConfig,
    pub parameters: ParametersConfig,
    pub engine: EngineConfig,
    pub spawn: SpawnConfig,
    pub bodies: Vec<BodyConfig>,
}

impl ScenarioConfig {
    /// Parse a scenario from YAML text
    pub fn from_yaml_str(text: &str) -> Result<Self, SimError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Parse a scenario from any reader (file, buffer)
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, SimError> {
        Ok(serde_yaml::from_reader(reader)?)
    }

    /// Reject configurations the simulation cannot run with.
    ///
    /// Called by the scenario builder so that a bad file fails at startup,
    /// before any body is simulated.
    pub fn validate(&self) -> Result<(), SimError> {
        let a = &self.arena;
        if !(a.width.is_finite() && a.width > 0.0 && a.height.is_finite() && a.height > 0.0) {
            return Err(SimError::config(format!(
                "arena must have positive size, got {}x{}",
                a.width, a.height
            )));
        }

        let p = &self.parameters;
        if !(p.timestep.is_finite() && p.timestep > 0.0) {
            return Err(SimError::config(format!("timestep must be positive, got {}", p.timestep)));
        }
        if !(0.0..=1.0).contains(&p.elasticity) {
            return Err(SimError::config(format!("elasticity must be in [0, 1], got {}", p.elasticity)));
        }
        for (name, value) in [
            ("velocity_threshold", p.velocity_threshold),
            ("drag", p.drag),
            ("rest_speed", p.rest_speed),
            ("rest_separation", p.rest_separation),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(SimError::config(format!("{name} must be non-negative, got {value}")));
            }
        }
        if !p.force.iter().all(|f| f.is_finite()) {
            return Err(SimError::config("force must be finite"));
        }

        let e = &self.engine;
        if !(e.grid_size.is_finite() && e.grid_size > 0.0) {
            return Err(SimError::config(format!("grid_size must be positive, got {}", e.grid_size)));
        }
        match grid_cell_count(a.width, a.height, e.grid_size) {
            Some(cells) if cells <= MAX_GRID_CELLS => {}
            _ => {
                return Err(SimError::config(format!(
                    "grid_size {} needs more than {MAX_GRID_CELLS} cells for a {}x{} arena",
                    e.grid_size, a.width, a.height
                )))
            }
        }
        if e.max_depth < 1 {
            return Err(SimError::config("max_depth must be at least 1"));
        }
        if e.subdivision == Subdivision::Eager && e.max_depth > MAX_EAGER_DEPTH {
            return Err(SimError::config(format!(
                "max_depth {} is too deep for eager subdivision (limit {MAX_EAGER_DEPTH})",
                e.max_depth
            )));
        }

        let s = &self.spawn;
        if !(s.velocity_min.is_finite() && s.velocity_max.is_finite())
            || s.velocity_min < 0.0
            || s.velocity_min > s.velocity_max
        {
            return Err(SimError::config(format!(
                "spawn velocity range {}..{} is invalid",
                s.velocity_min, s.velocity_max
            )));
        }
        if s.small_radius_min == 0 || s.small_radius_min >= s.small_radius_max {
            return Err(SimError::config(format!(
                "small radius range {}..{} is invalid",
                s.small_radius_min, s.small_radius_max
            )));
        }
        if s.small_mass == 0 || s.big_mass == 0 || s.big_radius == 0 {
            return Err(SimError::config("spawned bodies need positive radius and mass"));
        }
        if 2.0 * f64::from(s.big_radius) > a.width.min(a.height) {
            return Err(SimError::config(format!(
                "big_radius {} does not fit in a {}x{} arena",
                s.big_radius, a.width, a.height
            )));
        }
        if 2.0 * f64::from(s.small_radius_max - 1) > a.width.min(a.height) {
            return Err(SimError::config(format!(
                "small_radius_max {} does not fit in a {}x{} arena",
                s.small_radius_max, a.width, a.height
            )));
        }
        if s.presses_per_big == 0 {
            return Err(SimError::config("presses_per_big must be at least 1"));
        }

        for (i, b) in self.bodies.iter().enumerate() {
            if b.m == 0 || b.radius == 0 {
                return Err(SimError::InvalidBody { radius: b.radius, mass: b.m });
            }
            if !b.x.iter().chain(b.v.iter()).all(|c| c.is_finite()) {
                return Err(SimError::config(format!("body {i} has a non-finite position or velocity")));
            }
            // a body starting outside can never be reverted back in
            let r = f64::from(b.radius);
            let [x, y] = b.x;
            if x - r < 0.0 || x + r > a.width || y - r < 0.0 || y + r > a.height {
                return Err(SimError::config(format!(
                    "body {i} at ({x}, {y}) with radius {} is not inside the {}x{} arena",
                    b.radius, a.width, a.height
                )));
            }
        }

        Ok(())
    }
}
