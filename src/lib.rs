pub mod error;
pub mod simulation;
pub mod configuration;
#[cfg(feature = "viewer")]
pub mod visualization;
pub mod benchmark;

pub use error::SimError;

pub use simulation::states::{Body, BodyColor, BodyKind, System, NVec2};
pub use simulation::aabb::Aabb;
pub use simulation::params::Parameters;
pub use simulation::engine::Engine;
pub use simulation::collision::{resolve, resolve_indexed, PairOutcome};
pub use simulation::boundary::{handle_edge, EdgeHit};
pub use simulation::integrator::euler_step;
pub use simulation::broad_phase::{build_broad_phase, BroadPhase, BruteForce, Region};
pub use simulation::grid::UniformGrid;
pub use simulation::quadtree::{Quadtree, QuadNode, Quadrant, NodeId};
pub use simulation::stepper::{Stepper, StepperState, TickStats};
pub use simulation::spawn::Spawner;
pub use simulation::scenario::{FrameInput, Scenario};

pub use configuration::config::{
    ArenaConfig, BodyConfig, BroadPhaseKind, EngineConfig, ParametersConfig, QueryMode, ScenarioConfig, SpawnConfig,
    Subdivision,
};

#[cfg(feature = "viewer")]
pub use visualization::qtsim_vis2d::run_2d;

pub use benchmark::benchmark::bench_broad_phase;
