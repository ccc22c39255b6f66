//! High-level runtime engine settings
//!
//! Selects the broad phase (brute force, uniform grid, quadtree) and the
//! knobs that shape it, used when building a `Scenario`

use crate::configuration::config::{BroadPhaseKind, EngineConfig, QueryMode, Subdivision};

#[derive(Debug, Clone)]
pub struct Engine {
    pub broad_phase: BroadPhaseKind, // which index feeds the narrow phase
    pub grid_size: f64,              // uniform grid cell side
    pub max_depth: u32,              // quadtree depth cap
    pub subdivision: Subdivision,    // eager or lazy quadtree nodes
    pub query: QueryMode,            // quadtree query start point
}

impl From<&EngineConfig> for Engine {
    fn from(cfg: &EngineConfig) -> Self {
        Self {
            broad_phase: cfg.broad_phase,
            grid_size: cfg.grid_size,
            max_depth: cfg.max_depth,
            subdivision: cfg.subdivision,
            query: cfg.query,
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::from(&EngineConfig::default())
    }
}
