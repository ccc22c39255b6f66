//! Broad phase: narrowing all pairs down to candidate neighbours
//!
//! Defines the [`BroadPhase`] capability the stepper depends on, the
//! brute-force baseline, and a builder that picks an implementation from
//! the engine settings.

use tracing::info;

use crate::configuration::config::BroadPhaseKind;
use crate::error::SimError;
use crate::simulation::aabb::Aabb;
use crate::simulation::engine::Engine;
use crate::simulation::grid::UniformGrid;
use crate::simulation::params::Parameters;
use crate::simulation::quadtree::Quadtree;
use crate::simulation::states::Body;

/// A non-empty piece of an index, exposed for the debug overlay
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub bounds: Aabb,
    pub occupants: usize, // bodies stored directly in this region
}

/// Spatial index rebuilt from scratch every tick
///
/// Implementations hold body indices into the slice passed to `rebuild`;
/// those indices are only meaningful until the next `rebuild`.
pub trait BroadPhase {
    /// Forget the previous tick and index `bodies` at their current positions
    fn rebuild(&mut self, bodies: &[Body]);

    /// Append the candidate neighbours of `bodies[body]` to `out`.
    ///
    /// `out` is cleared first. It may contain `body` itself; callers skip it.
    fn candidates_for(&self, body: usize, bodies: &[Body], out: &mut Vec<usize>);

    /// Non-empty regions for drawing
    fn regions(&self) -> Vec<Region>;

    fn name(&self) -> &'static str;
}

/// Every body is a candidate of every other body
#[derive(Debug, Default, Clone)]
pub struct BruteForce {
    len: usize,
    bounds: Option<Aabb>,
}

impl BruteForce {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BroadPhase for BruteForce {
    fn rebuild(&mut self, bodies: &[Body]) {
        self.len = bodies.len();
        self.bounds = bodies.iter().map(Body::aabb).reduce(|acc, bb| {
            Aabb::new(acc.min.inf(&bb.min), acc.max.sup(&bb.max))
        });
    }

    fn candidates_for(&self, _body: usize, _bodies: &[Body], out: &mut Vec<usize>) {
        out.clear();
        out.extend(0..self.len);
    }

    fn regions(&self) -> Vec<Region> {
        self.bounds
            .map(|bounds| Region { bounds, occupants: self.len })
            .into_iter()
            .collect()
    }

    fn name(&self) -> &'static str {
        "brute force"
    }
}

/// Build the broad phase selected by `engine`, sized to the arena in `params`
pub fn build_broad_phase(engine: &Engine, params: &Parameters) -> Result<Box<dyn BroadPhase + Send + Sync>, SimError> {
    let index: Box<dyn BroadPhase + Send + Sync> = match engine.broad_phase {
        BroadPhaseKind::BruteForce => Box::new(BruteForce::new()),
        BroadPhaseKind::Grid => Box::new(UniformGrid::new(params.width, params.height, engine.grid_size)?),
        BroadPhaseKind::Quadtree => Box::new(Quadtree::covering(
            params.width,
            params.height,
            engine.max_depth,
            engine.subdivision,
            engine.query,
        )?),
    };
    info!(broad_phase = index.name(), "built broad phase");
    Ok(index)
}
