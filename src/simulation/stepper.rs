//! Fixed-timestep simulation driver
//!
//! Every external frame hands its elapsed wall-clock time to
//! [`Stepper::advance`], which adds it to an accumulator and then runs as
//! many whole steps of `params.dt` as the accumulator holds. One step:
//!
//! 1. integrate every body
//! 2. rebuild the broad phase from the new positions
//! 3. for each body, resolve it against each of its candidates; a touching
//!    pair reached from both sides is resolved once per step
//! 4. bounce every body off the arena edges
//!
//! A slow frame is caught up with several steps of the same size; a fast
//! frame may run none.

use std::collections::HashSet;

use tracing::{trace, warn};

use crate::simulation::boundary::handle_edge;
use crate::simulation::broad_phase::BroadPhase;
use crate::simulation::collision::{is_overlapping, resolve_indexed, PairOutcome};
use crate::simulation::integrator::euler_step;
use crate::simulation::params::Parameters;
use crate::simulation::states::{Body, System};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepperState {
    /// No frame has been fed yet
    Idle,
    /// Between steps, waiting for the accumulator to fill
    Accumulating,
    /// Inside a step
    Stepping,
}

/// Counters for one fixed step
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickStats {
    pub candidate_pairs: usize, // ordered pairs handed to the narrow phase
    pub contacts: usize,        // pairs found overlapping
    pub impulses: usize,        // pairs that received an impulse
    pub separations: usize,     // near-rest push-aparts
    pub edge_hits: usize,       // bodies that touched an arena edge
}

pub struct Stepper {
    system: System,
    params: Parameters,
    index: Box<dyn BroadPhase + Send + Sync>,
    accumulator: f64,
    state: StepperState,
    paused: bool,
    ticks: u64,
    last_tick: TickStats,
    candidates: Vec<usize>,          // reused per-body scratch buffer
    resolved: HashSet<(usize, usize)>, // touching pairs handled this step, (low, high)
}

impl Stepper {
    pub fn new(system: System, params: Parameters, index: Box<dyn BroadPhase + Send + Sync>) -> Self {
        Self {
            system,
            params,
            index,
            accumulator: 0.0,
            state: StepperState::Idle,
            paused: false,
            ticks: 0,
            last_tick: TickStats::default(),
            candidates: Vec::new(),
            resolved: HashSet::new(),
        }
    }

    pub fn system(&self) -> &System {
        &self.system
    }

    pub fn bodies(&self) -> &[Body] {
        &self.system.bodies
    }

    pub fn params(&self) -> &Parameters {
        &self.params
    }

    /// Index as of the last step, for the debug overlay
    pub fn index(&self) -> &dyn BroadPhase {
        self.index.as_ref()
    }

    pub fn state(&self) -> StepperState {
        self.state
    }

    pub fn accumulator(&self) -> f64 {
        self.accumulator
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn last_tick(&self) -> TickStats {
        self.last_tick
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn add_body(&mut self, body: Body) {
        self.system.bodies.push(body);
    }

    pub fn extend_bodies(&mut self, bodies: impl IntoIterator<Item = Body>) {
        self.system.bodies.extend(bodies);
    }

    /// Feed one frame's elapsed time and run every step it pays for.
    ///
    /// Returns the number of steps taken. While paused nothing accumulates.
    /// Negative or non-finite frame times are rejected and count as zero.
    pub fn advance(&mut self, frame_dt: f64) -> usize {
        if !(frame_dt.is_finite() && frame_dt >= 0.0) {
            warn!(frame_dt, "ignoring invalid frame time");
            return 0;
        }
        if self.paused {
            return 0;
        }

        self.state = StepperState::Accumulating;
        self.accumulator += frame_dt;

        let mut steps = 0;
        while self.accumulator >= self.params.dt {
            self.step();
            self.accumulator -= self.params.dt;
            steps += 1;
        }
        steps
    }

    /// Run exactly one fixed step, regardless of the accumulator
    pub fn step(&mut self) -> TickStats {
        self.state = StepperState::Stepping;
        let mut stats = TickStats::default();

        euler_step(&mut self.system, &self.params);

        self.index.rebuild(&self.system.bodies);

        let mut candidates = std::mem::take(&mut self.candidates);
        self.resolved.clear();
        for i in 0..self.system.bodies.len() {
            self.index.candidates_for(i, &self.system.bodies, &mut candidates);
            for &j in &candidates {
                if j == i {
                    continue;
                }
                stats.candidate_pairs += 1;
                if !is_overlapping(&self.system.bodies[i], &self.system.bodies[j]) {
                    continue;
                }
                if !self.resolved.insert((i.min(j), i.max(j))) {
                    continue;
                }
                let outcome = resolve_indexed(&mut self.system.bodies, i, j, &self.params);
                if outcome.is_contact() {
                    stats.contacts += 1;
                }
                if outcome.nudged() {
                    stats.separations += 1;
                }
                if matches!(outcome, PairOutcome::Impulse { .. }) {
                    stats.impulses += 1;
                }
            }
        }
        self.candidates = candidates;

        let (w, h) = (self.params.width, self.params.height);
        for b in self.system.bodies.iter_mut() {
            if handle_edge(b, w, h).any() {
                stats.edge_hits += 1;
            }
        }

        self.ticks += 1;
        self.last_tick = stats;
        self.state = StepperState::Accumulating;

        trace!(tick = self.ticks, ?stats, "step");
        stats
    }
}
