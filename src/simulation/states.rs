//! Core state types for the collision simulation.
//!
//! - `Body`   a dynamic circle with kinematic state
//! - `System` the owned collection of bodies plus simulated time `t`
//!
//! Positions live in arena coordinates: origin at the top-left corner,
//! x grows to the right and y grows downward.

use nalgebra::Vector2;

use crate::error::SimError;
use crate::simulation::aabb::Aabb;

pub type NVec2 = Vector2<f64>;

/// Display colour; has no effect on the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl BodyColor {
    pub const WHITE: BodyColor = BodyColor::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

/// How a body came into the world, for bookkeeping only
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Small,
    Big,
    Placed, // listed explicitly in a scenario file
}

#[derive(Debug, Clone)]
pub struct Body {
    pub radius: u32,      // always > 0
    pub m: u32,           // mass, always > 0, only ever used as 1/m
    pub color: BodyColor,
    pub kind: BodyKind,
    pub x: NVec2,         // position
    pub x_prev: NVec2,    // position before the most recent integration step
    pub v: NVec2,         // velocity
    pub a: NVec2,         // acceleration from the most recent integration step
}

impl Body {
    /// Build a body at rest history-wise (`x_prev == x`).
    ///
    /// Non-positive radius or mass is rejected here so that nothing
    /// downstream ever divides by zero or builds an empty bounding box.
    pub fn new(x: NVec2, v: NVec2, radius: u32, m: u32) -> Result<Self, SimError> {
        if radius == 0 || m == 0 {
            return Err(SimError::InvalidBody { radius, mass: m });
        }
        Ok(Self {
            radius,
            m,
            color: BodyColor::WHITE,
            kind: BodyKind::Placed,
            x,
            x_prev: x,
            v,
            a: NVec2::zeros(),
        })
    }

    pub fn with_color(mut self, color: BodyColor) -> Self {
        self.color = color;
        self
    }

    pub fn with_kind(mut self, kind: BodyKind) -> Self {
        self.kind = kind;
        self
    }

    #[inline]
    pub fn r(&self) -> f64 {
        f64::from(self.radius)
    }

    #[inline]
    pub fn inv_mass(&self) -> f64 {
        1.0 / f64::from(self.m)
    }

    /// Bounding square: centre ± radius on each axis
    #[inline]
    pub fn aabb(&self) -> Aabb {
        Aabb::around(self.x, self.r())
    }

    pub fn momentum(&self) -> NVec2 {
        self.v * f64::from(self.m)
    }

    pub fn kinetic_energy(&self) -> f64 {
        0.5 * f64::from(self.m) * self.v.norm_squared()
    }
}

#[derive(Debug, Clone, Default)]
pub struct System {
    pub bodies: Vec<Body>, // every body in the arena
    pub t: f64,            // simulated time
}

impl System {
    pub fn new(bodies: Vec<Body>) -> Self {
        Self { bodies, t: 0.0 }
    }

    pub fn total_momentum(&self) -> NVec2 {
        self.bodies.iter().map(Body::momentum).sum()
    }

    pub fn kinetic_energy(&self) -> f64 {
        self.bodies.iter().map(Body::kinetic_energy).sum()
    }

    pub fn count(&self, kind: BodyKind) -> usize {
        self.bodies.iter().filter(|b| b.kind == kind).count()
    }
}
