//! Narrow phase: circle-vs-circle overlap and impulse response
//!
//! Each call looks at one ordered pair `(a, b)`. Collision response is only
//! applied when the bodies approach each other along the normal, so feeding
//! the same pair twice in one tick (once from each side) resolves it once.

use crate::simulation::params::Parameters;
use crate::simulation::states::{Body, NVec2};

/// What `resolve` did to a pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PairOutcome {
    /// Circles do not touch; nothing changed
    Apart,
    /// Circles touch but are already moving apart
    Separating { nudged: bool },
    /// Circles were approaching; `impulse` was applied along the normal
    Impulse { impulse: f64, nudged: bool },
}

impl PairOutcome {
    pub fn is_contact(&self) -> bool {
        !matches!(self, PairOutcome::Apart)
    }

    pub fn nudged(&self) -> bool {
        match *self {
            PairOutcome::Apart => false,
            PairOutcome::Separating { nudged } | PairOutcome::Impulse { nudged, .. } => nudged,
        }
    }
}

/// Overlap test on squared distances: `|xb - xa|^2 <= (ra + rb)^2`
#[inline]
pub fn is_overlapping(a: &Body, b: &Body) -> bool {
    let sum = a.r() + b.r();
    (b.x - a.x).norm_squared() <= sum * sum
}

/// Impulse magnitude along the (unnormalised) normal `n`
///
/// j = -(1 + e)(v . n) / ((n . n)(1/ma + 1/mb))
pub fn impulse(a: &Body, b: &Body, v_rel: &NVec2, n: &NVec2, elasticity: f64) -> f64 {
    -((1.0 + elasticity) * v_rel.dot(n)) / (n.dot(n) * (a.inv_mass() + b.inv_mass()))
}

/// Resolve one ordered pair.
///
/// 1. overlap test, `Apart` when the circles do not touch
/// 2. normal `n = xb - xa`, relative velocity `v = va - vb`
/// 3. near rest (`|v| <= rest_speed`): push both apart by half of
///    `rest_separation` each along the unit normal
/// 4. only when approaching (`v . n > 0`): apply the impulse to both
///
/// Exactly coincident centres have no direction; the unit x axis is used
/// as the normal instead so nothing turns into NaN.
pub fn resolve(a: &mut Body, b: &mut Body, params: &Parameters) -> PairOutcome {
    if !is_overlapping(a, b) {
        return PairOutcome::Apart;
    }

    let mut n = b.x - a.x;
    if n.norm_squared() == 0.0 {
        n = NVec2::x();
    }
    let v_rel = a.v - b.v;

    let mut nudged = false;
    if params.rest_separation > 0.0 && v_rel.norm() <= params.rest_speed {
        let push = n.normalize() * (0.5 * params.rest_separation);
        a.x -= push;
        b.x += push;
        nudged = true;
    }

    // sign of v.n equals the sign of the dot of the normalised vectors
    if v_rel.dot(&n) <= 0.0 {
        return PairOutcome::Separating { nudged };
    }

    let j = impulse(a, b, &v_rel, &n, params.elasticity);
    a.v += n * (a.inv_mass() * j);
    b.v -= n * (b.inv_mass() * j);

    PairOutcome::Impulse { impulse: j, nudged }
}

/// Resolve `bodies[i]` against `bodies[j]` in place
///
/// `i == j` is never a pair and returns `Apart`.
pub fn resolve_indexed(bodies: &mut [Body], i: usize, j: usize, params: &Parameters) -> PairOutcome {
    if i == j {
        return PairOutcome::Apart;
    }
    let (a, b) = if i < j {
        let (lo, hi) = bodies.split_at_mut(j);
        (&mut lo[i], &mut hi[0])
    } else {
        let (lo, hi) = bodies.split_at_mut(i);
        (&mut hi[0], &mut lo[j])
    };
    resolve(a, b, params)
}
