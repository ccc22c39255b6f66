//! Fixed-step kinematic integrator
//!
//! Semi-implicit Euler: velocity first, then position with the new
//! velocity. Velocity components below `velocity_threshold` are snapped to
//! zero so resting bodies stop jittering.

use super::params::Parameters;
use super::states::{Body, System};

/// Advance every body by one step of `params.dt` and move `sys.t` forward
pub fn euler_step(sys: &mut System, params: &Parameters) {
    for b in sys.bodies.iter_mut() {
        integrate_body(b, params);
    }
    sys.t += params.dt;
}

/// One step for a single body
///
/// a = F/m - drag * v
/// v += a dt, small components snapped to 0
/// x_prev = x, x += v dt
pub fn integrate_body(b: &mut Body, params: &Parameters) {
    let dt = params.dt;

    b.a = params.force * b.inv_mass() - b.v * params.drag;
    b.v += b.a * dt;

    let threshold = params.velocity_threshold;
    if b.v.x.abs() < threshold {
        b.v.x = 0.0;
    }
    if b.v.y.abs() < threshold {
        b.v.y = 0.0;
    }

    b.x_prev = b.x;
    b.x += b.v * dt;
}
