//! Arena-edge containment and velocity reflection

use crate::simulation::states::Body;

/// Which axes were out of bounds on the last check
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EdgeHit {
    pub x: bool,
    pub y: bool,
}

impl EdgeHit {
    pub fn any(&self) -> bool {
        self.x || self.y
    }
}

/// Whether the circle pokes out of `[0, width] x [0, height]` on each axis
pub fn out_of_bounds(body: &Body, width: f64, height: f64) -> EdgeHit {
    let r = body.r();
    EdgeHit {
        x: body.x.x + r > width || body.x.x - r < 0.0,
        y: body.x.y + r > height || body.x.y - r < 0.0,
    }
}

/// Undo this tick's move on every violated axis and bounce off that edge.
///
/// Both axes are judged on the position before any correction, so a corner
/// hit reverts and flips both components in the same call. An axis that is
/// in bounds keeps its position and velocity.
pub fn handle_edge(body: &mut Body, width: f64, height: f64) -> EdgeHit {
    let hit = out_of_bounds(body, width, height);
    if hit.x {
        body.x.x = body.x_prev.x;
        body.v.x = -body.v.x;
    }
    if hit.y {
        body.x.y = body.x_prev.y;
        body.v.y = -body.v.y;
    }
    hit
}
