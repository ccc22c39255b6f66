//! Randomised body creation for spawn requests
//!
//! Small bodies appear at the arena centre, big ones resting on the bottom
//! edge at the horizontal centre. Speeds are drawn uniformly from
//! `[velocity_min, velocity_max]` with a random sign per axis; big bodies are
//! always launched downward.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::configuration::config::SpawnConfig;
use crate::error::SimError;
use crate::simulation::states::{Body, BodyColor, BodyKind, NVec2};

pub struct Spawner {
    cfg: SpawnConfig,
    rng: StdRng,
    presses: u32,  // spawn requests since the last big body
    width: f64,
    height: f64,
}

impl Spawner {
    pub fn new(cfg: SpawnConfig, width: f64, height: f64) -> Self {
        let rng = StdRng::seed_from_u64(cfg.seed);
        Self {
            cfg,
            rng,
            presses: 0,
            width,
            height,
        }
    }

    /// Bodies for one spawn request: a batch of small bodies, plus one big
    /// body on every `presses_per_big`-th request.
    pub fn spawn_batch(&mut self) -> Result<Vec<Body>, SimError> {
        self.presses += 1;

        let mut out = Vec::with_capacity(self.cfg.batch_size + 1);
        if self.presses % self.cfg.presses_per_big == 0 {
            out.push(self.spawn_body(BodyKind::Big)?);
            self.presses = 0;
        }
        for _ in 0..self.cfg.batch_size {
            out.push(self.spawn_body(BodyKind::Small)?);
        }

        debug!(count = out.len(), "spawned batch");
        Ok(out)
    }

    /// One randomised body; anything but `Big` is spawned as a small body
    pub fn spawn_body(&mut self, kind: BodyKind) -> Result<Body, SimError> {
        let color = BodyColor::rgb(self.rng.gen(), self.rng.gen(), self.rng.gen());
        let vx = self.speed() * self.sign();

        let body = match kind {
            BodyKind::Big => {
                let r = self.cfg.big_radius;
                let x = NVec2::new(self.width * 0.5, self.height - f64::from(r));
                let v = NVec2::new(vx, self.speed());
                Body::new(x, v, r, self.cfg.big_mass)?
            }
            BodyKind::Small | BodyKind::Placed => {
                let r = self.rng.gen_range(self.cfg.small_radius_min..self.cfg.small_radius_max);
                let x = NVec2::new(self.width * 0.5, self.height * 0.5);
                let v = NVec2::new(vx, self.speed() * self.sign());
                Body::new(x, v, r, self.cfg.small_mass)?
            }
        };

        let kind = if kind == BodyKind::Big { BodyKind::Big } else { BodyKind::Small };
        Ok(body.with_color(color).with_kind(kind))
    }

    fn speed(&mut self) -> f64 {
        self.rng.gen_range(self.cfg.velocity_min..=self.cfg.velocity_max)
    }

    fn sign(&mut self) -> f64 {
        if self.rng.gen_bool(0.5) {
            -1.0
        } else {
            1.0
        }
    }
}
