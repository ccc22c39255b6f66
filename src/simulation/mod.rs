pub mod states;
pub mod aabb;
pub mod params;
pub mod engine;
pub mod collision;
pub mod boundary;
pub mod integrator;
pub mod broad_phase;
pub mod grid;
pub mod quadtree;
pub mod stepper;
pub mod spawn;
pub mod scenario;
