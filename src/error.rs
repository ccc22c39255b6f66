//! Error type shared by the simulation and configuration layers

use thiserror::Error;

/// Everything that can go wrong while building or feeding a simulation
///
/// None of these are transient: they are raised once, at the boundary where
/// bad data enters (config load, body construction), before any tick runs.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid body: radius {radius} and mass {mass} must both be positive")]
    InvalidBody { radius: u32, mass: u32 },

    #[error("failed to parse scenario yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("failed to read scenario: {0}")]
    Io(#[from] std::io::Error),
}

impl SimError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        SimError::InvalidConfig(msg.into())
    }
}
