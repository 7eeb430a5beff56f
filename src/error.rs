use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the simulation engine.
///
/// Every variant is a local, recoverable condition; none is fatal to a
/// running engine. Lookup misses and empty-population statistics are
/// modeled as `Option`s at the API surface, not as errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid user or API parameter.
    #[error("invalid parameter: {0}")]
    InvalidParam(String),

    /// A new particle could not be placed without overlapping existing
    /// occupancy within the attempt budget.
    #[error("no free position found after {attempts} placement attempts")]
    PlacementFailed { attempts: usize },

    /// Background stepper thread failed to spawn or join.
    #[error("engine error: {0}")]
    Engine(String),
}
