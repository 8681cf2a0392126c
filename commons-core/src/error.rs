//! Error type shared by the fallible setup and configuration paths.
//!
//! The world tick itself never fails; everything here happens before the
//! first tick or between ticks.

/// Errors raised while building a simulation or applying external input.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// A population must start with at least one agent.
    #[error("population size must be at least 1, got {requested}")]
    EmptyPopulation { requested: usize },

    /// An external control referred to a parameter that does not exist.
    #[error("unknown parameter `{0}`")]
    UnknownParameter(String),

    /// The simulation configuration is unusable.
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// A JSON payload from the host could not be parsed.
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
}
