//! Error types for simulation orchestration.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors produced while setting up or running a simulation.
///
/// The worker and generator loops themselves never fail: exhaustion and
/// shutdown are normal terminal states. Only configuration and thread
/// management can go wrong.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// Configuration rejected before any thread started.
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
    /// The OS refused to spawn a thread.
    #[error("failed to spawn thread `{name}`: {source}")]
    Spawn {
        /// Thread name.
        name: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// A worker or the generator panicked.
    #[error("thread `{name}` panicked")]
    ThreadPanicked {
        /// Thread name.
        name: String,
    },
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
