//! Error types.
//!
//! Every failure the routing core can report is a local precondition violation:
//! the operation is refused, a `tracing` warning is emitted, and agent state is
//! left exactly as it was. Config loading adds the usual I/O and parse errors.

use thiserror::Error;

/// Result type for fallible `bias` operations.
pub type Result<T> = std::result::Result<T, BiasError>;

/// Errors reported by agents, the input handler, and config loading.
#[derive(Error, Debug)]
pub enum BiasError {
    /// The grabber is already a member of the agent's pool.
    #[error("grabber is already in the pool of agent `{agent}`")]
    DuplicateGrabber { agent: String },

    /// A default grabber must be added to the pool first.
    #[error("grabber must be added to agent `{agent}` before it can become its default")]
    GrabberNotInPool { agent: String },

    /// The agent is already registered at this handler.
    #[error("agent `{0}` is already registered")]
    AgentAlreadyRegistered(String),

    /// The agent was created for a different input handler.
    #[error("agent `{0}` belongs to another input handler")]
    ForeignAgent(String),

    /// Sensitivities must be finite numbers.
    #[error("agent `{agent}` has a non-finite sensitivity at axis {axis}")]
    InvalidSensitivities { agent: String, axis: usize },

    /// Failed to read a config file.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// TOML config could not be parsed.
    #[error("invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON config could not be parsed.
    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),

    /// Config path has an extension other than `.toml` or `.json`.
    #[error("unsupported config format: {0}")]
    UnsupportedConfigFormat(String),
}
