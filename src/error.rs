//! Error type for the few fallible edges of the simulator.
//!
//! The simulation itself never fails: bad actions are logged and dropped.
//! Errors only surface while parsing payloads, loading configuration, or
//! reading an action log from disk.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid payload for action '{action}': {source}")]
    InvalidPayload {
        action: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
