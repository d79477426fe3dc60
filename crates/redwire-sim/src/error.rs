//! Simulator error types.

use redwire_world::Pos;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("invalid circuit layout: {0}")]
    Layout(#[from] serde_json::Error),

    #[error("invalid block at {pos}: {reason}")]
    InvalidBlock { pos: Pos, reason: String },
}

/// Read a whole file, keeping the path in the error.
pub fn read_file(path: &str) -> Result<String, SimError> {
    std::fs::read_to_string(path).map_err(|source| SimError::Io {
        path: path.to_string(),
        source,
    })
}
