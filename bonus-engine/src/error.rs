//! Error types for the bonus engine

use thiserror::Error;

/// Bonus engine error
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Bonus identifier does not follow the `TYPE_..._DD.MM.YY` layout
    #[error("Invalid bonus id: {0}")]
    InvalidBonusId(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type
pub type Result<T> = std::result::Result<T, Error>;
