//! Error types for the papercal ecosystem.

use thiserror::Error;

/// Errors that can occur in papercal operations.
#[derive(Error, Debug)]
pub enum PaperCalError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown timezone: {0}")]
    Timezone(String),

    #[error("Weather payload error: {0}")]
    WeatherDecode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for papercal operations.
pub type PaperCalResult<T> = Result<T, PaperCalError>;
